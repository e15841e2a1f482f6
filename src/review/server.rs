// Copyright 2025 Flasheeta Development Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use axum::Router;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::http::header::CACHE_CONTROL;
use axum::http::header::CONTENT_TYPE;
use axum::response::Html;
use axum::routing::get;
use axum::routing::post;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::sync::oneshot;
use tokio::time::sleep;

use crate::config::Config;
use crate::error::Fallible;
use crate::review::get::get_handler;
use crate::review::post::post_handler;
use crate::review::state::MutableState;
use crate::review::state::ServerState;
use crate::scheduler::Scheduler;
use crate::session::ReviewSession;
use crate::store::ApiClient;

/// Start a review session for a deck and serve it in the browser. Returns
/// once the session is ended from the UI.
pub async fn start_review_server(config: &Config, deck_id: &str, port: u16) -> Fallible<()> {
    let client = ApiClient::new(&config.api);

    let decks = client.fetch_decks().await?;
    let deck_name = decks
        .iter()
        .find(|deck| deck.id == deck_id)
        .map(|deck| deck.name.clone())
        .unwrap_or_else(|| deck_id.to_string());

    log::debug!("Loading deck...");
    let start = Instant::now();
    let cards = client.fetch_deck_flashcards(deck_id).await?;
    let duration = start.elapsed().as_millis();
    log::debug!("Deck loaded in {duration}ms.");

    if cards.is_empty() {
        println!("No flashcards found in this deck.");
        return Ok(());
    }

    let mut session = ReviewSession::new(client, Scheduler::new(config.scheduler), cards);
    session.start().await;
    if session.is_complete() {
        println!("No cards due for review.");
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let state = ServerState {
        deck_name,
        mutable: Arc::new(Mutex::new(MutableState {
            session,
            notice: None,
        })),
        shutdown_tx: Arc::new(Mutex::new(Some(shutdown_tx))),
    };
    let app = Router::new();
    let app = app.route("/", get(get_handler));
    let app = app.route("/", post(post_handler));
    let app = app.route("/style.css", get(stylesheet));
    let app = app.fallback(not_found_handler);
    let app = app.with_state(state);
    let bind = format!("127.0.0.1:{port}");

    // Start a separate task to open the browser.
    let url = format!("http://{bind}/");
    let probe = bind.clone();
    tokio::spawn(async move {
        loop {
            if let Ok(stream) = TcpStream::connect(&probe).await {
                drop(stream);
                break;
            }
            sleep(Duration::from_millis(1)).await;
        }
        let _ = open::that(url);
    });

    // Start the server.
    log::debug!("Starting server on {bind}");
    let listener = TcpListener::bind(&bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        })
        .await?;
    println!("Session ended.");
    Ok(())
}

async fn stylesheet() -> (StatusCode, [(HeaderName, &'static str); 2], &'static [u8]) {
    let bytes = include_bytes!("style.css");
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/css"),
            (CACHE_CONTROL, "public, max-age=604800, immutable"),
        ],
        bytes,
    )
}

async fn not_found_handler() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html("Not Found".to_string()))
}
