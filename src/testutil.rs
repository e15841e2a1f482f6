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

//! An in-process mock of the Flasheeta backend, for tests that exercise the
//! real HTTP client.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::delete;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::time::sleep;

use crate::types::card::Flashcard;
use crate::types::card::FlashcardId;
use crate::types::deck::Deck;
use crate::types::progress::Progress;

pub const TEST_DECK_ID: &str = "deck-1";

pub struct MockBackend {
    pub port: u16,
    pub progress: Arc<Mutex<HashMap<String, Progress>>>,
    pub deleted: Arc<Mutex<Vec<String>>>,
}

impl MockBackend {
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }
}

#[derive(Clone)]
struct BackendState {
    cards: Arc<Vec<Flashcard>>,
    progress: Arc<Mutex<HashMap<String, Progress>>>,
    deleted: Arc<Mutex<Vec<String>>>,
    fail_updates: bool,
}

/// Spawn a mock backend on an unused port and return handles to its state.
pub async fn spawn_backend(cards: Vec<Flashcard>, fail_updates: bool) -> MockBackend {
    let port = portpicker::pick_unused_port().unwrap();
    let progress = Arc::new(Mutex::new(HashMap::new()));
    let deleted = Arc::new(Mutex::new(Vec::new()));
    let state = BackendState {
        cards: Arc::new(cards),
        progress: progress.clone(),
        deleted: deleted.clone(),
        fail_updates,
    };
    let app = Router::new()
        .route("/api/v1/users/me/decks", get(list_decks))
        .route(
            "/api/v1/users/me/decks/{deck_id}/flashcards",
            get(list_flashcards),
        )
        .route(
            "/api/v1/users/me/flashcards/{flashcard_id}/progress",
            get(get_progress).put(put_progress),
        )
        .route(
            "/api/v1/users/me/flashcards/{flashcard_id}",
            delete(delete_flashcard),
        )
        .with_state(state);
    let listener = TcpListener::bind(format!("127.0.0.1:{port}"))
        .await
        .unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    wait_for_port(port).await;
    MockBackend {
        port,
        progress,
        deleted,
    }
}

/// Block until something is listening on the port.
pub async fn wait_for_port(port: u16) {
    loop {
        if let Ok(stream) = TcpStream::connect(format!("127.0.0.1:{port}")).await {
            drop(stream);
            break;
        }
        sleep(Duration::from_millis(1)).await;
    }
}

pub fn test_card(id: &str, question: &str, answer: &str) -> Flashcard {
    Flashcard {
        id: FlashcardId::new(id),
        deck_id: TEST_DECK_ID.to_string(),
        question: question.to_string(),
        answer: answer.to_string(),
    }
}

async fn list_decks() -> Json<Vec<Deck>> {
    Json(vec![Deck {
        id: TEST_DECK_ID.to_string(),
        name: "Biology".to_string(),
        description: None,
    }])
}

async fn list_flashcards(
    State(state): State<BackendState>,
    Path(deck_id): Path<String>,
) -> Json<Vec<Flashcard>> {
    let cards = state
        .cards
        .iter()
        .filter(|card| card.deck_id == deck_id)
        .cloned()
        .collect();
    Json(cards)
}

async fn get_progress(
    State(state): State<BackendState>,
    Path(flashcard_id): Path<String>,
) -> Result<Json<Progress>, StatusCode> {
    if state.deleted.lock().unwrap().contains(&flashcard_id) {
        return Err(StatusCode::NOT_FOUND);
    }
    let progress = state
        .progress
        .lock()
        .unwrap()
        .get(&flashcard_id)
        .cloned()
        .unwrap_or_default();
    Ok(Json(progress))
}

async fn put_progress(
    State(state): State<BackendState>,
    Path(flashcard_id): Path<String>,
    Json(progress): Json<Progress>,
) -> StatusCode {
    if state.fail_updates {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    state
        .progress
        .lock()
        .unwrap()
        .insert(flashcard_id, progress);
    StatusCode::OK
}

async fn delete_flashcard(
    State(state): State<BackendState>,
    Path(flashcard_id): Path<String>,
) -> StatusCode {
    state.deleted.lock().unwrap().push(flashcard_id);
    StatusCode::OK
}
