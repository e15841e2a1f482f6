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

use axum::Form;
use axum::extract::State;
use axum::response::Redirect;
use serde::Deserialize;

use crate::review::state::ServerState;
use crate::scheduler::describe_next_review;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

#[derive(Deserialize)]
pub struct FormData {
    action: String,
}

pub async fn post_handler(
    State(state): State<ServerState>,
    Form(form): Form<FormData>,
) -> Redirect {
    let mut mutable = state.mutable.lock().await;
    match form.action.as_str() {
        "reveal" => {
            mutable.session.reveal();
        }
        "delete" => {
            if let Err(e) = mutable.session.delete_current().await {
                log::error!("failed to delete flashcard: {e}");
                mutable.notice = Some("Failed to delete flashcard. Please try again.".to_string());
            }
        }
        "end" => {
            log::debug!("session ended by user");
            if let Some(tx) = state.shutdown_tx.lock().await.take() {
                let _ = tx.send(());
            }
        }
        label => match label.parse::<Rating>() {
            Ok(rating) => match mutable.session.rate(rating).await {
                Ok(Some(updated)) => {
                    if let Some(next) = updated.next_review_date {
                        log::debug!(
                            "progress saved; next review: {}",
                            describe_next_review(next, Timestamp::now())
                        );
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    log::error!("failed to save progress: {e}");
                    mutable.notice =
                        Some("Failed to save progress. Please try again.".to_string());
                }
            },
            Err(e) => {
                // Unknown labels are rejected outright; nothing was mutated.
                log::error!("{e}");
            }
        },
    }
    Redirect::to("/")
}
