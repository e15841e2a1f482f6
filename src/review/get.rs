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

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use maud::Markup;
use maud::html;

use crate::review::state::ServerState;
use crate::review::template::page_template;
use crate::session::ReviewSession;
use crate::store::ApiClient;
use crate::types::card::Flashcard;

const COMPLETION_MESSAGE: &str =
    "Congratulations! You have finished all the flashcards in this deck.";

pub async fn get_handler(State(state): State<ServerState>) -> (StatusCode, Html<String>) {
    let mut mutable = state.mutable.lock().await;
    let notice = mutable.notice.take();
    let session = &mutable.session;
    let body = match session.current() {
        Some(card) => render_card(&state.deck_name, session, card),
        None => render_completion(session.presented_count()),
    };
    let page = page_template(html! {
        @if let Some(notice) = &notice {
            div.notice {
                (notice)
            }
        }
        (body)
    });
    (StatusCode::OK, Html(page.into_string()))
}

fn render_completion(presented: usize) -> Markup {
    html! {
        div.finished {
            h1 {
                "Deck Completed"
            }
            p {
                (COMPLETION_MESSAGE)
            }
            p.count {
                "Cards reviewed this session: " (presented)
            }
        }
    }
}

fn render_card(deck_name: &str, session: &ReviewSession<ApiClient>, card: &Flashcard) -> Markup {
    let stats = session.stats();
    let progress = if stats.retry_queue > 0 {
        format!(
            "{} / {} ({} to retry)",
            stats.position, stats.total, stats.retry_queue
        )
    } else {
        format!("{} / {}", stats.position, stats.total)
    };
    let content = if session.is_revealed() {
        html! {
            div.content {
                div.question {
                    p {
                        (card.question)
                    }
                }
                div.answer {
                    p {
                        (card.answer)
                    }
                }
            }
        }
    } else {
        html! {
            div.content {
                div.question {
                    p {
                        (card.question)
                    }
                }
                div.answer {}
            }
        }
    };
    let controls = if session.is_revealed() {
        html! {
            form action="/" method="post" {
                button id="again" type="submit" name="action" value="again" { "Again" }
                button id="hard" type="submit" name="action" value="hard" { "Hard" }
                button id="good" type="submit" name="action" value="good" { "Good" }
                button id="easy" type="submit" name="action" value="easy" { "Easy" }
                div.spacer {}
                button id="delete" type="submit" name="action" value="delete" { "Delete" }
                button id="end" type="submit" name="action" value="end" { "End" }
            }
        }
    } else {
        html! {
            form action="/" method="post" {
                button id="reveal" type="submit" name="action" value="reveal" { "Reveal" }
                div.spacer {}
                button id="delete" type="submit" name="action" value="delete" { "Delete" }
                button id="end" type="submit" name="action" value="end" { "End" }
            }
        }
    };
    html! {
        div.root {
            div.card {
                div.header {
                    h1 {
                        (deck_name)
                    }
                    div.progress {
                        (progress)
                    }
                }
                (content)
                div.controls {
                    (controls)
                }
            }
        }
    }
}
