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

use std::fmt::Display;
use std::fmt::Formatter;

use async_trait::async_trait;
use percent_encoding::AsciiSet;
use percent_encoding::CONTROLS;
use percent_encoding::utf8_percent_encode;
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::types::card::Flashcard;
use crate::types::card::FlashcardId;
use crate::types::deck::Deck;
use crate::types::progress::Progress;

/// Characters that may not appear raw in a URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'/')
    .add(b'%');

/// A failure talking to the backend. Always non-fatal to a running session.
#[derive(Debug)]
pub enum TransportError {
    /// The request could not be sent, or the response could not be decoded.
    Request(reqwest::Error),
    /// The backend answered with a non-success status.
    Status(u16),
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Request(err) => write!(f, "transport error: {err}"),
            TransportError::Status(status) => {
                write!(f, "transport error: backend returned status {status}")
            }
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Request(err) => Some(err),
            TransportError::Status(_) => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Request(err)
    }
}

/// The external progress store: the three operations the review session
/// needs from a backend.
#[async_trait]
pub trait ProgressStore {
    /// Fetch a card's current scheduling state.
    async fn fetch_progress(&self, id: &FlashcardId) -> Result<Progress, TransportError>;

    /// Persist updated scheduling state. Last write wins; there is no retry.
    async fn persist_progress(
        &self,
        id: &FlashcardId,
        progress: &Progress,
    ) -> Result<(), TransportError>;

    /// Delete a card and its progress record.
    async fn delete_flashcard(&self, id: &FlashcardId) -> Result<(), TransportError>;
}

/// A thin client for the Flasheeta REST API.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn fetch_decks(&self) -> Result<Vec<Deck>, TransportError> {
        self.get_json("/api/v1/users/me/decks".to_string()).await
    }

    pub async fn fetch_deck_flashcards(
        &self,
        deck_id: &str,
    ) -> Result<Vec<Flashcard>, TransportError> {
        let path = format!(
            "/api/v1/users/me/decks/{}/flashcards",
            encode_segment(deck_id)
        );
        self.get_json(path).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: String) -> Result<T, TransportError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        Ok(check_status(response)?.json().await?)
    }

    fn progress_url(&self, id: &FlashcardId) -> String {
        format!(
            "{}/api/v1/users/me/flashcards/{}/progress",
            self.base_url,
            encode_segment(id.as_str())
        )
    }
}

#[async_trait]
impl ProgressStore for ApiClient {
    async fn fetch_progress(&self, id: &FlashcardId) -> Result<Progress, TransportError> {
        let response = self.http.get(self.progress_url(id)).send().await?;
        Ok(check_status(response)?.json().await?)
    }

    async fn persist_progress(
        &self,
        id: &FlashcardId,
        progress: &Progress,
    ) -> Result<(), TransportError> {
        let response = self
            .http
            .put(self.progress_url(id))
            .json(progress)
            .send()
            .await?;
        check_status(response)?;
        Ok(())
    }

    async fn delete_flashcard(&self, id: &FlashcardId) -> Result<(), TransportError> {
        let url = format!(
            "{}/api/v1/users/me/flashcards/{}",
            self.base_url,
            encode_segment(id.as_str())
        );
        let response = self.http.delete(url).send().await?;
        check_status(response)?;
        Ok(())
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(TransportError::Status(response.status().as_u16()))
    }
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_segments_pass_through() {
        assert_eq!(
            encode_segment("0c5a2b1e-4af1-4d2b-9a5e-000000000000"),
            "0c5a2b1e-4af1-4d2b-9a5e-000000000000"
        );
    }

    #[test]
    fn test_reserved_characters_are_encoded() {
        assert_eq!(encode_segment("a/b c"), "a%2Fb%20c");
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new(&ApiConfig {
            base_url: "http://localhost:5000/".to_string(),
        });
        assert_eq!(
            client.progress_url(&FlashcardId::new("c1")),
            "http://localhost:5000/api/v1/users/me/flashcards/c1/progress"
        );
    }
}
