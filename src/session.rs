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

//! The review session state machine.
//!
//! A session walks the deck in array order, presenting due cards and
//! skipping the rest. Failed cards land in a retry queue and are re-shown,
//! bypassing the due check, once the main pass is exhausted; the session
//! completes only when the retry queue has drained. Transport failures never
//! halt the loop: a card whose progress cannot be fetched is skipped, and a
//! failed save surfaces as a message while the session stays where it was.

use std::collections::HashSet;

use crate::scheduler::Scheduler;
use crate::store::ProgressStore;
use crate::store::TransportError;
use crate::types::card::Flashcard;
use crate::types::card::FlashcardId;
use crate::types::progress::Progress;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

/// Counters describing a running session, for display.
pub struct SessionStats {
    /// One-based position of the presented card within the current pass.
    pub position: usize,
    pub total: usize,
    pub retry_queue: usize,
}

pub struct ReviewSession<S> {
    store: S,
    scheduler: Scheduler,
    /// The presentation sequence. Grows when failed cards are re-queued.
    cards: Vec<Flashcard>,
    cursor: usize,
    /// Failed cards awaiting re-presentation before the session can end.
    retry_queue: Vec<Flashcard>,
    /// Cards that bypass the due check the next time they come up.
    immediate: HashSet<FlashcardId>,
    revealed: bool,
    complete: bool,
    presented: usize,
}

impl<S: ProgressStore> ReviewSession<S> {
    pub fn new(store: S, scheduler: Scheduler, cards: Vec<Flashcard>) -> Self {
        Self {
            store,
            scheduler,
            cards,
            cursor: 0,
            retry_queue: Vec::new(),
            immediate: HashSet::new(),
            revealed: false,
            complete: false,
            presented: 0,
        }
    }

    /// Position the session on the first due card, or complete immediately
    /// if there is none.
    pub async fn start(&mut self) {
        self.advance().await;
    }

    /// The card currently presented, if the session is still running.
    pub fn current(&self) -> Option<&Flashcard> {
        if self.complete {
            None
        } else {
            self.cards.get(self.cursor)
        }
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Number of presentations so far, retries included.
    pub fn presented_count(&self) -> usize {
        self.presented
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            position: (self.cursor + 1).min(self.cards.len()),
            total: self.cards.len(),
            retry_queue: self.retry_queue.len(),
        }
    }

    /// Show the answer. Idempotent: revealing an already-revealed card has
    /// no further effect.
    pub fn reveal(&mut self) {
        if !self.complete && !self.revealed {
            self.revealed = true;
        }
    }

    /// Apply a rating to the presented card: compute the next schedule,
    /// persist it, queue the card for retry if it failed, and move on.
    ///
    /// Returns the updated progress, or `None` if there was nothing to rate.
    /// On a transport failure the session state is untouched, so the user
    /// can rate again.
    pub async fn rate(&mut self, rating: Rating) -> Result<Option<Progress>, TransportError> {
        if self.complete {
            return Ok(None);
        }
        if !self.revealed {
            log::error!("rating a card that is not revealed");
            return Ok(None);
        }
        let card = self.cards[self.cursor].clone();
        let progress = self.store.fetch_progress(&card.id).await?;
        let updated = self
            .scheduler
            .next_progress(&progress, rating, Timestamp::now());
        self.store.persist_progress(&card.id, &updated).await?;
        if !rating.is_success() {
            log::debug!("queueing {} for review at the end of the pass", card.id);
            self.immediate.insert(card.id.clone());
            self.retry_queue.push(card);
        }
        self.cursor += 1;
        self.advance().await;
        Ok(Some(updated))
    }

    /// Delete the presented card. The next card slides into the current
    /// position; the cursor does not advance.
    pub async fn delete_current(&mut self) -> Result<(), TransportError> {
        if self.complete {
            return Ok(());
        }
        let card = self.cards[self.cursor].clone();
        self.store.delete_flashcard(&card.id).await?;
        self.cards.remove(self.cursor);
        self.retry_queue.retain(|queued| queued.id != card.id);
        self.immediate.remove(&card.id);
        self.advance().await;
        Ok(())
    }

    /// Walk forward until a presentable card is found: flagged cards are
    /// shown unconditionally, due cards are shown, the rest are skipped.
    /// Fetch failures skip the card rather than blocking the session.
    async fn advance(&mut self) {
        self.revealed = false;
        loop {
            if self.cursor >= self.cards.len() && !self.requeue_failed() {
                log::debug!("session complete");
                self.complete = true;
                return;
            }
            let id = self.cards[self.cursor].id.clone();
            if self.immediate.remove(&id) {
                log::debug!("presenting {id}, bypassing the due check");
                break;
            }
            match self.store.fetch_progress(&id).await {
                Ok(progress) if progress.is_due(Timestamp::now()) => break,
                Ok(_) => {
                    log::debug!("skipping {id}: not due yet");
                    self.cursor += 1;
                }
                Err(e) => {
                    log::error!("failed to fetch progress for {id}: {e}");
                    self.cursor += 1;
                }
            }
        }
        self.presented += 1;
    }

    /// End-of-pass draining: move flagged cards (or, failing that, the whole
    /// retry queue) back into the presentation sequence. Returns false when
    /// there is nothing left and the session is over.
    fn requeue_failed(&mut self) -> bool {
        if self.retry_queue.is_empty() {
            self.immediate.clear();
            return false;
        }
        let retry = std::mem::take(&mut self.retry_queue);
        let (flagged, rest): (Vec<Flashcard>, Vec<Flashcard>) = retry
            .into_iter()
            .partition(|card| self.immediate.contains(&card.id));
        // A flag with no matching queued card would pin the session open.
        self.immediate
            .retain(|id| flagged.iter().any(|card| &card.id == id));
        if flagged.is_empty() {
            log::debug!("re-queueing {} failed cards", rest.len());
            self.cards.extend(rest);
        } else {
            log::debug!("re-queueing {} cards for immediate review", flagged.len());
            self.cards.extend(flagged);
            self.retry_queue = rest;
        }
        self.cursor = 0;
        true
    }
}
