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

use clap::ValueEnum;
use serde::Serialize;

use crate::config::Config;
use crate::error::Fallible;
use crate::scheduler::DifficultyBucket;
use crate::scheduler::describe_next_review;
use crate::scheduler::learning_stats;
use crate::scheduler::study_schedule;
use crate::store::ApiClient;
use crate::store::ProgressStore;
use crate::types::card::Flashcard;
use crate::types::progress::Progress;
use crate::types::timestamp::Timestamp;

#[derive(ValueEnum, Clone, Copy)]
pub enum StatsFormat {
    /// Plain text output.
    Text,
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckStats {
    deck_id: String,
    card_count: usize,
    due_count: usize,
    cards: Vec<CardStats>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CardStats {
    id: String,
    question: String,
    accuracy: f64,
    difficulty: DifficultyBucket,
    reviews: u32,
    next_review: String,
}

/// Print per-card scheduling statistics for a deck, most urgent first.
pub async fn print_deck_stats(config: &Config, deck_id: &str, format: StatsFormat) -> Fallible<()> {
    let client = ApiClient::new(&config.api);
    let stats = collect_deck_stats(&client, deck_id).await?;
    match format {
        StatsFormat::Text => {
            println!(
                "{}: {} cards, {} due now",
                stats.deck_id, stats.card_count, stats.due_count
            );
            for card in &stats.cards {
                println!(
                    "{:<40}  {:>5.1}%  {:<6}  {:>3} reviews  {}",
                    truncate(&card.question, 40),
                    card.accuracy,
                    card.difficulty.to_string(),
                    card.reviews,
                    card.next_review
                );
            }
        }
        StatsFormat::Json => {
            let stats_json = serde_json::to_string_pretty(&stats)?;
            println!("{stats_json}");
        }
    }
    Ok(())
}

async fn collect_deck_stats(client: &ApiClient, deck_id: &str) -> Fallible<DeckStats> {
    let cards = client.fetch_deck_flashcards(deck_id).await?;
    let now = Timestamp::now();
    let mut entries = Vec::new();
    for card in cards {
        // Same policy as the review loop: a card whose progress cannot be
        // fetched is skipped, not fatal.
        match client.fetch_progress(&card.id).await {
            Ok(progress) => entries.push((card, progress)),
            Err(e) => log::error!("skipping {}: {e}", card.id),
        }
    }
    let schedule = study_schedule(entries, now);
    let due_count = schedule.due.len();
    let cards: Vec<CardStats> = schedule
        .due
        .into_iter()
        .chain(schedule.upcoming)
        .map(|(card, progress)| card_stats(card, &progress, now))
        .collect();
    Ok(DeckStats {
        deck_id: deck_id.to_string(),
        card_count: cards.len(),
        due_count,
        cards,
    })
}

fn card_stats(card: Flashcard, progress: &Progress, now: Timestamp) -> CardStats {
    let stats = learning_stats(progress);
    let next_review = match progress.next_review_date {
        Some(next) => describe_next_review(next, now),
        None => "Due now".to_string(),
    };
    CardStats {
        id: card.id.to_string(),
        question: card.question,
        accuracy: stats.accuracy,
        difficulty: stats.difficulty,
        reviews: stats.reviews,
        next_review,
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max - 3).collect();
        format!("{head}...")
    }
}
