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

//! The spaced repetition scheduling policy.
//!
//! A hybrid of the classical SM-2 algorithm and fixed short retry delays:
//! failed reviews get a fixed sub-day interval so the card resurfaces within
//! the same sitting, successful reviews grow multiplicatively with the
//! card's ease factor. Everything here is pure: state in, state out.

use std::fmt::Display;
use std::fmt::Formatter;

use chrono::Duration;
use serde::Serialize;

use crate::config::SchedulerConfig;
use crate::types::card::Flashcard;
use crate::types::progress::Progress;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

/// Flat ease penalty applied on a failed review.
const EASE_PENALTY: f64 = 0.2;

/// Ease factor below which a card is considered hard.
const HARD_EASE_THRESHOLD: f64 = 2.0;

/// Ease factor above which a card is considered easy.
const EASY_EASE_THRESHOLD: f64 = 2.7;

pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// Compute the scheduling state that follows `progress` after the user
    /// rates a card. Pure: the caller persists the result.
    ///
    /// Failed ratings get a fixed short interval (`again` and `hard` have
    /// their own delays) and an ease penalty. Successful ratings follow
    /// SM-2: 1 day, then 6 days, then the prior interval scaled by the ease
    /// factor, with a growth bonus for "easy".
    pub fn next_progress(&self, progress: &Progress, rating: Rating, now: Timestamp) -> Progress {
        let config = &self.config;
        let review_count = progress.review_count + 1;
        let correct_count = if rating.is_success() {
            progress.correct_count + 1
        } else {
            progress.correct_count
        };

        // Non-positive values are treated the same as missing fields.
        let mut ease_factor = if progress.ease_factor > 0.0 {
            progress.ease_factor
        } else {
            config.initial_ease_factor
        };
        let prior_interval = if progress.interval > 0.0 {
            progress.interval
        } else {
            config.first_interval_days
        };

        let interval = if rating.is_success() {
            let interval = if review_count == 1 {
                config.first_interval_days
            } else if review_count == 2 {
                config.second_interval_days
            } else {
                (prior_interval * ease_factor * self.growth_multiplier(rating)).round()
            };
            let quality = f64::from(rating.quality());
            ease_factor += 0.1 - (5.0 - quality) * (0.08 + (5.0 - quality) * 0.02);
            interval
        } else {
            ease_factor -= EASE_PENALTY;
            match rating {
                Rating::Again => config.again_minutes / MINUTES_PER_DAY,
                _ => config.hard_minutes / MINUTES_PER_DAY,
            }
        };

        let ease_factor = ease_factor.clamp(config.min_ease_factor, config.max_ease_factor);
        let interval = interval.clamp(self.min_interval_days(), config.max_interval_days);

        Progress {
            review_count,
            correct_count,
            ease_factor: round_to_hundredths(ease_factor),
            interval,
            last_review_date: Some(now),
            next_review_date: Some(now.plus_days(interval)),
            difficulty_rating: Some(rating),
        }
    }

    /// Interval growth multiplier for a successful review.
    fn growth_multiplier(&self, rating: Rating) -> f64 {
        match rating {
            Rating::Easy => self.config.easy_bonus,
            Rating::Again | Rating::Hard | Rating::Good => 1.0,
        }
    }

    /// The shortest representable interval: the "again" retry delay.
    fn min_interval_days(&self) -> f64 {
        self.config.again_minutes / MINUTES_PER_DAY
    }
}

/// Keep stored ease factors stable across round trips.
fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Render the time until the next review as a human sentence, bucketed into
/// minutes, hours, or days.
pub fn describe_next_review(next_review: Timestamp, now: Timestamp) -> String {
    let remaining = next_review.since(now);
    if remaining <= Duration::zero() {
        return "Due now".to_string();
    }
    let days = remaining.num_days();
    let hours = remaining.num_hours();
    let minutes = remaining.num_minutes();
    if days > 0 {
        format!("Due in {} day{}", days, plural(days))
    } else if hours > 0 {
        format!("Due in {} hour{}", hours, plural(hours))
    } else {
        format!("Due in {} minute{}", minutes, plural(minutes))
    }
}

fn plural(count: i64) -> &'static str {
    if count == 1 { "" } else { "s" }
}

/// Aggregate learning statistics derived from a progress record.
#[derive(Clone, Debug, Serialize)]
pub struct LearningStats {
    /// Share of reviews that were successful, as a percentage.
    pub accuracy: f64,
    pub difficulty: DifficultyBucket,
    pub reviews: u32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub enum DifficultyBucket {
    Hard,
    Medium,
    Easy,
}

impl Display for DifficultyBucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DifficultyBucket::Hard => write!(f, "Hard"),
            DifficultyBucket::Medium => write!(f, "Medium"),
            DifficultyBucket::Easy => write!(f, "Easy"),
        }
    }
}

pub fn learning_stats(progress: &Progress) -> LearningStats {
    let accuracy = if progress.review_count > 0 {
        f64::from(progress.correct_count) / f64::from(progress.review_count) * 100.0
    } else {
        0.0
    };
    let difficulty = if progress.ease_factor < HARD_EASE_THRESHOLD {
        DifficultyBucket::Hard
    } else if progress.ease_factor > EASY_EASE_THRESHOLD {
        DifficultyBucket::Easy
    } else {
        DifficultyBucket::Medium
    };
    LearningStats {
        accuracy,
        difficulty,
        reviews: progress.review_count,
    }
}

/// Cards partitioned into due-now and upcoming, each sorted so the most
/// urgent comes first.
pub struct StudySchedule {
    pub due: Vec<(Flashcard, Progress)>,
    pub upcoming: Vec<(Flashcard, Progress)>,
}

pub fn study_schedule(entries: Vec<(Flashcard, Progress)>, now: Timestamp) -> StudySchedule {
    let (mut due, mut upcoming): (Vec<_>, Vec<_>) = entries
        .into_iter()
        .partition(|(_, progress)| progress.is_due(now));
    due.sort_by_key(|(_, progress)| progress.next_review_date);
    upcoming.sort_by_key(|(_, progress)| progress.next_review_date);
    StudySchedule { due, upcoming }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::types::card::FlashcardId;

    fn scheduler() -> Scheduler {
        Scheduler::new(SchedulerConfig::default())
    }

    fn now() -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap())
    }

    fn card(id: &str) -> Flashcard {
        Flashcard {
            id: FlashcardId::new(id),
            deck_id: "d1".to_string(),
            question: "q".to_string(),
            answer: "a".to_string(),
        }
    }

    #[test]
    fn test_first_good_review_schedules_one_day() {
        let progress = scheduler().next_progress(&Progress::default(), Rating::Good, now());
        assert_eq!(progress.review_count, 1);
        assert_eq!(progress.correct_count, 1);
        assert_eq!(progress.interval, 1.0);
        assert_eq!(progress.next_review_date, Some(now().plus_days(1.0)));
    }

    #[test]
    fn test_second_good_review_schedules_six_days() {
        let first = scheduler().next_progress(&Progress::default(), Rating::Good, now());
        let second = scheduler().next_progress(&first, Rating::Good, now());
        assert_eq!(second.interval, 6.0);
    }

    #[test]
    fn test_third_good_review_scales_by_ease_factor() {
        let sched = scheduler();
        let mut progress = Progress::default();
        for _ in 0..2 {
            progress = sched.next_progress(&progress, Rating::Good, now());
        }
        // After two "good" ratings the ease factor has dropped to 2.22.
        assert_eq!(progress.ease_factor, 2.22);
        let third = sched.next_progress(&progress, Rating::Good, now());
        assert_eq!(third.interval, (6.0f64 * 2.22).round());
    }

    #[test]
    fn test_easy_review_accelerates_growth() {
        let base = Progress {
            review_count: 5,
            correct_count: 5,
            ease_factor: 2.0,
            interval: 10.0,
            ..Progress::default()
        };
        let progress = scheduler().next_progress(&base, Rating::Easy, now());
        assert_eq!(progress.interval, (10.0f64 * 2.0 * 1.3).round());
    }

    #[test]
    fn test_again_schedules_ten_minutes() {
        let base = Progress {
            review_count: 7,
            correct_count: 6,
            ease_factor: 2.5,
            interval: 200.0,
            ..Progress::default()
        };
        let progress = scheduler().next_progress(&base, Rating::Again, now());
        assert_eq!(progress.interval, 10.0 / 1440.0);
        let next = progress.next_review_date.unwrap();
        assert_eq!(next.since(now()), Duration::minutes(10));
    }

    #[test]
    fn test_hard_schedules_fifteen_minutes() {
        let progress = scheduler().next_progress(&Progress::default(), Rating::Hard, now());
        assert_eq!(progress.interval, 15.0 / 1440.0);
        let next = progress.next_review_date.unwrap();
        assert_eq!(next.since(now()), Duration::minutes(15));
    }

    #[test]
    fn test_failure_reduces_ease_factor() {
        let progress = scheduler().next_progress(&Progress::default(), Rating::Again, now());
        assert_eq!(progress.ease_factor, 2.3);
        assert_eq!(progress.correct_count, 0);
    }

    #[test]
    fn test_ease_factor_stays_in_bounds() {
        let sched = scheduler();
        for rating in [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy] {
            for start in [1.3, 2.0, 2.5] {
                let mut progress = Progress {
                    ease_factor: start,
                    ..Progress::default()
                };
                for _ in 0..10 {
                    progress = sched.next_progress(&progress, rating, now());
                    assert!(progress.ease_factor >= 1.3);
                    assert!(progress.ease_factor <= 2.5);
                }
            }
        }
    }

    #[test]
    fn test_interval_capped_at_the_horizon() {
        let base = Progress {
            review_count: 20,
            correct_count: 20,
            ease_factor: 2.5,
            interval: 300.0,
            ..Progress::default()
        };
        let progress = scheduler().next_progress(&base, Rating::Easy, now());
        assert_eq!(progress.interval, 365.0);
    }

    #[test]
    fn test_interval_floor_applies_after_a_retry() {
        // A success right after a failure would round the product down to
        // zero days; the floor brings it back to the retry delay.
        let failed = Progress {
            review_count: 3,
            correct_count: 1,
            ease_factor: 2.1,
            interval: 10.0 / 1440.0,
            ..Progress::default()
        };
        let progress = scheduler().next_progress(&failed, Rating::Good, now());
        assert_eq!(progress.interval, 10.0 / 1440.0);
    }

    #[test]
    fn test_correct_count_never_exceeds_review_count() {
        let sched = scheduler();
        let mut progress = Progress::default();
        let ratings = [
            Rating::Again,
            Rating::Good,
            Rating::Hard,
            Rating::Easy,
            Rating::Good,
            Rating::Again,
        ];
        for rating in ratings {
            progress = sched.next_progress(&progress, rating, now());
            assert!(progress.correct_count <= progress.review_count);
        }
        assert_eq!(progress.review_count, 6);
        assert_eq!(progress.correct_count, 3);
    }

    #[test]
    fn test_ease_factor_is_rounded_to_two_decimals() {
        let progress = scheduler().next_progress(&Progress::default(), Rating::Good, now());
        // 2.5 + (0.1 - 2 * 0.12) = 2.36, with no floating dust.
        assert_eq!(progress.ease_factor, 2.36);
    }

    #[test]
    fn test_zeroed_record_is_defaulted() {
        // Some backends zero-initialize numeric columns; treat that like a
        // fresh record rather than scheduling from a zero ease factor.
        let zeroed = Progress {
            ease_factor: 0.0,
            interval: 0.0,
            ..Progress::default()
        };
        let progress = scheduler().next_progress(&zeroed, Rating::Good, now());
        assert_eq!(progress.interval, 1.0);
        assert_eq!(progress.ease_factor, 2.36);
    }

    #[test]
    fn test_rating_is_retained_for_display() {
        let progress = scheduler().next_progress(&Progress::default(), Rating::Hard, now());
        assert_eq!(progress.difficulty_rating, Some(Rating::Hard));
        assert_eq!(progress.last_review_date, Some(now()));
    }

    #[test]
    fn test_describe_next_review_buckets() {
        assert_eq!(describe_next_review(now(), now()), "Due now");
        assert_eq!(
            describe_next_review(now().plus_days(10.0 / 1440.0), now()),
            "Due in 10 minutes"
        );
        assert_eq!(
            describe_next_review(now().plus_days(3.0 / 24.0), now()),
            "Due in 3 hours"
        );
        assert_eq!(
            describe_next_review(now().plus_days(1.0), now()),
            "Due in 1 day"
        );
        assert_eq!(
            describe_next_review(now().plus_days(6.0), now()),
            "Due in 6 days"
        );
    }

    #[test]
    fn test_learning_stats_accuracy() {
        let stats = learning_stats(&Progress::default());
        assert_eq!(stats.accuracy, 0.0);
        assert_eq!(stats.reviews, 0);

        let progress = Progress {
            review_count: 4,
            correct_count: 3,
            ..Progress::default()
        };
        assert_eq!(learning_stats(&progress).accuracy, 75.0);
    }

    #[test]
    fn test_learning_stats_difficulty_buckets() {
        let at = |ease_factor| {
            learning_stats(&Progress {
                ease_factor,
                ..Progress::default()
            })
            .difficulty
        };
        assert_eq!(at(1.5), DifficultyBucket::Hard);
        assert_eq!(at(2.5), DifficultyBucket::Medium);
        assert_eq!(at(2.8), DifficultyBucket::Easy);
    }

    #[test]
    fn test_study_schedule_partitions_and_sorts() {
        let scheduled = |hours: f64| Progress {
            next_review_date: Some(now().plus_days(hours / 24.0)),
            ..Progress::default()
        };
        let entries = vec![
            (card("a"), scheduled(48.0)),
            (card("b"), scheduled(-2.0)),
            (card("c"), scheduled(24.0)),
            (card("d"), scheduled(-1.0)),
        ];
        let schedule = study_schedule(entries, now());
        let ids = |cards: &[(Flashcard, Progress)]| {
            cards
                .iter()
                .map(|(card, _)| card.id.to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(&schedule.due), vec!["b", "d"]);
        assert_eq!(ids(&schedule.upcoming), vec!["c", "a"]);
    }
}
