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

use serde::Deserialize;
use serde::Serialize;

use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

/// Ease factor assumed for a record that has never been scheduled.
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Interval, in days, assumed for a record that has never been scheduled.
pub const DEFAULT_INTERVAL_DAYS: f64 = 1.0;

/// A card's scheduling state, owned by the backend and mutated only through
/// the scheduler's output.
///
/// Wire format: timestamps are ISO-8601 UTC strings, `interval` is in days
/// and may be fractional. Partially-initialized records are tolerated:
/// missing counters deserialize to zero, missing `ease_factor`/`interval` to
/// their defaults, and missing dates to `None` (an unscheduled card is due).
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Progress {
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub correct_count: u32,
    #[serde(default = "default_ease_factor")]
    pub ease_factor: f64,
    #[serde(default = "default_interval")]
    pub interval: f64,
    #[serde(default)]
    pub last_review_date: Option<Timestamp>,
    #[serde(default)]
    pub next_review_date: Option<Timestamp>,
    #[serde(default)]
    pub difficulty_rating: Option<Rating>,
}

fn default_ease_factor() -> f64 {
    DEFAULT_EASE_FACTOR
}

fn default_interval() -> f64 {
    DEFAULT_INTERVAL_DAYS
}

impl Progress {
    /// Whether the card should be shown now.
    pub fn is_due(&self, now: Timestamp) -> bool {
        match self.next_review_date {
            Some(next) => now >= next,
            None => true,
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            review_count: 0,
            correct_count: 0,
            ease_factor: DEFAULT_EASE_FACTOR,
            interval: DEFAULT_INTERVAL_DAYS,
            last_review_date: None,
            next_review_date: None,
            difficulty_rating: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;

    fn ts(hour: u32) -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap())
    }

    #[test]
    fn test_deserialize_full_record() {
        let json = r#"{
            "review_count": 4,
            "correct_count": 3,
            "ease_factor": 2.36,
            "interval": 6.0,
            "last_review_date": "2025-03-01T09:00:00Z",
            "next_review_date": "2025-03-07T09:00:00Z",
            "difficulty_rating": "good"
        }"#;
        let progress: Progress = serde_json::from_str(json).unwrap();
        assert_eq!(progress.review_count, 4);
        assert_eq!(progress.correct_count, 3);
        assert_eq!(progress.ease_factor, 2.36);
        assert_eq!(progress.difficulty_rating, Some(Rating::Good));
    }

    #[test]
    fn test_missing_fields_are_defaulted() {
        let progress: Progress = serde_json::from_str("{}").unwrap();
        assert_eq!(progress.review_count, 0);
        assert_eq!(progress.correct_count, 0);
        assert_eq!(progress.ease_factor, DEFAULT_EASE_FACTOR);
        assert_eq!(progress.interval, DEFAULT_INTERVAL_DAYS);
        assert!(progress.last_review_date.is_none());
        assert!(progress.difficulty_rating.is_none());
    }

    #[test]
    fn test_null_rating_is_accepted() {
        let progress: Progress =
            serde_json::from_str(r#"{"difficulty_rating": null}"#).unwrap();
        assert!(progress.difficulty_rating.is_none());
    }

    #[test]
    fn test_unscheduled_card_is_due() {
        assert!(Progress::default().is_due(ts(9)));
    }

    #[test]
    fn test_due_when_next_review_date_has_passed() {
        let progress = Progress {
            next_review_date: Some(ts(9)),
            ..Progress::default()
        };
        assert!(!progress.is_due(ts(8)));
        assert!(progress.is_due(ts(9)));
        assert!(progress.is_due(ts(10)));
    }
}
