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
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

/// Recall quality at or above this value counts as a successful review.
pub const SUCCESS_THRESHOLD: u8 = 3;

/// A user's recall rating for a reviewed card.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    /// Complete blackout.
    Again,
    /// Incorrect, but remembered upon seeing the answer.
    Hard,
    /// Correct, with serious difficulty.
    Good,
    /// Perfect recall.
    Easy,
}

impl Rating {
    /// The numeric recall quality this rating maps to.
    pub fn quality(self) -> u8 {
        match self {
            Rating::Again => 0,
            Rating::Hard => 2,
            Rating::Good => 3,
            Rating::Easy => 5,
        }
    }

    pub fn is_success(self) -> bool {
        self.quality() >= SUCCESS_THRESHOLD
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rating::Again => "again",
            Rating::Hard => "hard",
            Rating::Good => "good",
            Rating::Easy => "easy",
        }
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Rating {
    type Err = InvalidRatingError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        match label {
            "again" => Ok(Rating::Again),
            "hard" => Ok(Rating::Hard),
            "good" => Ok(Rating::Good),
            "easy" => Ok(Rating::Easy),
            other => Err(InvalidRatingError {
                label: other.to_string(),
            }),
        }
    }
}

/// A rating label outside the recognized set. Rejected before any scheduling
/// change is applied.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct InvalidRatingError {
    label: String,
}

impl Display for InvalidRatingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid rating: {}", self.label)
    }
}

impl std::error::Error for InvalidRatingError {}
