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

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::Fallible;
use crate::error::fail;

/// Path tried when no `--config` flag is given.
const DEFAULT_CONFIG_PATH: &str = "flasheeta.toml";

/// Application configuration, read from a TOML file. Every section is
/// optional and falls back to its defaults. Configuration is threaded into
/// the scheduler and session at construction, never read from globals, so
/// two sessions can run with different settings.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub review: ReviewConfig,
    pub scheduler: SchedulerConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the Flasheeta backend.
    pub base_url: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Port the local review server binds to.
    pub port: u16,
}

/// Constants of the scheduling policy.
#[derive(Clone, Copy, PartialEq, Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Fixed retry delay, in minutes, for cards rated "again".
    pub again_minutes: f64,
    /// Fixed retry delay, in minutes, for cards rated "hard".
    pub hard_minutes: f64,
    /// Ease factor assigned to cards that have never been scheduled.
    pub initial_ease_factor: f64,
    pub min_ease_factor: f64,
    pub max_ease_factor: f64,
    /// Interval after the first successful review, in days.
    pub first_interval_days: f64,
    /// Interval after the second successful review, in days.
    pub second_interval_days: f64,
    /// Interval growth multiplier for cards rated "easy".
    pub easy_bonus: f64,
    /// Scheduling horizon, in days.
    pub max_interval_days: f64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
        }
    }
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self { port: 8000 }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            again_minutes: 10.0,
            hard_minutes: 15.0,
            initial_ease_factor: 2.5,
            min_ease_factor: 1.3,
            max_ease_factor: 2.5,
            first_interval_days: 1.0,
            second_interval_days: 6.0,
            easy_bonus: 1.3,
            max_interval_days: 365.0,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Fallible<Self> {
        if !path.exists() {
            return fail("configuration file does not exist.");
        }
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Resolve the configuration: an explicit path must exist; the default
    /// path is used when present and silently skipped otherwise.
    pub fn resolve(path: Option<PathBuf>) -> Fallible<Self> {
        match path {
            Some(path) => Self::load(&path),
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::load(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:5000");
        assert_eq!(config.review.port, 8000);
        assert_eq!(config.scheduler.again_minutes, 10.0);
        assert_eq!(config.scheduler.hard_minutes, 15.0);
        assert_eq!(config.scheduler.max_interval_days, 365.0);
    }

    #[test]
    fn test_load_full_file() {
        let file = write_config(
            r#"
            [api]
            base_url = "https://flasheeta.example.com"

            [review]
            port = 9000

            [scheduler]
            again_minutes = 5.0
            easy_bonus = 1.5
            "#,
        );
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.api.base_url, "https://flasheeta.example.com");
        assert_eq!(config.review.port, 9000);
        assert_eq!(config.scheduler.again_minutes, 5.0);
        assert_eq!(config.scheduler.easy_bonus, 1.5);
        // Unset keys keep their defaults.
        assert_eq!(config.scheduler.hard_minutes, 15.0);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = Config::load(Path::new("./derpherp.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_without_path_uses_defaults() {
        let config = Config::resolve(None).unwrap();
        assert_eq!(config.review.port, 8000);
    }
}
