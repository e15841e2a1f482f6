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

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

use crate::cmd::decks::list_decks;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_deck_stats;
use crate::config::Config;
use crate::error::Fallible;
use crate::review::server::start_review_server;

/// Review Flasheeta decks from the command line.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Optional path to the configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Review a deck in the browser.
    Review {
        /// The deck to review.
        deck_id: String,
        /// Port for the local review server.
        #[arg(long)]
        port: Option<u16>,
    },
    /// List your decks.
    Decks,
    /// Show per-card scheduling statistics for a deck.
    Stats {
        /// The deck to inspect.
        deck_id: String,
        /// Output format.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli = Cli::parse();
    let config = Config::resolve(cli.config)?;
    match cli.command {
        Command::Review { deck_id, port } => {
            let port = port.unwrap_or(config.review.port);
            start_review_server(&config, &deck_id, port).await
        }
        Command::Decks => list_decks(&config).await,
        Command::Stats { deck_id, format } => print_deck_stats(&config, &deck_id, format).await,
    }
}
