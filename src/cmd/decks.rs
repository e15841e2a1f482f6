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

use crate::config::Config;
use crate::error::Fallible;
use crate::store::ApiClient;

/// Print the user's decks, one per line.
pub async fn list_decks(config: &Config) -> Fallible<()> {
    let client = ApiClient::new(&config.api);
    let decks = client.fetch_decks().await?;
    if decks.is_empty() {
        println!("You don't have any decks yet.");
        return Ok(());
    }
    for deck in &decks {
        match &deck.description {
            Some(description) => println!("{}  {} ({})", deck.id, deck.name, description),
            None => println!("{}  {}", deck.id, deck.name),
        }
    }
    Ok(())
}
