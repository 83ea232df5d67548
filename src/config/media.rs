use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::services::mpris::{MPRIS_BUS_PREFIX, PlayerFilter};

/// Media service configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(default)]
pub struct MediaConfig {
    /// Bus name prefix that identifies a media player endpoint
    pub bus_prefix: String,

    /// List of player bus name patterns to ignore during discovery
    pub ignored_players: Vec<String>,
}

impl MediaConfig {
    /// Build the relevance filter for player discovery.
    pub fn player_filter(&self) -> PlayerFilter {
        PlayerFilter::new(self.bus_prefix.clone(), self.ignored_players.clone())
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            bus_prefix: MPRIS_BUS_PREFIX.to_string(),
            ignored_players: Vec::new(),
        }
    }
}
