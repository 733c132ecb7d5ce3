use serde::{Deserialize, Serialize};

use super::ids::ChampionId;

/// The current free-to-play pool, split into the general tier and the tier
/// offered to accounts up to `beginner_max_level`.
///
/// Order of both lists is the order the server sent them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionRotation {
    pub beginner_max_level: u32,
    pub beginner_champions: Vec<Champion>,
    pub regular_champions: Vec<Champion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Champion {
    pub id: ChampionId,
    pub name: String,
    pub image_url: String,
}

impl Champion {
    pub fn new(id: impl Into<ChampionId>, name: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image_url: image_url.into(),
        }
    }

    pub fn matches(&self, normalized_query: &str) -> bool {
        self.name.to_lowercase().contains(normalized_query)
    }
}
