use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The six regions stories are grouped by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Continent {
    Africa,
    Asia,
    Europe,
    #[serde(rename = "North America")]
    NorthAmerica,
    #[serde(rename = "South America")]
    SouthAmerica,
    #[default]
    Oceania,
}

impl Continent {
    pub const ALL: [Continent; 6] = [
        Continent::Africa,
        Continent::Asia,
        Continent::Europe,
        Continent::NorthAmerica,
        Continent::SouthAmerica,
        Continent::Oceania,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Continent::Africa => "Africa",
            Continent::Asia => "Asia",
            Continent::Europe => "Europe",
            Continent::NorthAmerica => "North America",
            Continent::SouthAmerica => "South America",
            Continent::Oceania => "Oceania",
        }
    }

    /// Key used by the proxy cache.
    pub fn cache_key(self) -> String {
        self.name().to_lowercase()
    }
}

impl fmt::Display for Continent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown continent: {0}")]
pub struct UnknownContinent(pub String);

impl FromStr for Continent {
    type Err = UnknownContinent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| if c == '-' || c == '_' { ' ' } else { c })
            .collect::<String>()
            .to_lowercase();

        Continent::ALL
            .into_iter()
            .find(|c| c.cache_key() == normalized)
            .ok_or_else(|| UnknownContinent(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scripture {
    pub reference: String,
    pub text: String,
    pub application: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub continent: Continent,
    pub ideology: String,
    pub scripture: Scripture,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

/// Body of a successful news response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsPayload {
    pub stories: Vec<Story>,
    pub sources: Vec<GroundingSource>,
}
