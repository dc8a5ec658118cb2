//! The five content domains and the adapter from legacy spellings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Content category a preference, entity or card belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Music,
    Movie,
    Book,
    Food,
    Fashion,
}

impl Domain {
    pub const ALL: [Domain; 5] = [
        Domain::Music,
        Domain::Movie,
        Domain::Book,
        Domain::Food,
        Domain::Fashion,
    ];

    /// Domains a card batch covers when the caller does not name any.
    pub const DEFAULT_CARD_DOMAINS: [Domain; 4] =
        [Domain::Movie, Domain::Music, Domain::Book, Domain::Food];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Music => "music",
            Self::Movie => "movie",
            Self::Book => "book",
            Self::Food => "food",
            Self::Fashion => "fashion",
        }
    }

    /// Capitalised name used in generated titles ("Movie Challenge 1").
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Music => "Music",
            Self::Movie => "Movie",
            Self::Book => "Book",
            Self::Food => "Food",
            Self::Fashion => "Fashion",
        }
    }

    /// Value of the graph's `types` search parameter for this domain.
    #[must_use]
    pub const fn search_types(self) -> &'static str {
        match self {
            Self::Movie => "tv_show,movie",
            Self::Music => "artist",
            Self::Book => "book",
            Self::Food => "place",
            Self::Fashion => "brand",
        }
    }

    /// Entity type URN used in insight filters.
    #[must_use]
    pub const fn entity_urn(self) -> &'static str {
        match self {
            Self::Movie => "urn:entity:movie",
            Self::Music => "urn:entity:artist",
            Self::Book => "urn:entity:book",
            Self::Food => "urn:entity:place",
            Self::Fashion => "urn:entity:brand",
        }
    }

    /// Map any known spelling to its domain.
    ///
    /// Accepts the canonical names, plural and synonym forms stored by older
    /// profiles (`movies`, `books`, `restaurant`, `tv_show`, ...) and graph
    /// entity URNs (`urn:entity:artist`). Case and surrounding whitespace are
    /// ignored. Returns `None` for anything else.
    #[must_use]
    pub fn from_alias(raw: &str) -> Option<Self> {
        let lowered = raw.trim().to_ascii_lowercase().replace('-', "_");
        let key = lowered.strip_prefix("urn:entity:").unwrap_or(&lowered);
        let domain = match key {
            "music" | "musics" | "song" | "songs" | "artist" | "artists" | "album" | "albums" => {
                Self::Music
            }
            "movie" | "movies" | "film" | "films" | "cinema" | "tv" | "tv_show" | "tv_shows"
            | "show" | "shows" => Self::Movie,
            "book" | "books" | "literature" | "author" | "authors" | "reading" => Self::Book,
            "food" | "foods" | "restaurant" | "restaurants" | "cuisine" | "cuisines" | "dish"
            | "dishes" | "place" | "places" => Self::Food,
            "fashion" | "style" | "styles" | "clothing" | "brand" | "brands" => Self::Fashion,
            _ => return None,
        };
        Some(domain)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown content domain: {0}")]
pub struct UnknownDomain(pub String);

impl FromStr for Domain {
    type Err = UnknownDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_alias(s).ok_or_else(|| UnknownDomain(s.to_owned()))
    }
}

impl<'de> Deserialize<'de> for Domain {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
