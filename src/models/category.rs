use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// Flat score bonus for each shared high-signal category
pub const HIGH_SIGNAL_BONUS: f64 = 0.1;

/// Taste category, matching the Qloo entity types users can pick interests from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Artist,
    Movie,
    Book,
    Album,
    TvShow,
    Brand,
    Videogame,
    Podcast,
    Actor,
    Director,
    Author,
    Person,
    Destination,
    Place,
    Locality,
    Tag,
    Demographics,
}

impl Category {
    /// Every category, in descending weight order
    pub const ALL: [Category; 17] = [
        Category::Artist,
        Category::Movie,
        Category::Book,
        Category::Album,
        Category::TvShow,
        Category::Brand,
        Category::Videogame,
        Category::Podcast,
        Category::Actor,
        Category::Director,
        Category::Author,
        Category::Person,
        Category::Destination,
        Category::Place,
        Category::Locality,
        Category::Tag,
        Category::Demographics,
    ];

    /// Cultural-salience weight used by the aggregator
    pub fn weight(self) -> f64 {
        match self {
            Category::Artist => 1.5,
            Category::Movie => 1.4,
            Category::Book | Category::Album => 1.3,
            Category::TvShow => 1.2,
            Category::Brand => 1.1,
            Category::Videogame | Category::Podcast => 1.0,
            Category::Actor | Category::Director | Category::Author => 0.9,
            Category::Person | Category::Destination => 0.8,
            Category::Place | Category::Locality => 0.7,
            Category::Tag => 0.6,
            Category::Demographics => 0.5,
        }
    }

    /// Whether sharing this category earns the flat bonus
    pub fn is_high_signal(self) -> bool {
        matches!(
            self,
            Category::Artist | Category::Movie | Category::Book | Category::Brand
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Artist => "artist",
            Category::Movie => "movie",
            Category::Book => "book",
            Category::Album => "album",
            Category::TvShow => "tv_show",
            Category::Brand => "brand",
            Category::Videogame => "videogame",
            Category::Podcast => "podcast",
            Category::Actor => "actor",
            Category::Director => "director",
            Category::Author => "author",
            Category::Person => "person",
            Category::Destination => "destination",
            Category::Place => "place",
            Category::Locality => "locality",
            Category::Tag => "tag",
            Category::Demographics => "demographics",
        }
    }

    /// Qloo entity URN used as the insights `filter.type`
    pub fn qloo_urn(self) -> String {
        format!("urn:entity:{}", self.as_str())
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
