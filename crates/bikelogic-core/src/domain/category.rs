//! Component categories.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category tag of a catalog entry.
///
/// New categories may appear in ingested data; they parse to
/// [`Category::Other`] and are excluded from every category-specific rule.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Frame,
    Fork,
    Wheel,
    Wheelset,
    Tire,
    Tube,
    BottomBracket,
    Crankset,
    Cassette,
    Chain,
    RearDerailleur,
    Shifter,
    BrakeCaliper,
    BrakeRotor,
    Stem,
    Handlebar,
    Seatpost,
    Saddle,
    Pedal,
    PowerMeter,
    Other(String),
}

const KNOWN: &[Category] = &[
    Category::Frame,
    Category::Fork,
    Category::Wheel,
    Category::Wheelset,
    Category::Tire,
    Category::Tube,
    Category::BottomBracket,
    Category::Crankset,
    Category::Cassette,
    Category::Chain,
    Category::RearDerailleur,
    Category::Shifter,
    Category::BrakeCaliper,
    Category::BrakeRotor,
    Category::Stem,
    Category::Handlebar,
    Category::Seatpost,
    Category::Saddle,
    Category::Pedal,
    Category::PowerMeter,
];

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Frame => "Frame",
            Self::Fork => "Fork",
            Self::Wheel => "Wheel",
            Self::Wheelset => "Wheelset",
            Self::Tire => "Tire",
            Self::Tube => "Tube",
            Self::BottomBracket => "BottomBracket",
            Self::Crankset => "Crankset",
            Self::Cassette => "Cassette",
            Self::Chain => "Chain",
            Self::RearDerailleur => "RearDerailleur",
            Self::Shifter => "Shifter",
            Self::BrakeCaliper => "BrakeCaliper",
            Self::BrakeRotor => "BrakeRotor",
            Self::Stem => "Stem",
            Self::Handlebar => "Handlebar",
            Self::Seatpost => "Seatpost",
            Self::Saddle => "Saddle",
            Self::Pedal => "Pedal",
            Self::PowerMeter => "PowerMeter",
            Self::Other(name) => name,
        }
    }

    /// Parse a category tag, tolerating casing and separator drift
    /// (`bottom_bracket`, `Bottom Bracket` and `BottomBracket` are equal).
    pub fn parse(raw: &str) -> Self {
        let folded = fold(raw);
        KNOWN
            .iter()
            .find(|c| fold(c.as_str()) == folded)
            .cloned()
            .unwrap_or_else(|| Self::Other(raw.trim().to_string()))
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Wheels and wheelsets fill the same slot of a build.
    pub fn is_wheel(&self) -> bool {
        matches!(self, Self::Wheel | Self::Wheelset)
    }

    /// Whether a part of `other` could take this category's place in a build.
    pub fn shares_slot(&self, other: &Category) -> bool {
        self == other || (self.is_wheel() && other.is_wheel())
    }
}

fn fold(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
