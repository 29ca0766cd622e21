//! Product-tunable constants for upgrade scoring.
//!
//! The defaults are the documented product values. A deployment can override
//! any subset from TOML:
//!
//! ```toml
//! rotating_multiplier = 2.5
//! max_results = 5
//!
//! [tiers]
//! unicorn_max = 0.8
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::{Category, Result};

/// Value class of an upgrade by its cost per gram saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueTier {
    Unicorn,
    Reasonable,
    Expensive,
    Madness,
}

/// Upper bounds of each tier in currency per gram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueTierThresholds {
    /// Strictly below this is a unicorn.
    pub unicorn_max: f64,
    /// Up to and including this is reasonable.
    pub reasonable_max: f64,
    /// Up to and including this is expensive; above is madness.
    pub expensive_max: f64,
}

impl Default for ValueTierThresholds {
    fn default() -> Self {
        Self {
            unicorn_max: 1.0,
            reasonable_max: 5.0,
            expensive_max: 10.0,
        }
    }
}

/// Score multiplier applied per tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierMultipliers {
    pub unicorn: f64,
    pub reasonable: f64,
    pub expensive: f64,
    pub madness: f64,
}

impl Default for TierMultipliers {
    fn default() -> Self {
        Self {
            unicorn: 1.5,
            reasonable: 1.0,
            expensive: 0.6,
            madness: 0.3,
        }
    }
}

/// Quick-win scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuickWinConfig {
    pub tiers: ValueTierThresholds,
    pub multipliers: TierMultipliers,
    /// Applied to weight saved on rotating categories.
    pub rotating_multiplier: f64,
    pub rotating_categories: Vec<Category>,
    /// Keep only the best `n` quick wins.
    pub max_results: Option<usize>,
    /// Drop candidates that would make the build invalid when swapped in.
    pub require_compatible: bool,
}

impl Default for QuickWinConfig {
    fn default() -> Self {
        Self {
            tiers: ValueTierThresholds::default(),
            multipliers: TierMultipliers::default(),
            rotating_multiplier: 2.0,
            rotating_categories: vec![
                Category::Wheel,
                Category::Wheelset,
                Category::Tire,
                Category::Tube,
                Category::Cassette,
                Category::BrakeRotor,
                Category::Chain,
            ],
            max_results: None,
            require_compatible: true,
        }
    }
}

impl QuickWinConfig {
    /// Parse a TOML override; absent fields keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Limit the number of results (builder pattern).
    pub fn with_max_results(mut self, n: usize) -> Self {
        self.max_results = Some(n);
        self
    }

    pub fn with_require_compatible(mut self, require: bool) -> Self {
        self.require_compatible = require;
        self
    }

    pub fn classify(&self, cost_per_gram: f64) -> ValueTier {
        let t = &self.tiers;
        if cost_per_gram < t.unicorn_max {
            ValueTier::Unicorn
        } else if cost_per_gram <= t.reasonable_max {
            ValueTier::Reasonable
        } else if cost_per_gram <= t.expensive_max {
            ValueTier::Expensive
        } else {
            ValueTier::Madness
        }
    }

    pub fn tier_multiplier(&self, tier: ValueTier) -> f64 {
        let m = &self.multipliers;
        match tier {
            ValueTier::Unicorn => m.unicorn,
            ValueTier::Reasonable => m.reasonable,
            ValueTier::Expensive => m.expensive,
            ValueTier::Madness => m.madness,
        }
    }

    pub fn is_rotating(&self, category: &Category) -> bool {
        self.rotating_categories.contains(category)
    }

    pub fn rotating_factor(&self, category: &Category) -> f64 {
        if self.is_rotating(category) {
            self.rotating_multiplier
        } else {
            1.0
        }
    }
}
