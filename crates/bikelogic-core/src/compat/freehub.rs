//! Freehub body matching.
//!
//! Freehub names are not standardized across ingestion sources ("Shimano HG"
//! vs "Shimano HG L2"), so this is the one comparison that tolerates
//! containment in either direction. It yields false positives for names that
//! merely share a prefix; replace the body with exact matching once freehub
//! names are cleaned up at ingestion.

use serde::{Deserialize, Serialize};

use crate::normalize::standard_key;

/// How a cassette mount relates to a wheel's supported freehub bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "matched", rename_all = "snake_case")]
pub enum FreehubMatch {
    /// The mount is a member of the set.
    Exact(String),
    /// The mount contains, or is contained by, a member of the set.
    Approximate(String),
    None,
}

impl FreehubMatch {
    pub fn is_compatible(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Match `cassette_mount` against the wheel's freehub set. Exact members win
/// over approximate ones; among approximate members the first in set order wins.
pub fn freehub_compatible(wheel_set: &[&str], cassette_mount: &str) -> FreehubMatch {
    let mount = standard_key(cassette_mount);
    if mount.is_empty() {
        return FreehubMatch::None;
    }

    if let Some(exact) = wheel_set.iter().find(|f| standard_key(f) == mount) {
        return FreehubMatch::Exact((*exact).to_string());
    }

    wheel_set
        .iter()
        .find(|f| {
            let body = standard_key(f);
            !body.is_empty() && (body.contains(&mount) || mount.contains(&body))
        })
        .map(|f| FreehubMatch::Approximate((*f).to_string()))
        .unwrap_or(FreehubMatch::None)
}
