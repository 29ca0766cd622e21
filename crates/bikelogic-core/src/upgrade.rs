//! Upgrade optimizer and quick-win ranker.
//!
//! Upgrades are ranked by what a gram of saved weight costs. Quick wins blend
//! weight saved, rotating-mass significance and value tier into one score so
//! that a whole build can be searched for the best next purchase.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compat::{evaluate_build, RuleId};
use crate::config::{QuickWinConfig, ValueTier};
use crate::domain::{Build, Catalog, Category, Component};
use crate::obs;

/// One candidate that is lighter than the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeOption {
    pub candidate: Component,
    /// Grams; always positive.
    pub weight_saved: f64,
    /// Negative when the candidate is also cheaper.
    pub cost_added: f64,
    /// Zero when the upgrade costs nothing; never negative.
    pub cost_per_gram: f64,
    pub value_tier: ValueTier,
}

/// A scored upgrade for one slot of a build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickWin {
    pub slot: Category,
    pub baseline_id: String,
    pub option: UpgradeOption,
    pub score: f64,
}

/// Known totals for a build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildSummary {
    pub parts: usize,
    pub total_weight: f64,
    pub total_price: f64,
    /// Ids of parts whose weight is unknown and excluded from the total.
    pub unknown_weight: Vec<String>,
    /// Ids of parts whose price is unknown and excluded from the total.
    pub unknown_price: Vec<String>,
}

/// Compare `candidate` against `baseline`. `None` unless both weights and
/// prices are known and the candidate is strictly lighter.
pub fn evaluate_candidate(
    baseline: &Component,
    candidate: &Component,
    config: &QuickWinConfig,
) -> Option<UpgradeOption> {
    let (Some(base_weight), Some(base_price)) = (baseline.weight(), baseline.price()) else {
        return None;
    };
    let (Some(weight), Some(price)) = (candidate.weight(), candidate.price()) else {
        debug!(id = %candidate.id, "skipping candidate without weight or price");
        return None;
    };

    let weight_saved = base_weight - weight;
    if weight_saved <= 0.0 {
        return None;
    }
    let cost_added = price - base_price;
    let cost_per_gram = if cost_added > 0.0 {
        cost_added / weight_saved
    } else {
        0.0
    };

    Some(UpgradeOption {
        candidate: candidate.clone(),
        weight_saved,
        cost_added,
        cost_per_gram,
        value_tier: config.classify(cost_per_gram),
    })
}

/// Rank candidates that fit `baseline`'s slot, cheapest savings first. A
/// wheel and a wheelset compete for the same slot. Ties break on candidate id
/// so output order is stable.
pub fn rank_upgrades<'a>(
    baseline: &Component,
    candidates: impl IntoIterator<Item = &'a Component>,
    config: &QuickWinConfig,
) -> Vec<UpgradeOption> {
    if baseline.weight().is_none() || baseline.price().is_none() {
        debug!(id = %baseline.id, "baseline has no weight or price; nothing to rank");
    }

    let mut considered = 0usize;
    let mut options: Vec<UpgradeOption> = candidates
        .into_iter()
        .filter(|c| c.id != baseline.id && c.category.shares_slot(&baseline.category))
        .inspect(|_| considered += 1)
        .filter_map(|c| evaluate_candidate(baseline, c, config))
        .collect();

    options.sort_by(|a, b| {
        a.cost_per_gram
            .total_cmp(&b.cost_per_gram)
            .then_with(|| a.candidate.id.cmp(&b.candidate.id))
    });

    obs::emit_upgrades_ranked(&baseline.id, considered, options.len());
    options
}

/// Quick-win score: weight saved × rotating multiplier × tier multiplier.
pub fn quick_win_score(option: &UpgradeOption, config: &QuickWinConfig) -> f64 {
    option.weight_saved
        * config.rotating_factor(&option.candidate.category)
        * config.tier_multiplier(option.value_tier)
}

/// Search every slot of `build` for upgrades in `catalog` and rank them by
/// quick-win score, best first. Ties break on candidate id, then slot.
///
/// With `require_compatible`, a candidate is dropped when swapping it in
/// would introduce an error the build does not already have.
pub fn recommend_quick_wins(
    build: &Build,
    catalog: &Catalog,
    config: &QuickWinConfig,
) -> Vec<QuickWin> {
    let current_errors = blocking_rules(build);
    let mut wins = Vec::new();

    for baseline in build.components() {
        let candidates = catalog.by_slot(&baseline.category);
        for option in rank_upgrades(baseline, candidates, config) {
            if config.require_compatible {
                let mut trial = build.clone();
                trial.select(option.candidate.clone());
                if !blocking_rules(&trial).is_subset(&current_errors) {
                    debug!(
                        candidate = %option.candidate.id,
                        baseline = %baseline.id,
                        "dropping candidate that breaks the build"
                    );
                    continue;
                }
            }
            let score = quick_win_score(&option, config);
            wins.push(QuickWin {
                slot: baseline.category.clone(),
                baseline_id: baseline.id.clone(),
                option,
                score,
            });
        }
    }

    wins.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.option.candidate.id.cmp(&b.option.candidate.id))
            .then_with(|| a.slot.cmp(&b.slot))
    });
    if let Some(n) = config.max_results {
        wins.truncate(n);
    }

    obs::emit_quick_wins(build.len(), wins.len(), wins.first().map(|w| w.score));
    wins
}

fn blocking_rules(build: &Build) -> BTreeSet<RuleId> {
    evaluate_build(build)
        .errors()
        .map(|r| r.rule_id)
        .collect()
}

/// Total the known weight and price of a build.
pub fn build_summary(build: &Build) -> BuildSummary {
    let mut summary = BuildSummary {
        parts: build.len(),
        ..BuildSummary::default()
    };
    for part in build.components() {
        match part.weight() {
            Some(w) => summary.total_weight += w,
            None => summary.unknown_weight.push(part.id.clone()),
        }
        match part.price() {
            Some(p) => summary.total_price += p,
            None => summary.unknown_price.push(part.id.clone()),
        }
    }
    summary
}
