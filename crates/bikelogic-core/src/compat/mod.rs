//! Compatibility validator.
//!
//! Each rule group is a separate entry point taking a context of optional
//! components, so a partial build can be checked with whatever has been picked
//! so far. Every rule in a group always produces exactly one
//! [`ValidationResult`]; a rule never stops the ones after it, and a rule whose
//! inputs are missing reports [`Outcome::Indeterminate`] instead of failing.

use serde::{Deserialize, Serialize};

use crate::domain::{Category, Component, EngineError, Result};

mod build;
mod freehub;
mod rules;

pub(crate) use build::evaluate_build;
pub use build::validate_build;
pub use freehub::{freehub_compatible, FreehubMatch};
pub use rules::{
    validate_bottom_bracket, validate_brakes, validate_cockpit, validate_drivetrain,
    validate_wheel_fit, BottomBracketContext, BrakeContext, CockpitContext, DrivetrainContext,
    WheelContext,
};

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Identifier of a single compatibility rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    /// Frame shell standard equals the shell the bottom bracket fits.
    BottomBracketShell,
    /// Crank spindle is the bottom bracket's primary or declared alternate spindle.
    BottomBracketSpindle,
    RearAxle,
    FrontAxle,
    TireDiameter,
    TireClearance,
    Freehub,
    ShiftProtocol,
    SpeedCount,
    /// Derailleur max cog covers the cassette's largest cog.
    DerailleurCapacity,
    HeadTube,
    SteererClamp,
    HandlebarClamp,
    SeatpostDiameter,
    RotorMount,
    BrakeMount,
}

impl RuleId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BottomBracketShell => "bottom_bracket_shell",
            Self::BottomBracketSpindle => "bottom_bracket_spindle",
            Self::RearAxle => "rear_axle",
            Self::FrontAxle => "front_axle",
            Self::TireDiameter => "tire_diameter",
            Self::TireClearance => "tire_clearance",
            Self::Freehub => "freehub",
            Self::ShiftProtocol => "shift_protocol",
            Self::SpeedCount => "speed_count",
            Self::DerailleurCapacity => "derailleur_capacity",
            Self::HeadTube => "head_tube",
            Self::SteererClamp => "steerer_clamp",
            Self::HandlebarClamp => "handlebar_clamp",
            Self::SeatpostDiameter => "seatpost_diameter",
            Self::RotorMount => "rotor_mount",
            Self::BrakeMount => "brake_mount",
        }
    }

    /// Severity of a violation of this rule.
    ///
    /// Speed-count disagreement and tire clearance are commonly tolerated in
    /// practice, so they warn. Everything else makes assembly impossible.
    pub fn severity(self) -> Severity {
        match self {
            Self::SpeedCount | Self::TireClearance => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// Outcome of one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    Fail,
    /// A required part or field is absent; nothing can be concluded.
    Indeterminate,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// One rule's outcome with a human-readable explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub rule_id: RuleId,
    pub outcome: Outcome,
    pub severity: Severity,
    pub message: String,
}

impl ValidationResult {
    pub fn pass(rule_id: RuleId, message: impl Into<String>) -> Self {
        Self {
            rule_id,
            outcome: Outcome::Pass,
            severity: rule_id.severity(),
            message: message.into(),
        }
    }

    /// A violation at the rule's own severity.
    pub fn fail(rule_id: RuleId, message: impl Into<String>) -> Self {
        Self {
            rule_id,
            outcome: Outcome::Fail,
            severity: rule_id.severity(),
            message: message.into(),
        }
    }

    /// A violation downgraded to a warning regardless of the rule's severity.
    pub fn warn(rule_id: RuleId, message: impl Into<String>) -> Self {
        Self {
            rule_id,
            outcome: Outcome::Fail,
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn indeterminate(rule_id: RuleId, reason: impl Into<String>) -> Self {
        Self {
            rule_id,
            outcome: Outcome::Indeterminate,
            severity: rule_id.severity(),
            message: format!("cannot evaluate: {}", reason.into()),
        }
    }

    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Pass
    }

    /// Whether this result makes a build invalid.
    pub fn is_blocking(&self) -> bool {
        self.outcome == Outcome::Fail && self.severity == Severity::Error
    }
}

/// Ordered list of rule results plus the overall verdict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub results: Vec<ValidationResult>,
    /// True iff no error-severity rule failed.
    pub is_valid: bool,
}

impl ValidationReport {
    pub fn from_results(results: Vec<ValidationResult>) -> Self {
        let is_valid = !results.iter().any(ValidationResult::is_blocking);
        Self { results, is_valid }
    }

    /// Append another report's results, keeping order.
    pub fn merge(mut self, other: ValidationReport) -> Self {
        self.results.extend(other.results);
        Self::from_results(self.results)
    }

    pub fn result(&self, rule_id: RuleId) -> Option<&ValidationResult> {
        self.results.iter().find(|r| r.rule_id == rule_id)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter().filter(|r| r.is_blocking())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results
            .iter()
            .filter(|r| r.outcome == Outcome::Fail && r.severity == Severity::Warning)
    }

    pub fn indeterminate(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results
            .iter()
            .filter(|r| r.outcome == Outcome::Indeterminate)
    }
}

// ---------------------------------------------------------------------------
// Role checks
// ---------------------------------------------------------------------------

/// Reject a component passed in a role its category does not declare.
pub(crate) fn expect_role<'a>(
    component: Option<&'a Component>,
    role: &'static str,
    accepted: &[Category],
) -> Result<Option<&'a Component>> {
    match component {
        Some(c) if !accepted.contains(&c.category) => Err(EngineError::CategoryMismatch {
            role,
            expected: accepted
                .iter()
                .map(Category::as_str)
                .collect::<Vec<_>>()
                .join(" or "),
            actual: c.category.clone(),
            id: c.id.clone(),
        }),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_do_not_invalidate() {
        let report = ValidationReport::from_results(vec![
            ValidationResult::pass(RuleId::ShiftProtocol, "ok"),
            ValidationResult::fail(RuleId::SpeedCount, "12 vs 11"),
            ValidationResult::indeterminate(RuleId::RearAxle, "no wheel selected"),
        ]);
        assert!(report.is_valid);
        assert_eq!(report.warnings().count(), 1);
        assert_eq!(report.indeterminate().count(), 1);
    }

    #[test]
    fn error_failure_invalidates() {
        let report = ValidationReport::from_results(vec![ValidationResult::fail(
            RuleId::RearAxle,
            "TA_12x142mm ≠ TA_12x148mm",
        )]);
        assert!(!report.is_valid);
        assert_eq!(report.errors().count(), 1);
    }

    #[test]
    fn merge_recomputes_validity() {
        let ok = ValidationReport::from_results(vec![ValidationResult::pass(
            RuleId::RearAxle,
            "ok",
        )]);
        let bad = ValidationReport::from_results(vec![ValidationResult::fail(
            RuleId::FrontAxle,
            "bad",
        )]);
        let merged = ok.merge(bad);
        assert_eq!(merged.results.len(), 2);
        assert!(!merged.is_valid);
    }

    #[test]
    fn expect_role_rejects_wrong_category() {
        let fork = Component::new("fork-1", Category::Fork, "Fork");
        let err = expect_role(Some(&fork), "frame", &[Category::Frame]).unwrap_err();
        assert!(matches!(err, EngineError::CategoryMismatch { role: "frame", .. }));
        assert!(expect_role(None, "frame", &[Category::Frame]).unwrap().is_none());
    }

    #[test]
    fn rule_id_serializes_snake_case() {
        let json = serde_json::to_string(&RuleId::DerailleurCapacity).unwrap();
        assert_eq!(json, "\"derailleur_capacity\"");
    }
}
