//! Structured observability hooks for engine entry points.
//!
//! This module provides:
//! - A request-scoped tracing span via the `RequestSpan` RAII guard
//! - Emission functions for completed validations and rankings
//!
//! Events are emitted at `info!` level; filter with `RUST_LOG`.

use tracing::info;

use crate::compat::ValidationReport;

/// RAII guard that enters a span for the duration of one engine request.
///
/// ```ignore
/// let _span = RequestSpan::enter("validate");
/// // all tracing calls below carry request = "validate"
/// ```
pub struct RequestSpan {
    _span: tracing::span::EnteredSpan,
}

impl RequestSpan {
    pub fn enter(request: &str) -> Self {
        let span = tracing::info_span!("bikelogic.request", request = %request);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: a whole build was validated.
pub fn emit_build_validated(parts: usize, report: &ValidationReport) {
    info!(
        event = "build.validated",
        parts = parts,
        results = report.results.len(),
        errors = report.errors().count(),
        warnings = report.warnings().count(),
        indeterminate = report.indeterminate().count(),
        is_valid = report.is_valid,
    );
}

/// Emit event: upgrade candidates ranked against one baseline.
pub fn emit_upgrades_ranked(baseline_id: &str, candidates: usize, options: usize) {
    info!(
        event = "upgrades.ranked",
        baseline_id = %baseline_id,
        candidates = candidates,
        options = options,
    );
}

/// Emit event: quick wins recommended across a build.
pub fn emit_quick_wins(parts: usize, wins: usize, best_score: Option<f64>) {
    info!(
        event = "quick_wins.recommended",
        parts = parts,
        wins = wins,
        best_score = best_score.unwrap_or(0.0),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_span_create() {
        let _span = RequestSpan::enter("test-request");
    }

    #[test]
    fn emitters_run_without_subscriber() {
        emit_build_validated(0, &ValidationReport::default());
        emit_upgrades_ranked("bb-1", 3, 1);
        emit_quick_wins(4, 0, None);
    }
}
