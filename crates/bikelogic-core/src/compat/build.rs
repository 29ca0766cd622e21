//! Whole-build validation.

use super::rules::{
    bottom_bracket_rules, brakes_rules, cockpit_rules, drivetrain_rules, wheel_fit_rules,
    BottomBracketContext, BrakeContext, CockpitContext, DrivetrainContext, WheelContext,
};
use super::ValidationReport;
use crate::domain::{Build, Category};
use crate::obs;

/// Run every rule group over the build's slots and concatenate the results in
/// a fixed group order.
///
/// Slots only ever hold components of their own category, so no role check
/// can fail here.
pub fn validate_build(build: &Build) -> ValidationReport {
    let report = evaluate_build(build);
    obs::emit_build_validated(build.len(), &report);
    report
}

/// [`validate_build`] without the completion event, for trial swaps.
pub(crate) fn evaluate_build(build: &Build) -> ValidationReport {
    let frame = build.get(&Category::Frame);
    let fork = build.get(&Category::Fork);
    let wheel = build.wheel();
    let cassette = build.get(&Category::Cassette);
    let crankset = build.get(&Category::Crankset);

    bottom_bracket_rules(&BottomBracketContext {
        frame,
        bottom_bracket: build.get(&Category::BottomBracket),
        crankset,
    })
    .merge(wheel_fit_rules(&WheelContext {
        frame,
        fork,
        wheel,
        tire: build.get(&Category::Tire),
        cassette,
    }))
    .merge(drivetrain_rules(&DrivetrainContext {
        shifter: build.get(&Category::Shifter),
        rear_derailleur: build.get(&Category::RearDerailleur),
        cassette,
        chain: build.get(&Category::Chain),
        crankset,
    }))
    .merge(cockpit_rules(&CockpitContext {
        frame,
        fork,
        stem: build.get(&Category::Stem),
        handlebar: build.get(&Category::Handlebar),
        seatpost: build.get(&Category::Seatpost),
    }))
    .merge(brakes_rules(&BrakeContext {
        frame,
        wheel,
        rotor: build.get(&Category::BrakeRotor),
        caliper: build.get(&Category::BrakeCaliper),
    }))
}
