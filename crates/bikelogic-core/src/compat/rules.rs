//! Rule groups. Each `validate_*` entry point checks one physical interface
//! area and is callable on its own.

use tracing::debug;

use super::freehub::{freehub_compatible, FreehubMatch};
use super::{expect_role, RuleId, ValidationReport, ValidationResult};
use crate::domain::value::format_number;
use crate::domain::{
    AttributeKey, Category, Component, FieldKey, FieldValue, InterfaceKey, Result,
};
use crate::normalize::standard_key;

/// Bead-seat spellings that name the same logical diameter. `700c` and `29`
/// share a physical bead seat but stay distinct on purpose.
const DIAMETER_ALIASES: &[(&str, &str)] = &[("700c", "700"), ("29", "29er"), ("27.5", "650b")];

// ---------------------------------------------------------------------------
// Contexts
// ---------------------------------------------------------------------------

/// Frame, bottom bracket and crankset.
#[derive(Debug, Clone, Copy, Default)]
pub struct BottomBracketContext<'a> {
    pub frame: Option<&'a Component>,
    pub bottom_bracket: Option<&'a Component>,
    pub crankset: Option<&'a Component>,
}

/// Frame and fork against a wheel, its tire and the cassette it carries.
#[derive(Debug, Clone, Copy, Default)]
pub struct WheelContext<'a> {
    pub frame: Option<&'a Component>,
    pub fork: Option<&'a Component>,
    pub wheel: Option<&'a Component>,
    pub tire: Option<&'a Component>,
    pub cassette: Option<&'a Component>,
}

/// Shifting protocol and speed agreement across the drivetrain.
#[derive(Debug, Clone, Copy, Default)]
pub struct DrivetrainContext<'a> {
    pub shifter: Option<&'a Component>,
    pub rear_derailleur: Option<&'a Component>,
    pub cassette: Option<&'a Component>,
    pub chain: Option<&'a Component>,
    pub crankset: Option<&'a Component>,
}

/// Headset, stem, bar and seatpost clamps.
#[derive(Debug, Clone, Copy, Default)]
pub struct CockpitContext<'a> {
    pub frame: Option<&'a Component>,
    pub fork: Option<&'a Component>,
    pub stem: Option<&'a Component>,
    pub handlebar: Option<&'a Component>,
    pub seatpost: Option<&'a Component>,
}

/// Disc rotor and caliper mounting.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrakeContext<'a> {
    pub frame: Option<&'a Component>,
    pub wheel: Option<&'a Component>,
    pub rotor: Option<&'a Component>,
    pub caliper: Option<&'a Component>,
}

const WHEEL_CATEGORIES: &[Category] = &[Category::Wheel, Category::Wheelset];

// ---------------------------------------------------------------------------
// Sides
// ---------------------------------------------------------------------------

/// One side of a categorical comparison: which part, which interface point,
/// and how to name it in a message.
struct Side<'a> {
    label: &'static str,
    component: Option<&'a Component>,
    key: InterfaceKey,
}

impl<'a> Side<'a> {
    fn new(label: &'static str, component: Option<&'a Component>, key: InterfaceKey) -> Self {
        Self {
            label,
            component,
            key,
        }
    }

    fn part(&self) -> std::result::Result<&'a Component, String> {
        self.component
            .ok_or_else(|| format!("no {} selected", self.label))
    }

    fn value(&self) -> std::result::Result<&'a FieldValue, String> {
        let part = self.part()?;
        part.interfaces
            .get(self.key)
            .ok_or_else(|| format!("{} {} declares no {}", self.label, part.id, self.key_name()))
    }

    fn text(&self) -> std::result::Result<&'a str, String> {
        let part = self.part()?;
        part.interfaces
            .str(self.key)
            .ok_or_else(|| format!("{} {} declares no {}", self.label, part.id, self.key_name()))
    }

    fn key_name(&self) -> &'static str {
        self.key.as_str()
    }
}

fn attribute(
    label: &str,
    component: Option<&Component>,
    key: AttributeKey,
) -> std::result::Result<f64, String> {
    let part = component.ok_or_else(|| format!("no {label} selected"))?;
    part.attributes
        .num(key)
        .ok_or_else(|| format!("{label} {} declares no {}", part.id, key.as_str()))
}

/// Exact comparison of two standard tokens after case and separator folding.
fn compare_standards(rule: RuleId, left: &Side<'_>, right: &Side<'_>) -> ValidationResult {
    compare_with(rule, left, right, |a, b| standard_key(a) == standard_key(b))
}

fn compare_with(
    rule: RuleId,
    left: &Side<'_>,
    right: &Side<'_>,
    same: impl Fn(&str, &str) -> bool,
) -> ValidationResult {
    let (l, r) = match (left.text(), right.text()) {
        (Ok(l), Ok(r)) => (l, r),
        (Err(why), _) | (_, Err(why)) => return ValidationResult::indeterminate(rule, why),
    };
    if same(l, r) {
        ValidationResult::pass(
            rule,
            format!("{} {} matches {} {}", left.label, l, right.label, r),
        )
    } else {
        ValidationResult::fail(
            rule,
            format!("{} {} ≠ {} {}", left.label, l, right.label, r),
        )
    }
}

fn diameters_match(a: &str, b: &str) -> bool {
    let (a, b) = (standard_key(a), standard_key(b));
    a == b
        || DIAMETER_ALIASES
            .iter()
            .any(|(x, y)| (a == *x && b == *y) || (a == *y && b == *x))
}

// ---------------------------------------------------------------------------
// Frame / bottom bracket / crankset
// ---------------------------------------------------------------------------

/// Shell and spindle checks for the frame–BB–crank triad.
pub fn validate_bottom_bracket(ctx: &BottomBracketContext<'_>) -> Result<ValidationReport> {
    expect_role(ctx.frame, "frame", &[Category::Frame])?;
    expect_role(ctx.bottom_bracket, "bottom bracket", &[Category::BottomBracket])?;
    expect_role(ctx.crankset, "crankset", &[Category::Crankset])?;
    Ok(bottom_bracket_rules(ctx))
}

pub(super) fn bottom_bracket_rules(ctx: &BottomBracketContext<'_>) -> ValidationReport {
    let frame = ctx.frame;
    let bb = ctx.bottom_bracket;
    let crank = ctx.crankset;

    let results = vec![
        compare_standards(
            RuleId::BottomBracketShell,
            &Side::new("Frame shell", frame, InterfaceKey::BottomBracketShell),
            &Side::new("BB shell", bb, InterfaceKey::FrameShell),
        ),
        check_spindle(bb, crank),
    ];
    finish("bottom_bracket", results)
}

fn check_spindle(bb: Option<&Component>, crank: Option<&Component>) -> ValidationResult {
    let rule = RuleId::BottomBracketSpindle;
    let crank_spindle = match Side::new("crankset", crank, InterfaceKey::Spindle).text() {
        Ok(s) => s,
        Err(why) => return ValidationResult::indeterminate(rule, why),
    };
    let bb = match Side::new("bottom bracket", bb, InterfaceKey::CrankSpindle).part() {
        Ok(bb) => bb,
        Err(why) => return ValidationResult::indeterminate(rule, why),
    };

    let primary = bb.interfaces.str(InterfaceKey::CrankSpindle);
    let alternates: Vec<&str> = bb
        .interfaces
        .get(InterfaceKey::AlternateSpindles)
        .map(FieldValue::members)
        .unwrap_or_default();

    let wanted = standard_key(crank_spindle);
    match primary {
        None if alternates.is_empty() => ValidationResult::indeterminate(
            rule,
            format!("bottom bracket {} declares no crank_spindle", bb.id),
        ),
        Some(p) if standard_key(p) == wanted => ValidationResult::pass(
            rule,
            format!("BB spindle {p} matches crank spindle {crank_spindle}"),
        ),
        _ => match_alternates(rule, &alternates, crank_spindle, primary),
    }
}

fn match_alternates(
    rule: RuleId,
    alternates: &[&str],
    crank_spindle: &str,
    primary: Option<&str>,
) -> ValidationResult {
    let wanted = standard_key(crank_spindle);
    if let Some(alt) = alternates.iter().find(|a| standard_key(a) == wanted) {
        return ValidationResult::pass(
            rule,
            format!("crank spindle {crank_spindle} fits BB alternate {alt} (requires fit kit)"),
        );
    }
    let declared = match (primary, alternates.is_empty()) {
        (Some(p), true) => p.to_string(),
        (Some(p), false) => format!("{p} (alternates: {})", alternates.join(", ")),
        (None, _) => format!("alternates {}", alternates.join(", ")),
    };
    ValidationResult::fail(
        rule,
        format!("BB spindle {declared} ≠ crank spindle {crank_spindle}"),
    )
}

// ---------------------------------------------------------------------------
// Frame / fork / wheel / tire / cassette
// ---------------------------------------------------------------------------

/// Axle, tire and freehub checks around a wheel.
pub fn validate_wheel_fit(ctx: &WheelContext<'_>) -> Result<ValidationReport> {
    expect_role(ctx.frame, "frame", &[Category::Frame])?;
    expect_role(ctx.fork, "fork", &[Category::Fork])?;
    expect_role(ctx.wheel, "wheel", WHEEL_CATEGORIES)?;
    expect_role(ctx.tire, "tire", &[Category::Tire])?;
    expect_role(ctx.cassette, "cassette", &[Category::Cassette])?;
    Ok(wheel_fit_rules(ctx))
}

pub(super) fn wheel_fit_rules(ctx: &WheelContext<'_>) -> ValidationReport {
    let frame = ctx.frame;
    let fork = ctx.fork;
    let wheel = ctx.wheel;
    let tire = ctx.tire;
    let cassette = ctx.cassette;

    let results = vec![
        compare_standards(
            RuleId::RearAxle,
            &Side::new("Wheel rear axle", wheel, InterfaceKey::RearAxle),
            &Side::new("Frame rear axle", frame, InterfaceKey::RearAxle),
        ),
        compare_standards(
            RuleId::FrontAxle,
            &Side::new("Wheel front axle", wheel, InterfaceKey::FrontAxle),
            &Side::new("Fork front axle", fork, InterfaceKey::FrontAxle),
        ),
        compare_with(
            RuleId::TireDiameter,
            &Side::new("Wheel diameter", wheel, InterfaceKey::Diameter),
            &Side::new("Tire diameter", tire, InterfaceKey::Diameter),
            diameters_match,
        ),
        check_tire_clearance(frame, tire),
        check_freehub(wheel, cassette),
    ];
    finish("wheel_fit", results)
}

fn check_tire_clearance(frame: Option<&Component>, tire: Option<&Component>) -> ValidationResult {
    let rule = RuleId::TireClearance;
    let (width, clearance) = match (
        attribute("tire", tire, AttributeKey::Width),
        attribute("frame", frame, AttributeKey::MaxTireWidth),
    ) {
        (Ok(w), Ok(c)) => (w, c),
        (Err(why), _) | (_, Err(why)) => return ValidationResult::indeterminate(rule, why),
    };
    if width <= clearance {
        ValidationResult::pass(
            rule,
            format!(
                "Tire width {}mm within frame clearance {}mm",
                format_number(width),
                format_number(clearance)
            ),
        )
    } else {
        ValidationResult::fail(
            rule,
            format!(
                "Tire width {}mm exceeds frame clearance {}mm",
                format_number(width),
                format_number(clearance)
            ),
        )
    }
}

fn check_freehub(wheel: Option<&Component>, cassette: Option<&Component>) -> ValidationResult {
    let rule = RuleId::Freehub;
    let (bodies, mount) = match (
        Side::new("wheel", wheel, InterfaceKey::Freehub).value(),
        Side::new("cassette", cassette, InterfaceKey::FreehubMount).text(),
    ) {
        (Ok(b), Ok(m)) => (b.members(), m),
        (Err(why), _) | (_, Err(why)) => return ValidationResult::indeterminate(rule, why),
    };

    match freehub_compatible(&bodies, mount) {
        FreehubMatch::Exact(body) => ValidationResult::pass(
            rule,
            format!("Cassette mount {mount} fits wheel freehub {body}"),
        ),
        FreehubMatch::Approximate(body) => ValidationResult::warn(
            rule,
            format!("Cassette mount {mount} matched wheel freehub {body} by name only; confirm fit"),
        ),
        FreehubMatch::None => ValidationResult::fail(
            rule,
            format!(
                "Cassette mount {mount} ≠ wheel freehub {{{}}}",
                bodies.join(", ")
            ),
        ),
    }
}

// ---------------------------------------------------------------------------
// Drivetrain
// ---------------------------------------------------------------------------

/// Protocol, speed-count and derailleur capacity checks.
pub fn validate_drivetrain(ctx: &DrivetrainContext<'_>) -> Result<ValidationReport> {
    expect_role(ctx.shifter, "shifter", &[Category::Shifter])?;
    expect_role(ctx.rear_derailleur, "rear derailleur", &[Category::RearDerailleur])?;
    expect_role(ctx.cassette, "cassette", &[Category::Cassette])?;
    expect_role(ctx.chain, "chain", &[Category::Chain])?;
    expect_role(ctx.crankset, "crankset", &[Category::Crankset])?;
    Ok(drivetrain_rules(ctx))
}

pub(super) fn drivetrain_rules(ctx: &DrivetrainContext<'_>) -> ValidationReport {
    let shifter = ctx.shifter;
    let rd = ctx.rear_derailleur;
    let cassette = ctx.cassette;
    let chain = ctx.chain;
    let crank = ctx.crankset;

    let results = vec![
        compare_standards(
            RuleId::ShiftProtocol,
            &Side::new("Shifter protocol", shifter, InterfaceKey::Protocol),
            &Side::new("derailleur protocol", rd, InterfaceKey::Protocol),
        ),
        check_speed_count(&[
            ("shifter", shifter),
            ("derailleur", rd),
            ("cassette", cassette),
            ("chain", chain),
            ("crankset", crank),
        ]),
        check_capacity(rd, cassette),
    ];
    finish("drivetrain", results)
}

fn check_speed_count(parts: &[(&'static str, Option<&Component>)]) -> ValidationResult {
    let rule = RuleId::SpeedCount;
    let known: Vec<(&str, u32)> = parts
        .iter()
        .filter_map(|(label, c)| c.and_then(Component::speeds).map(|s| (*label, s)))
        .collect();

    if known.len() < 2 {
        return ValidationResult::indeterminate(
            rule,
            "fewer than two selected parts declare a speed count",
        );
    }

    let first = known[0].1;
    if known.iter().all(|(_, s)| *s == first) {
        let labels: Vec<&str> = known.iter().map(|(l, _)| *l).collect();
        return ValidationResult::pass(
            rule,
            format!("{first}-speed across {}", labels.join(", ")),
        );
    }

    let listing: Vec<String> = known.iter().map(|(l, s)| format!("{l} {s}")).collect();
    ValidationResult::fail(
        rule,
        format!("speed counts differ: {}", listing.join(", ")),
    )
}

/// Largest cog of a cassette: the cog list when present, else its `max_cog`.
pub(crate) fn largest_cog(cassette: &Component) -> Option<f64> {
    cassette
        .attributes
        .num_list(AttributeKey::CogList)
        .and_then(|cogs| cogs.iter().copied().reduce(f64::max))
        .or_else(|| cassette.attributes.num(AttributeKey::MaxCog))
}

fn check_capacity(rd: Option<&Component>, cassette: Option<&Component>) -> ValidationResult {
    let rule = RuleId::DerailleurCapacity;
    let max_cog = match attribute("derailleur", rd, AttributeKey::MaxCog) {
        Ok(m) => m,
        Err(why) => return ValidationResult::indeterminate(rule, why),
    };
    let largest = match cassette {
        None => return ValidationResult::indeterminate(rule, "no cassette selected"),
        Some(c) => match largest_cog(c) {
            Some(l) => l,
            None => {
                return ValidationResult::indeterminate(
                    rule,
                    format!("cassette {} declares no cog_list", c.id),
                )
            }
        },
    };

    if max_cog >= largest {
        ValidationResult::pass(
            rule,
            format!(
                "Derailleur max cog {} covers cassette largest cog {}",
                format_number(max_cog),
                format_number(largest)
            ),
        )
    } else {
        ValidationResult::fail(
            rule,
            format!(
                "derailleur cannot wrap this cassette: max cog {} < largest cog {}",
                format_number(max_cog),
                format_number(largest)
            ),
        )
    }
}

// ---------------------------------------------------------------------------
// Cockpit
// ---------------------------------------------------------------------------

/// Head tube, steerer, bar and seatpost clamp checks.
pub fn validate_cockpit(ctx: &CockpitContext<'_>) -> Result<ValidationReport> {
    expect_role(ctx.frame, "frame", &[Category::Frame])?;
    expect_role(ctx.fork, "fork", &[Category::Fork])?;
    expect_role(ctx.stem, "stem", &[Category::Stem])?;
    expect_role(ctx.handlebar, "handlebar", &[Category::Handlebar])?;
    expect_role(ctx.seatpost, "seatpost", &[Category::Seatpost])?;
    Ok(cockpit_rules(ctx))
}

pub(super) fn cockpit_rules(ctx: &CockpitContext<'_>) -> ValidationReport {
    let frame = ctx.frame;
    let fork = ctx.fork;
    let stem = ctx.stem;
    let bar = ctx.handlebar;
    let post = ctx.seatpost;

    let results = vec![
        compare_standards(
            RuleId::HeadTube,
            &Side::new("Frame head tube", frame, InterfaceKey::HeadTube),
            &Side::new("Fork steerer", fork, InterfaceKey::Steerer),
        ),
        compare_standards(
            RuleId::SteererClamp,
            &Side::new("Fork steerer", fork, InterfaceKey::Steerer),
            &Side::new("Stem steerer clamp", stem, InterfaceKey::SteererClamp),
        ),
        compare_standards(
            RuleId::HandlebarClamp,
            &Side::new("Stem bar clamp", stem, InterfaceKey::HandlebarClamp),
            &Side::new("Handlebar clamp", bar, InterfaceKey::ClampDiameter),
        ),
        compare_standards(
            RuleId::SeatpostDiameter,
            &Side::new("Frame seatpost diameter", frame, InterfaceKey::SeatpostDiameter),
            &Side::new("Seatpost diameter", post, InterfaceKey::Diameter),
        ),
    ];
    finish("cockpit", results)
}

// ---------------------------------------------------------------------------
// Brakes
// ---------------------------------------------------------------------------

/// Rotor-to-hub and caliper-to-frame mounting checks.
pub fn validate_brakes(ctx: &BrakeContext<'_>) -> Result<ValidationReport> {
    expect_role(ctx.frame, "frame", &[Category::Frame])?;
    expect_role(ctx.wheel, "wheel", WHEEL_CATEGORIES)?;
    expect_role(ctx.rotor, "rotor", &[Category::BrakeRotor])?;
    expect_role(ctx.caliper, "caliper", &[Category::BrakeCaliper])?;
    Ok(brakes_rules(ctx))
}

pub(super) fn brakes_rules(ctx: &BrakeContext<'_>) -> ValidationReport {
    let frame = ctx.frame;
    let wheel = ctx.wheel;
    let rotor = ctx.rotor;
    let caliper = ctx.caliper;

    let results = vec![
        compare_standards(
            RuleId::RotorMount,
            &Side::new("Hub rotor mount", wheel, InterfaceKey::RotorMount),
            &Side::new("Rotor mount", rotor, InterfaceKey::Mount),
        ),
        compare_standards(
            RuleId::BrakeMount,
            &Side::new("Frame brake mount", frame, InterfaceKey::BrakeMount),
            &Side::new("Caliper mount", caliper, InterfaceKey::Mount),
        ),
    ];
    finish("brakes", results)
}

fn finish(group: &'static str, results: Vec<ValidationResult>) -> ValidationReport {
    let report = ValidationReport::from_results(results);
    debug!(
        group = group,
        results = report.results.len(),
        errors = report.errors().count(),
        warnings = report.warnings().count(),
        is_valid = report.is_valid,
        "rule group evaluated"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::Outcome;
    use crate::domain::{Attributes, Interfaces};

    fn bb(shell: &str, spindle: Option<&str>, alternates: &[&str]) -> Component {
        let mut i =
            Interfaces::new().with(InterfaceKey::FrameShell, FieldValue::Str(shell.into()));
        if let Some(s) = spindle {
            i.insert(InterfaceKey::CrankSpindle, FieldValue::Str(s.into()));
        }
        if !alternates.is_empty() {
            i.insert(
                InterfaceKey::AlternateSpindles,
                FieldValue::StrSet(alternates.iter().map(|s| s.to_string()).collect()),
            );
        }
        Component::new("bb", Category::BottomBracket, "BB").with_interfaces(i)
    }

    fn crank(spindle: &str) -> Component {
        Component::new("crank", Category::Crankset, "Crank").with_interfaces(
            Interfaces::new().with(InterfaceKey::Spindle, FieldValue::Str(spindle.into())),
        )
    }

    #[test]
    fn alternate_spindle_passes_with_fit_kit_note() {
        let bb = bb("BSA_Threaded_68mm", Some("Shimano_24mm"), &["SRAM_DUB"]);
        let r = check_spindle(Some(&bb), Some(&crank("SRAM DUB")));
        assert_eq!(r.outcome, Outcome::Pass);
        assert!(r.message.contains("fit kit"));
    }

    #[test]
    fn spindle_not_in_primary_or_alternates_fails() {
        let bb = bb("BSA_Threaded_68mm", Some("Shimano_24mm"), &["SRAM_DUB"]);
        let r = check_spindle(Some(&bb), Some(&crank("Campagnolo_Ultra-Torque")));
        assert_eq!(r.outcome, Outcome::Fail);
        assert!(r.message.contains("Shimano_24mm"));
        assert!(r.message.contains("Campagnolo_Ultra-Torque"));
    }

    #[test]
    fn spindle_without_declaration_is_indeterminate() {
        let bb = bb("BSA_Threaded_68mm", None, &[]);
        let r = check_spindle(Some(&bb), Some(&crank("SRAM_DUB")));
        assert_eq!(r.outcome, Outcome::Indeterminate);
    }

    #[test]
    fn speed_count_needs_two_sources() {
        let chain = Component::new("chain", Category::Chain, "Chain")
            .with_attributes(Attributes::new().with(AttributeKey::Speeds, FieldValue::Num(12.0)));
        let r = check_speed_count(&[("chain", Some(&chain)), ("cassette", None)]);
        assert_eq!(r.outcome, Outcome::Indeterminate);
    }

    #[test]
    fn largest_cog_falls_back_to_max_cog() {
        let c = Component::new("k", Category::Cassette, "K")
            .with_attributes(Attributes::new().with(AttributeKey::MaxCog, FieldValue::Num(36.0)));
        assert_eq!(largest_cog(&c), Some(36.0));
    }

    #[test]
    fn diameter_aliases_are_symmetric() {
        assert!(diameters_match("650b", "27.5"));
        assert!(diameters_match("700C", "700"));
        assert!(!diameters_match("700c", "29"));
    }
}
