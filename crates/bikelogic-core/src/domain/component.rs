//! Canonical component record.

use serde::{Deserialize, Serialize};

use super::category::Category;
use super::value::{FieldKey, FieldMap, ValueKind};

/// Interface points: connection contracts used for mating decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InterfaceKey {
    /// Frame: bottom-bracket shell standard.
    BottomBracketShell,
    /// Bottom bracket: shell standard it fits.
    FrameShell,
    /// Bottom bracket: spindle standard it exposes.
    CrankSpindle,
    /// Bottom bracket: further spindle standards usable with a fit kit.
    AlternateSpindles,
    /// Crankset: spindle standard it requires.
    Spindle,
    RearAxle,
    FrontAxle,
    /// Wheel/tire bead-seat family, e.g. `700c`, `29`, `650b`.
    Diameter,
    /// Wheel: set of freehub bodies it supports.
    Freehub,
    /// Cassette: freehub body it mounts on.
    FreehubMount,
    /// Shifter/derailleur actuation protocol.
    Protocol,
    HeadTube,
    Steerer,
    SteererClamp,
    HandlebarClamp,
    ClampDiameter,
    SeatpostDiameter,
    RotorMount,
    BrakeMount,
    /// Rotor or caliper mounting standard.
    Mount,
}

impl FieldKey for InterfaceKey {
    const ALL: &'static [Self] = &[
        Self::BottomBracketShell,
        Self::FrameShell,
        Self::CrankSpindle,
        Self::AlternateSpindles,
        Self::Spindle,
        Self::RearAxle,
        Self::FrontAxle,
        Self::Diameter,
        Self::Freehub,
        Self::FreehubMount,
        Self::Protocol,
        Self::HeadTube,
        Self::Steerer,
        Self::SteererClamp,
        Self::HandlebarClamp,
        Self::ClampDiameter,
        Self::SeatpostDiameter,
        Self::RotorMount,
        Self::BrakeMount,
        Self::Mount,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::BottomBracketShell => "bottom_bracket_shell",
            Self::FrameShell => "frame_shell",
            Self::CrankSpindle => "crank_spindle",
            Self::AlternateSpindles => "alternate_spindles",
            Self::Spindle => "spindle",
            Self::RearAxle => "rear_axle",
            Self::FrontAxle => "front_axle",
            Self::Diameter => "diameter",
            Self::Freehub => "freehub",
            Self::FreehubMount => "freehub_mount",
            Self::Protocol => "protocol",
            Self::HeadTube => "head_tube",
            Self::Steerer => "steerer",
            Self::SteererClamp => "steerer_clamp",
            Self::HandlebarClamp => "handlebar_clamp",
            Self::ClampDiameter => "clamp_diameter",
            Self::SeatpostDiameter => "seatpost_diameter",
            Self::RotorMount => "rotor_mount",
            Self::BrakeMount => "brake_mount",
            Self::Mount => "mount",
        }
    }

    fn kind(self) -> ValueKind {
        match self {
            Self::AlternateSpindles | Self::Freehub => ValueKind::StandardSet,
            _ => ValueKind::Standard,
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::BottomBracketShell => &["bottom_bracket_shell", "bb_shell", "bb_standard"],
            Self::FrameShell => &["frame_shell", "shell"],
            Self::CrankSpindle => &["crank_spindle", "spindle_interface"],
            Self::AlternateSpindles => &[
                "alternate_spindles",
                "alternate_crank_spindles",
                "fit_kit_spindles",
            ],
            Self::Spindle => &["spindle", "spindle_standard"],
            Self::RearAxle => &["rear_axle", "rear_axle_standard"],
            Self::FrontAxle => &["front_axle", "front_axle_standard"],
            Self::Diameter => &["diameter", "wheel_size", "wheel_diameter"],
            Self::Freehub => &["freehub", "freehub_options", "freehubs"],
            Self::FreehubMount => &["freehub_mount", "freehub_body"],
            Self::Protocol => &["protocol", "shifting_protocol"],
            Self::HeadTube => &["head_tube", "headset"],
            Self::Steerer => &["steerer", "steerer_tube"],
            Self::SteererClamp => &["steerer_clamp"],
            Self::HandlebarClamp => &["handlebar_clamp", "bar_clamp"],
            Self::ClampDiameter => &["clamp_diameter", "clamp"],
            Self::SeatpostDiameter => &["seatpost_diameter", "seat_tube_diameter"],
            Self::RotorMount => &["rotor_mount", "disc_mount"],
            Self::BrakeMount => &["brake_mount", "caliper_mount"],
            Self::Mount => &["mount", "mount_type"],
        }
    }
}

/// Physical and performance properties: used for derived numbers and ranking,
/// never for mating decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttributeKey {
    /// Grams.
    Weight,
    /// Currency units.
    Price,
    Speeds,
    /// Derailleur: largest rated cog. Cassette: largest cog.
    MaxCog,
    /// Cassette: smallest cog.
    MinCog,
    CogList,
    Chainrings,
    /// Millimeters.
    Width,
    /// Frame: widest tire it clears, millimeters.
    MaxTireWidth,
    /// Wheel: outer diameter with tire mounted, millimeters.
    DiameterMm,
    Electronic,
    Clutch,
}

impl FieldKey for AttributeKey {
    const ALL: &'static [Self] = &[
        Self::Weight,
        Self::Price,
        Self::Speeds,
        Self::MaxCog,
        Self::MinCog,
        Self::CogList,
        Self::Chainrings,
        Self::Width,
        Self::MaxTireWidth,
        Self::DiameterMm,
        Self::Electronic,
        Self::Clutch,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Weight => "weight",
            Self::Price => "price",
            Self::Speeds => "speeds",
            Self::MaxCog => "max_cog",
            Self::MinCog => "min_cog",
            Self::CogList => "cog_list",
            Self::Chainrings => "chainrings",
            Self::Width => "width",
            Self::MaxTireWidth => "max_tire_width",
            Self::DiameterMm => "diameter_mm",
            Self::Electronic => "electronic",
            Self::Clutch => "clutch",
        }
    }

    fn kind(self) -> ValueKind {
        match self {
            Self::CogList | Self::Chainrings => ValueKind::TeethList,
            Self::Electronic | Self::Clutch => ValueKind::Flag,
            _ => ValueKind::Number,
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Weight => &["weight", "weight_g", "weight_grams"],
            Self::Price => &["price", "price_msrp", "msrp", "price_usd"],
            Self::Speeds => &["speeds", "speed", "gears"],
            Self::MaxCog => &["max_cog", "largest_cog", "max_cog_size"],
            Self::MinCog => &["min_cog", "smallest_cog"],
            Self::CogList => &["cog_list", "cogs"],
            Self::Chainrings => &["chainrings", "chainring_teeth"],
            Self::Width => &["width", "width_mm"],
            Self::MaxTireWidth => &["max_tire_width", "tire_clearance"],
            Self::DiameterMm => &["diameter_mm", "outer_diameter_mm"],
            Self::Electronic => &["electronic", "is_electronic"],
            Self::Clutch => &["clutch"],
        }
    }
}

pub type Interfaces = FieldMap<InterfaceKey>;
pub type Attributes = FieldMap<AttributeKey>;

/// One purchasable physical part, in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: String,
    pub category: Category,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub interfaces: Interfaces,
    #[serde(default)]
    pub attributes: Attributes,
}

impl Component {
    pub fn new(id: impl Into<String>, category: Category, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category,
            name: name.into(),
            interfaces: Interfaces::new(),
            attributes: Attributes::new(),
        }
    }

    pub fn with_interfaces(mut self, interfaces: Interfaces) -> Self {
        self.interfaces = interfaces;
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Weight in grams, if known.
    pub fn weight(&self) -> Option<f64> {
        self.attributes.num(AttributeKey::Weight)
    }

    /// Price, if known.
    pub fn price(&self) -> Option<f64> {
        self.attributes.num(AttributeKey::Price)
    }

    /// Speed count as an integer, if known and integral.
    pub fn speeds(&self) -> Option<u32> {
        self.attributes
            .num(AttributeKey::Speeds)
            .filter(|n| n.fract() == 0.0 && *n > 0.0)
            .map(|n| n as u32)
    }

    /// Tooth counts under `key`, if present.
    pub fn teeth(&self, key: AttributeKey) -> Option<Vec<u32>> {
        self.attributes
            .num_list(key)
            .map(|v| v.iter().map(|n| *n as u32).collect())
    }
}
