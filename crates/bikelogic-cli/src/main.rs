//! Bikelogic CLI
//!
//! The `bikelogic` command runs the engine over a catalog snapshot on disk.
//!
//! ## Commands
//!
//! - `validate`: Check whether a set of parts can be assembled
//! - `gears`: Gear table and speed range for chainrings and cogs
//! - `cassette`: Expand a cassette range into its cog list
//! - `upgrades`: Rank lighter substitutes for one part
//! - `quick-wins`: Best upgrades across a whole build

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, Level};

use bikelogic_core::{
    all_gear_combinations, build_summary, climbing_index, expand_cassette_range_with,
    init_tracing, rank_upgrades, recommend_quick_wins, speed_range_over, validate_build, Build,
    BuildSummary, CassetteExpansion, Catalog, GearCombination, Outcome, QuickWin,
    QuickWinConfig, RequestSpan, Severity, SpeedRange, UpgradeOption, ValidationReport,
};

/// Outer diameter of a 700x25c wheel, used when none is given.
const DEFAULT_WHEEL_DIAMETER_MM: f64 = 672.0;

#[derive(Parser)]
#[command(name = "bikelogic")]
#[command(author = "Bikelogic Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compatibility and performance engine for bicycle builds", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a build assembled from catalog ids
    Validate {
        /// Catalog snapshot (JSON array of component records)
        #[arg(short, long, env = "BIKELOGIC_CATALOG")]
        catalog: PathBuf,

        /// Component ids making up the build
        #[arg(required = true)]
        ids: Vec<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show every gear combination and the speed range
    Gears {
        /// Chainring tooth counts, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        chainrings: Vec<u32>,

        /// Cog tooth counts, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        cogs: Vec<u32>,

        /// Outer wheel diameter in millimeters
        #[arg(long, default_value_t = DEFAULT_WHEEL_DIAMETER_MM)]
        wheel_diameter_mm: f64,

        /// Pedalling cadence in rpm
        #[arg(long, default_value_t = 90.0)]
        cadence: f64,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Expand a cassette from its largest and smallest cog
    Cassette {
        largest: u32,
        smallest: u32,

        /// Speed count, to pick between cassettes sharing a range
        #[arg(long)]
        speeds: Option<u32>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Rank lighter substitutes for one part's slot
    Upgrades {
        #[arg(short, long, env = "BIKELOGIC_CATALOG")]
        catalog: PathBuf,

        /// Id of the part to replace
        baseline: String,

        /// Scoring overrides (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Maximum number of options to show
        #[arg(short, long)]
        limit: Option<usize>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Recommend the best upgrades across a build
    QuickWins {
        #[arg(short, long, env = "BIKELOGIC_CATALOG")]
        catalog: PathBuf,

        /// Scoring overrides (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Maximum number of recommendations
        #[arg(short, long)]
        limit: Option<usize>,

        /// Include candidates that would break the build
        #[arg(long)]
        allow_incompatible: bool,

        /// Component ids making up the build
        #[arg(required = true)]
        ids: Vec<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    match cli.command {
        Commands::Validate {
            catalog,
            ids,
            format,
        } => cmd_validate(&catalog, &ids, format),
        Commands::Gears {
            chainrings,
            cogs,
            wheel_diameter_mm,
            cadence,
            format,
        } => cmd_gears(&chainrings, &cogs, wheel_diameter_mm, cadence, format),
        Commands::Cassette {
            largest,
            smallest,
            speeds,
            format,
        } => cmd_cassette(largest, smallest, speeds, format),
        Commands::Upgrades {
            catalog,
            baseline,
            config,
            limit,
            format,
        } => cmd_upgrades(&catalog, &baseline, config.as_deref(), limit, format),
        Commands::QuickWins {
            catalog,
            config,
            limit,
            allow_incompatible,
            ids,
            format,
        } => cmd_quick_wins(
            &catalog,
            &ids,
            config.as_deref(),
            limit,
            allow_incompatible,
            format,
        ),
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn load_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog: {:?}", path))?;
    let catalog = Catalog::from_json(&content)
        .with_context(|| format!("Invalid catalog in {:?}", path))?;
    info!(path = ?path, components = catalog.len(), "catalog loaded");
    Ok(catalog)
}

fn load_config(path: Option<&Path>) -> Result<QuickWinConfig> {
    let Some(path) = path else {
        return Ok(QuickWinConfig::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {:?}", path))?;
    QuickWinConfig::from_toml_str(&content)
        .with_context(|| format!("Invalid config in {:?}", path))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ValidateOutput {
    summary: BuildSummary,
    report: ValidationReport,
}

fn cmd_validate(catalog_path: &Path, ids: &[String], format: OutputFormat) -> Result<()> {
    let _span = RequestSpan::enter("validate");
    let catalog = load_catalog(catalog_path)?;
    let build = Build::from_ids(&catalog, ids).context("Failed to assemble build")?;

    let output = ValidateOutput {
        summary: build_summary(&build),
        report: validate_build(&build),
    };
    match format {
        OutputFormat::Json => print_json(&output)?,
        OutputFormat::Text => println!("{}", render_validation_text(&output)),
    }

    if !output.report.is_valid {
        anyhow::bail!("Build has {} blocking error(s)", output.report.errors().count());
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct GearsOutput {
    wheel_diameter_mm: f64,
    cadence_rpm: f64,
    combinations: Vec<GearCombination>,
    speed_range: SpeedRange,
    climbing_index: f64,
}

fn cmd_gears(
    chainrings: &[u32],
    cogs: &[u32],
    wheel_diameter_mm: f64,
    cadence: f64,
    format: OutputFormat,
) -> Result<()> {
    let output = build_gears_output(chainrings, cogs, wheel_diameter_mm, cadence)?;
    match format {
        OutputFormat::Json => print_json(&output),
        OutputFormat::Text => {
            println!("{}", render_gears_text(&output));
            Ok(())
        }
    }
}

fn build_gears_output(
    chainrings: &[u32],
    cogs: &[u32],
    wheel_diameter_mm: f64,
    cadence: f64,
) -> Result<GearsOutput> {
    let combinations = all_gear_combinations(chainrings, cogs, wheel_diameter_mm)
        .context("Invalid gearing")?;
    let range =
        speed_range_over(&combinations, cadence, wheel_diameter_mm).context("Invalid gearing")?;
    Ok(GearsOutput {
        wheel_diameter_mm,
        cadence_rpm: cadence,
        climbing_index: climbing_index(range.slowest.ratio),
        combinations,
        speed_range: range,
    })
}

fn cmd_cassette(
    largest: u32,
    smallest: u32,
    speeds: Option<u32>,
    format: OutputFormat,
) -> Result<()> {
    let expansion =
        expand_cassette_range_with(largest, smallest, speeds).context("Invalid cassette range")?;
    match format {
        OutputFormat::Json => print_json(&expansion),
        OutputFormat::Text => {
            println!("{}", render_cassette_text(&expansion));
            Ok(())
        }
    }
}

fn cmd_upgrades(
    catalog_path: &Path,
    baseline_id: &str,
    config_path: Option<&Path>,
    limit: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let _span = RequestSpan::enter("upgrades");
    let catalog = load_catalog(catalog_path)?;
    let config = load_config(config_path)?;
    let baseline = catalog
        .get(baseline_id)
        .with_context(|| format!("Component not found: {}", baseline_id))?;

    let mut options = rank_upgrades(baseline, catalog.by_slot(&baseline.category), &config);
    if let Some(n) = limit {
        options.truncate(n);
    }
    match format {
        OutputFormat::Json => print_json(&options),
        OutputFormat::Text => {
            println!("{}", render_upgrades_text(baseline_id, &options));
            Ok(())
        }
    }
}

fn cmd_quick_wins(
    catalog_path: &Path,
    ids: &[String],
    config_path: Option<&Path>,
    limit: Option<usize>,
    allow_incompatible: bool,
    format: OutputFormat,
) -> Result<()> {
    let _span = RequestSpan::enter("quick_wins");
    let catalog = load_catalog(catalog_path)?;
    let build = Build::from_ids(&catalog, ids).context("Failed to assemble build")?;

    let mut config = load_config(config_path)?;
    if let Some(n) = limit {
        config = config.with_max_results(n);
    }
    if allow_incompatible {
        config = config.with_require_compatible(false);
    }

    let wins = recommend_quick_wins(&build, &catalog, &config);
    match format {
        OutputFormat::Json => print_json(&wins),
        OutputFormat::Text => {
            println!("{}", render_quick_wins_text(&wins));
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

fn render_validation_text(output: &ValidateOutput) -> String {
    let report = &output.report;
    let summary = &output.summary;
    let mut out = String::new();
    out.push_str("Build Validation\n");
    out.push_str("================\n");
    out.push_str(&format!(
        "status: {}\n",
        if report.is_valid { "VALID" } else { "INVALID" }
    ));
    out.push_str(&format!(
        "parts: {}  weight: {:.0} g  price: {:.2}\n",
        summary.parts, summary.total_weight, summary.total_price
    ));
    out.push_str(&format!(
        "errors: {}  warnings: {}  unchecked: {}\n",
        report.errors().count(),
        report.warnings().count(),
        report.indeterminate().count()
    ));

    out.push('\n');
    for result in &report.results {
        let mark = match (result.outcome, result.severity) {
            (Outcome::Pass, _) => "ok  ",
            (Outcome::Fail, Severity::Error) => "FAIL",
            (Outcome::Fail, Severity::Warning) => "warn",
            (Outcome::Indeterminate, _) => "  ? ",
        };
        out.push_str(&format!(
            "  [{}] {:<22} {}\n",
            mark,
            result.rule_id.as_str(),
            result.message
        ));
    }

    if !summary.unknown_weight.is_empty() {
        out.push_str(&format!(
            "\nUnknown weight: {}\n",
            summary.unknown_weight.join(", ")
        ));
    }
    out.trim_end().to_string()
}

fn render_gears_text(output: &GearsOutput) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Gears ({:.0} mm wheel, {:.0} rpm)\n",
        output.wheel_diameter_mm, output.cadence_rpm
    ));
    out.push_str("  ring  cog   ratio  inches\n");
    for combo in &output.combinations {
        out.push_str(&format!(
            "  {:>4}  {:>3}  {:>6.2}  {:>6.1}\n",
            combo.chainring, combo.cog, combo.ratio, combo.gear_inches
        ));
    }
    let range = &output.speed_range;
    out.push_str(&format!(
        "\nspeed: {:.1} - {:.1} km/h\n",
        range.min_kmh, range.max_kmh
    ));
    out.push_str(&format!("climbing index: {:.3}", output.climbing_index));
    out
}

fn render_cassette_text(expansion: &CassetteExpansion) -> String {
    let cogs: Vec<String> = expansion.cogs.iter().map(u32::to_string).collect();
    let mut out = format!("{}-speed: {}", expansion.cogs.len(), cogs.join("-"));
    if expansion.approximate {
        out.push_str(" (approximate)");
    }
    out
}

fn render_upgrades_text(baseline_id: &str, options: &[UpgradeOption]) -> String {
    if options.is_empty() {
        return format!("No lighter priced substitutes for {}", baseline_id);
    }
    let mut out = format!("Upgrades for {}\n", baseline_id);
    for option in options {
        out.push_str(&format!(
            "  {:<24} -{:>5.0} g  {:>+8.2}  {:>6.2}/g  {:?}\n",
            option.candidate.id,
            option.weight_saved,
            option.cost_added,
            option.cost_per_gram,
            option.value_tier
        ));
    }
    out.trim_end().to_string()
}

fn render_quick_wins_text(wins: &[QuickWin]) -> String {
    if wins.is_empty() {
        return "No quick wins found".to_string();
    }
    let mut out = String::from("Quick Wins\n==========\n");
    for (rank, win) in wins.iter().enumerate() {
        out.push_str(&format!(
            "{:>2}. {} -> {} ({}): -{:.0} g for {:+.2}, score {:.1}\n",
            rank + 1,
            win.baseline_id,
            win.option.candidate.id,
            win.slot,
            win.option.weight_saved,
            win.option.cost_added,
            win.score
        ));
    }
    out.trim_end().to_string()
}
