//! peerscore CLI binary.
//!
//! Scores and benchmarks SME company-year panels from CSV files.

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use peerscore::bench::Dispersion;
use peerscore::data::{IsicSection, PanelColumns, RowPolicy, Sector};
use peerscore::factors::{
    AgeConvention, FallbackPolicy, ScoringVariant, SectorWeightTable, SegmentMode, WeightSource,
    available_slots, get_slot_info,
};
use peerscore::output::{
    BenchmarkExport, ExportFormat, Exporter, IndustryExport, ReportBuilder, TrendMatrixExport,
};
use peerscore::{Pipeline, ScoringConfig, load_inputs};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "peerscore")]
#[command(about = "peerscore: SME scoring and peer benchmarking", long_about = None)]
#[command(version)]
struct Cli {
    /// Log pipeline progress (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a panel and write benchmark tables
    Score {
        /// Company-year panel CSV
        #[arg(long)]
        panel: PathBuf,

        /// Companies CSV with founding years
        #[arg(long)]
        companies: Option<PathBuf>,

        /// Output directory
        #[arg(long, default_value = "out")]
        out_dir: PathBuf,

        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Normalization segment key
        #[arg(long, value_enum)]
        segment: Option<SegmentArg>,

        /// Scoring variant
        #[arg(long, value_enum)]
        variant: Option<VariantArg>,

        /// Standard deviation estimator for benchmarks
        #[arg(long, value_enum)]
        dispersion: Option<DispersionArg>,

        /// Leave sectors without registered weights unscored
        #[arg(long)]
        deny_fallback: bool,

        /// Count the founding year as year one
        #[arg(long)]
        inclusive_age: bool,

        /// Panel uses the Arabic registry column names
        #[arg(long)]
        arabic_columns: bool,

        /// Drop rows missing an identifier, year or sector instead of failing
        #[arg(long)]
        skip_bad_rows: bool,

        /// Output format (csv, json or pretty-json)
        #[arg(long, default_value = "csv")]
        format: ExportFormat,
    },

    /// List the variant's slots, then sectors and their weights
    Sectors {
        /// Scoring variant
        #[arg(long, value_enum, default_value = "peers")]
        variant: VariantArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SegmentArg {
    SectorYear,
    SectorYearTier,
}

impl From<SegmentArg> for SegmentMode {
    fn from(arg: SegmentArg) -> Self {
        match arg {
            SegmentArg::SectorYear => Self::SectorYear,
            SegmentArg::SectorYearTier => Self::SectorYearTier,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VariantArg {
    Peers,
    TierAware,
}

impl From<VariantArg> for ScoringVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Peers => Self::Peers,
            VariantArg::TierAware => Self::TierAware,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DispersionArg {
    Sample,
    Population,
}

impl From<DispersionArg> for Dispersion {
    fn from(arg: DispersionArg) -> Self {
        match arg {
            DispersionArg::Sample => Self::Sample,
            DispersionArg::Population => Self::Population,
        }
    }
}

#[derive(Debug)]
struct ScoreArgs {
    panel: PathBuf,
    companies: Option<PathBuf>,
    out_dir: PathBuf,
    columns: PanelColumns,
    policy: RowPolicy,
    format: ExportFormat,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "peerscore=debug,info" } else { "peerscore=info,warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Score {
            panel,
            companies,
            out_dir,
            config,
            segment,
            variant,
            dispersion,
            deny_fallback,
            inclusive_age,
            arabic_columns,
            skip_bad_rows,
            format,
        } => {
            let mut config = match config {
                Some(path) => ScoringConfig::from_path(&path)?,
                None => ScoringConfig::default(),
            };
            if let Some(segment) = segment {
                config.segment_mode = segment.into();
            }
            if let Some(variant) = variant {
                config.variant = variant.into();
            }
            if let Some(dispersion) = dispersion {
                config.dispersion = dispersion.into();
            }
            if deny_fallback {
                config.fallback = FallbackPolicy::Deny;
            }
            if inclusive_age {
                config.age_convention = AgeConvention::Inclusive;
            }

            let args = ScoreArgs {
                panel,
                companies,
                out_dir,
                columns: if arabic_columns {
                    PanelColumns::arabic()
                } else {
                    PanelColumns::default()
                },
                policy: if skip_bad_rows {
                    RowPolicy::SkipRecord
                } else {
                    RowPolicy::RejectRun
                },
                format,
            };
            score_panel(config, &args)?;
        }
        Commands::Sectors { variant } => list_sectors(variant.into()),
    }

    Ok(())
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn score_panel(config: ScoringConfig, args: &ScoreArgs) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::new(config)?;
    let pb = spinner();

    pb.set_message(format!("Loading {}...", args.panel.display()));
    let records = match load_inputs(
        &args.panel,
        args.companies.as_deref(),
        &args.columns,
        args.policy,
    ) {
        Ok(records) => records,
        Err(e) => {
            pb.finish_with_message("Failed!");
            return Err(e.into());
        }
    };

    pb.set_message(format!("Scoring {} records...", records.len()));
    let output = match pipeline.run(records) {
        Ok(output) => output,
        Err(e) => {
            pb.finish_with_message("Failed!");
            return Err(e.into());
        }
    };

    pb.set_message("Writing tables...");
    fs::create_dir_all(&args.out_dir)?;
    let ext = args.format.extension();

    let benchmarks = args.out_dir.join(format!("benchmarks.{ext}"));
    BenchmarkExport::from_rows(&output.benchmark.rows).export_to_file(&benchmarks, args.format)?;
    let industries = args.out_dir.join(format!("industries.{ext}"));
    IndustryExport::from_rows(&output.benchmark.industries)
        .export_to_file(&industries, args.format)?;
    let trend = args.out_dir.join(format!("trend.{ext}"));
    TrendMatrixExport::from(&output.benchmark.trend).export_to_file(&trend, args.format)?;

    let report_path = args.out_dir.join("report.json");
    ReportBuilder::new()
        .title(panel_title(&args.panel))
        .summary(output.summary.clone())
        .config(serde_json::to_value(pipeline.config())?)
        .build()?
        .write_json(&report_path)?;

    pb.finish_with_message(format!("Wrote results to {}", args.out_dir.display()));
    info!(out_dir = %args.out_dir.display(), "exports written");

    print!("{}", output.summary);
    println!("\nOutputs:");
    for path in [&benchmarks, &industries, &trend, &report_path] {
        println!("  {}", path.display());
    }

    Ok(())
}

fn panel_title(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

fn list_sectors(variant: ScoringVariant) {
    let table = SectorWeightTable::builtin(variant);
    let slots = variant.slots();

    println!("Slots ({} variant):", variant.name());
    println!("====================\n");
    for (i, slot) in slots.iter().enumerate() {
        if let Some(info) = get_slot_info(slot.name()) {
            println!(
                "{}. {:<26} {:<12} {}",
                i + 1,
                info.slot.name(),
                info.kind.name(),
                info.description
            );
        }
    }
    let unused: Vec<&str> = available_slots()
        .iter()
        .filter(|info| !slots.contains(&info.slot))
        .map(|info| info.slot.name())
        .collect();
    if !unused.is_empty() {
        println!("   Not used by this variant: {}", unused.join(", "));
    }

    println!("\nSectors:");
    println!("====================\n");

    for section in IsicSection::all() {
        let resolved = table.resolve(&Sector::Isic(section));
        let weights = resolved
            .weights
            .as_array()
            .iter()
            .map(|w| format!("{w:.3}"))
            .collect::<Vec<_>>()
            .join(" ");
        let marker = match resolved.source {
            WeightSource::Registered => "",
            WeightSource::Fallback => " (equal)",
        };
        println!(
            "{} - {:<55} {}  [{}]{}",
            section.code(),
            section.name(),
            section.arabic_name(),
            weights,
            marker
        );
    }
}
