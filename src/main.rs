use anyhow::Result;
use api_surface_diff::compat::{CompareOptions, ComparisonResult};
use api_surface_diff::model::SNAPSHOT_SCHEMA_VERSION;
use api_surface_diff::surface::{ApiSurface, Compatibility};
use clap::Parser;
use const_format::formatcp;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const ABOUT: &str = formatcp!(
    "Detect breaking changes between two API surface snapshots (snapshot schema v{})",
    SNAPSHOT_SCHEMA_VERSION
);

#[derive(Parser)]
#[command(name = "api-surface-diff")]
#[command(about = ABOUT)]
#[command(version)]
struct Args {
    #[arg(long, short, global = true, help = "Enable debug logging")]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
enum Commands {
    #[command(about = "Compare two snapshots and list classified changes")]
    Compare {
        #[arg(help = "Path to the old snapshot document")]
        old_file: PathBuf,
        #[arg(help = "Path to the new snapshot document")]
        new_file: PathBuf,
        #[arg(long, help = "YAML file with a `compare:` section")]
        config: Option<PathBuf>,
        #[arg(long, help = "Wildcard pattern for type names (* and ?)")]
        type_filter: Option<String>,
        #[arg(long, help = "Wildcard patterns for member names, separated by |")]
        member_filter: Option<String>,
        #[arg(long, help = "Only list High severity changes")]
        breaking_only: bool,
        #[arg(long, help = "Maximum changes listed per category")]
        max_per_category: Option<usize>,
        #[arg(long, help = "Output format", value_enum, default_value = "text")]
        format: OutputFormat,
    },
    #[command(about = "Generate the surface fingerprint of a snapshot")]
    Fingerprint {
        #[arg(help = "Path to the snapshot document")]
        file: PathBuf,
    },
    #[command(about = "Print a Green/Yellow/Red compatibility verdict")]
    Verdict {
        #[arg(help = "Path to the old snapshot document")]
        old_file: PathBuf,
        #[arg(help = "Path to the new snapshot document")]
        new_file: PathBuf,
    },
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum OutputFormat {
    Text,
    Json,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Commands::Compare {
            old_file,
            new_file,
            config,
            type_filter,
            member_filter,
            breaking_only,
            max_per_category,
            format,
        } => {
            let old_surface = ApiSurface::from_file(&old_file)?;
            let new_surface = ApiSurface::from_file(&new_file)?;

            // Build configuration
            let mut options = match config {
                Some(path) => CompareOptions::from_yaml_file(&path).map_err(|e| {
                    anyhow::anyhow!("Failed to load config '{}': {}", path.display(), e)
                })?,
                None => CompareOptions::default(),
            };
            if type_filter.is_some() {
                options.type_name_filter = type_filter;
            }
            if member_filter.is_some() {
                options.member_name_filter = member_filter;
            }
            if breaking_only {
                options.breaking_changes_only = true;
            }
            if let Some(max) = max_per_category {
                options.max_changes_per_category = max;
            }

            let result = old_surface.check_changes(&new_surface, &options)?;

            match format {
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&result)?;
                    println!("{}", json);
                }
                OutputFormat::Text => print_text(&result),
            }

            if result.has_breaking_changes() {
                std::process::exit(1);
            }
        }
        Commands::Fingerprint { file } => {
            let surface = ApiSurface::from_file(&file)?;
            println!("{}", surface.fingerprint);
        }
        Commands::Verdict { old_file, new_file } => {
            let old_surface = ApiSurface::from_file(&old_file)?;
            let new_surface = ApiSurface::from_file(&new_file)?;

            match old_surface.compare_with(&new_surface)? {
                Compatibility::Green => println!("Green: Surfaces are structurally identical"),
                Compatibility::Yellow => {
                    println!("Yellow: New surface is backward-compatible with old surface")
                }
                Compatibility::Red => {
                    println!("Red: Breaking change detected");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn print_text(result: &ComparisonResult) {
    println!(
        "{} {} -> {}",
        result.package_id, result.from_version, result.to_version
    );

    if result.changes.is_empty() {
        println!("No changes listed.");
    }

    for change in &result.changes {
        let subject = match change.member_name() {
            Some(member) => format!("{}.{}", change.full_type_name(), member),
            None => change.full_type_name().to_string(),
        };
        println!("  [{}] {} {}", change.severity(), change.category(), subject);
        match (change.from(), change.to()) {
            (Some(from), Some(to)) => println!("    {} -> {}", from, to),
            (Some(from), None) => println!("    was: {}", from),
            (None, Some(to)) => println!("    now: {}", to),
            (None, None) => {}
        }
        if let (Some(from_type), Some(to_type)) = (change.from_type(), change.to_type()) {
            println!("    type: {} -> {}", from_type, to_type);
        }
        println!("    {}", change.impact());
    }

    let summary = &result.summary;
    println!();
    println!("Summary:");
    println!("  Total changes: {}", summary.total_changes);
    println!("  Breaking: {}", summary.breaking_changes);
    println!("  Non-breaking: {}", summary.non_breaking_changes);
    println!(
        "  Additions: {}, removals: {}, modifications: {}",
        summary.additions, summary.removals, summary.modifications
    );
    for (category, count) in &summary.changes_by_category {
        println!("    {}: {}", category, count);
    }
    if result.is_truncated {
        println!(
            "  Output truncated to {} changes per category",
            result.max_changes_per_category
        );
    }
}
