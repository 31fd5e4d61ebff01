//! RepoDash - GitHub Repositories Dashboard
//!
//! A CLI tool that loads repository tables from CSV or spreadsheet files,
//! normalizes their columns, and renders top-N highlights, bar charts,
//! pie charts and raw tables as a Markdown or JSON dashboard.
//!
//! Exit codes:
//!   0 - Success (every dashboard section rendered)
//!   1 - Runtime error (unreadable source, invalid config or arguments)
//!   2 - Dashboard written, but one or more sections failed

use anyhow::{anyhow, Context, Result};
use repodash::cli::{Args, OutputFormat};
use repodash::config::{self, Config};
use repodash::models::Table;
use repodash::report::{self, LoadedSource, SourceRole};
use repodash::{analysis, source};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("RepoDash v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_dashboard(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Dashboard failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .repodash.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE_NAME);
    println!("   Edit it to set data sources, top-N counts and bucket ranges.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete load → normalize → summarize → render pass.
/// Returns the exit code (0 or 2).
fn run_dashboard(args: Args) -> Result<i32> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let settings = config
        .report_settings()
        .context("Invalid report settings")?;
    let hints = config.columns.hints();
    let sheet = config.sources.sheet.clone();

    // Step 1: Load and normalize the sources
    let primary_path = config.sources.primary.clone().ok_or_else(|| {
        anyhow!("No primary data source. Pass --data or set [sources].primary in the config file")
    })?;

    if !args.quiet {
        println!("📥 Loading data: {}", primary_path.display());
    }
    let primary = load_source(SourceRole::Primary, primary_path, sheet.clone(), &hints)?;

    let secondary = match config.sources.secondary.clone() {
        Some(path) => {
            if !args.quiet {
                println!("📥 Loading data: {}", path.display());
            }
            Some(load_source(SourceRole::Secondary, path, sheet, &hints)?)
        }
        None => None,
    };

    // Handle --dry-run: describe the normalized tables and exit
    if args.dry_run {
        return handle_dry_run(&primary, secondary.as_ref());
    }

    // Step 2: Summarize
    let dashboard = report::assemble(&primary, secondary.as_ref(), &settings);

    // Step 3: Render and save
    let output = match args.format {
        OutputFormat::Json => report::generate_json_dashboard(&dashboard)?,
        OutputFormat::Markdown => report::generate_markdown_dashboard(&dashboard),
    };

    let output_path = PathBuf::from(&config.general.output);
    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write dashboard to {}", output_path.display()))?;

    let failed = dashboard.failed_sections();

    if !args.quiet {
        println!("\n📊 Dashboard Summary:");
        for source in &dashboard.metadata.sources {
            println!(
                "   {} source: {} rows, {} columns",
                source.role, source.rows, source.columns
            );
        }
        println!(
            "   Sections: {} highlights, {} bar charts, {} pie charts",
            dashboard.highlights.len(),
            dashboard.bar_charts.len(),
            dashboard.pie_charts.len()
        );
        println!(
            "\n✅ Dashboard complete! Saved to: {}",
            output_path.display()
        );
    }

    if failed > 0 {
        eprintln!(
            "\n⛔ {} dashboard section(s) could not be computed. Failing (exit code 2).",
            failed
        );
        return Ok(2);
    }

    Ok(0)
}

/// Load one source and normalize it.
fn load_source(
    role: SourceRole,
    path: PathBuf,
    sheet: Option<String>,
    hints: &analysis::ColumnHints,
) -> Result<LoadedSource> {
    let spec = source::SourceSpec::new(path.clone()).with_sheet(sheet);
    let raw = source::load_table(&spec)?;
    let table = analysis::normalize(&raw, hints);

    Ok(LoadedSource { role, path, table })
}

/// Handle --dry-run: print the schema of each normalized source.
fn handle_dry_run(primary: &LoadedSource, secondary: Option<&LoadedSource>) -> Result<i32> {
    println!("\n🔍 Dry run: sources normalized, no dashboard written.\n");

    for source in std::iter::once(primary).chain(secondary) {
        let table = &source.table;
        println!(
            "   {} source: {} ({} rows)",
            source.role,
            source.path.display(),
            table.row_count()
        );

        for line in column_summary(table) {
            println!("     {}", line);
        }
        println!();
    }

    println!("✅ Dry run complete.");
    Ok(0)
}

/// One line per column: name, semantic type and missing count.
fn column_summary(table: &Table) -> Vec<String> {
    if table.column_count() == 0 {
        return vec!["(no columns)".to_string()];
    }

    table
        .columns()
        .iter()
        .enumerate()
        .map(|(index, column)| {
            format!(
                "📄 {}: {} ({} missing)",
                column.name,
                column.column_type,
                table.missing_count(index)
            )
        })
        .collect()
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", config::CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
