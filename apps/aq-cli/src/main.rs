use std::path::{Path, PathBuf};

use aq_app::{
    AppConfig, AppResult, ReplayEngine, RunOptions, RunProgressEvent, RunRequest,
    compile_feed, load_flowsheet, prepare_run, run_service, save_flowsheet, summarize_flowsheet,
};
use aq_chem::BalanceMode;
use aq_core::UnitSystem;
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(name = "aq-cli")]
#[command(about = "AquaNova CLI - membrane train model compiler", long_about = None)]
struct Cli {
    /// Application config YAML (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, migrate and validate a flowsheet, then check its process train
    Validate {
        /// Path to the flowsheet file
        flowsheet: PathBuf,
    },
    /// Print the SI engine request for a flowsheet
    Compile {
        /// Read form values in this unit system instead of the flowsheet's own
        #[arg(long)]
        units: Option<UnitSystem>,
        /// Fail on a broken process graph instead of rebuilding it
        #[arg(long)]
        no_repair: bool,
        /// Path to the flowsheet file
        flowsheet: PathBuf,
    },
    /// Print the charge-balanced feed ions, audit record and scaling preview
    Balance {
        /// off, anions, cations or all (defaults to the flowsheet setting)
        #[arg(long)]
        mode: Option<BalanceMode>,
        /// Path to the flowsheet file
        flowsheet: PathBuf,
    },
    /// Replay a recorded engine response and print display output and chips
    Render {
        /// Display unit system (defaults to the config setting)
        #[arg(long)]
        units: Option<UnitSystem>,
        /// Path to the flowsheet file
        flowsheet: PathBuf,
        /// Recorded SI engine response (JSON)
        response: PathBuf,
    },
    /// Rewrite a flowsheet at the latest schema version
    Migrate {
        /// Flowsheet to read (any supported version)
        input: PathBuf,
        /// Where to write the migrated flowsheet (.json or .yaml)
        output: PathBuf,
    },
    /// List cached runs
    Runs {
        /// Cache directory (defaults to the config's run_cache_dir)
        cache_dir: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Validate { flowsheet } => cmd_validate(&flowsheet),
        Commands::Compile {
            units,
            no_repair,
            flowsheet,
        } => cmd_compile(&flowsheet, config, units, no_repair),
        Commands::Balance { mode, flowsheet } => cmd_balance(&flowsheet, &config, mode),
        Commands::Render {
            units,
            flowsheet,
            response,
        } => cmd_render(&flowsheet, &response, config, units),
        Commands::Migrate { input, output } => cmd_migrate(&input, &output),
        Commands::Runs { cache_dir } => cmd_runs(cache_dir.or(config.run_cache_dir)),
    }
}

fn cmd_validate(path: &Path) -> AppResult<()> {
    println!("Validating flowsheet: {}", path.display());
    let sheet = load_flowsheet(path)?;
    let summary = summarize_flowsheet(&sheet)?;

    println!("✓ Flowsheet is valid: {} (v{})", summary.name, summary.version);
    println!(
        "  {} units ({} pumps), {} connections",
        summary.unit_count, summary.pump_count, summary.edge_count
    );
    match (&summary.train, &summary.topology_error) {
        (Some(train), _) => println!("  Train: feed -> {} -> product", train.join(" -> ")),
        (None, Some(reason)) => {
            println!("  ⚠ Process train is not linear: {}", reason);
            println!("    `compile` will rebuild it from node positions unless --no-repair is set");
        }
        (None, None) => {}
    }
    Ok(())
}

fn cmd_compile(
    path: &Path,
    mut config: AppConfig,
    units: Option<UnitSystem>,
    no_repair: bool,
) -> AppResult<()> {
    let mut sheet = load_flowsheet(path)?;
    if let Some(units) = units {
        sheet.unit_system = units;
    }
    if no_repair {
        config.auto_repair = false;
    }

    let prepared = prepare_run(&sheet, &config)?;
    if let Some(edges) = &prepared.repaired {
        eprintln!("⚠ Process graph rebuilt from node positions ({} connections)", edges.len());
    }
    for field in &prepared.defaulted {
        eprintln!("  default used: {}", field);
    }

    println!("{}", serde_json::to_string_pretty(&prepared.request)?);
    Ok(())
}

fn cmd_balance(path: &Path, config: &AppConfig, mode: Option<BalanceMode>) -> AppResult<()> {
    let sheet = load_flowsheet(path)?;
    let mode = mode
        .or(sheet.defaults.charge_balance)
        .or(config.defaults.charge_balance)
        .unwrap_or_default();

    let feed = compile_feed(&sheet.feed, sheet.unit_system, mode);
    if let Some(note) = &feed.balance.note {
        eprintln!("⚠ {}", note);
    }

    let report = serde_json::json!({
        "ions": feed.request.ions,
        "charge_balance": feed.balance,
        "scaling": feed.scaling,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_render(
    path: &Path,
    response: &Path,
    mut config: AppConfig,
    units: Option<UnitSystem>,
) -> AppResult<()> {
    let sheet = load_flowsheet(path)?;
    if let Some(units) = units {
        config.display_units = units;
    }
    let engine = ReplayEngine::new(response);

    let request = RunRequest {
        flowsheet: &sheet,
        config: &config,
        engine: &engine,
        options: RunOptions::default(),
    };
    let response = run_service::run_scenario_with_progress(
        &request,
        Some(&mut |event: RunProgressEvent| render_cli_progress(&event)),
    )?;
    info!(run_id = %response.run_id, "rendered");

    let report = serde_json::json!({
        "run_id": response.run_id,
        "output": response.display,
        "chips": response.chips,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_migrate(input: &Path, output: &Path) -> AppResult<()> {
    let sheet = load_flowsheet(input)?;
    save_flowsheet(output, &sheet)?;
    println!(
        "✓ Migrated {} -> {} (v{})",
        input.display(),
        output.display(),
        sheet.version
    );
    Ok(())
}

fn cmd_runs(cache_dir: Option<PathBuf>) -> AppResult<()> {
    let Some(cache_dir) = cache_dir else {
        println!("No run cache configured");
        return Ok(());
    };

    let runs = run_service::list_runs(&cache_dir)?;
    if runs.is_empty() {
        println!("No cached runs in {}", cache_dir.display());
    } else {
        println!("Cached runs:");
        for run in runs {
            println!(
                "  {} - {} ({} stages, engine {}, {})",
                run.run_id, run.scenario_name, run.stage_count, run.engine_version, run.timestamp
            );
        }
    }
    Ok(())
}

fn render_cli_progress(event: &RunProgressEvent) {
    eprintln!(
        "[{:>6.2}s] {}{}",
        event.elapsed_wall_s,
        event.stage.label(),
        event
            .message
            .as_deref()
            .map(|m| format!(": {}", m))
            .unwrap_or_default()
    );
}
