//! stackgen - Main entry point
//!
//! Gathers selections from a file, `--set` assignments and `--name`, then runs
//! the engine. Exit status: 0 on success, 1 for invalid input, 70 when the
//! engine's own tables are broken.

use anyhow::{Context, Result};
use std::fs;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use stackgen::cli::{Cli, Commands, SelectionArgs};
use stackgen::engine::{self, Catalog, DefaultRule, OptionSpec};
use stackgen::error::{engine_defect, exit_code};
use stackgen::{normalize_project_name, summarize, RawSelections};

/// Initialize the logger; `RUST_LOG` overrides the default level
fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse_args();
    init_logger(cli.verbose);
    debug!("CLI arguments parsed");

    let code = match run(cli.command) {
        Ok(code) => code,
        Err(e) => report_failure(&e),
    };
    std::process::exit(code);
}

fn run(command: Commands) -> Result<i32> {
    let catalog = engine::startup_check()?;

    match command {
        Commands::Options => {
            print_options(catalog);
            Ok(0)
        }
        Commands::Validate { input } => {
            let raw = gather_selections(&input, catalog)?;
            if !report_violations(&raw, catalog) {
                return Ok(1);
            }
            println!("✓ Selections are valid ({} supplied)", raw.len());
            Ok(0)
        }
        Commands::Render {
            input,
            output,
            summary,
        } => {
            let raw = gather_selections(&input, catalog)?;
            if !report_violations(&raw, catalog) {
                return Ok(1);
            }

            if summary {
                let config = engine::resolve(&raw, catalog)?;
                for line in summarize(&config) {
                    eprintln!("  {}", line);
                }
            }

            let context = engine::render_context(&raw, catalog)?;
            let json = context
                .to_json_pretty()
                .context("Failed to serialize render context")?;
            match output {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("Failed to write render context to {:?}", path))?;
                    info!("Render context written to {:?}", path);
                    eprintln!("✓ Render context written to {}", path.display());
                }
                None => println!("{}", json),
            }
            Ok(0)
        }
        Commands::Summary { input } => {
            let raw = gather_selections(&input, catalog)?;
            if !report_violations(&raw, catalog) {
                return Ok(1);
            }
            let config = engine::resolve(&raw, catalog)?;
            println!("Configuration Summary");
            println!();
            for line in summarize(&config) {
                println!("  {}", line);
            }
            Ok(0)
        }
    }
}

/// Build one set of selections: file first, then `--set`, then `--name`
fn gather_selections(input: &SelectionArgs, catalog: &Catalog) -> Result<RawSelections> {
    let mut raw = match &input.file {
        Some(path) => {
            info!("Loading selections from {:?}", path);
            RawSelections::load_from_file(path)?
        }
        None => RawSelections::new(),
    };

    raw.apply_assignments(&input.assignments, catalog)?;

    if let Some(name) = &input.name {
        let normalized = normalize_project_name(name);
        if normalized != *name {
            info!("Project name '{}' normalized to '{}'", name, normalized);
        }
        raw.set("project_name", normalized);
    }
    Ok(raw)
}

/// Print every violation; returns true when there were none
fn report_violations(raw: &RawSelections, catalog: &Catalog) -> bool {
    let violations = engine::validate(raw, catalog);
    if violations.is_empty() {
        return true;
    }

    warn!("Selections failed validation with {} violation(s)", violations.len());
    eprintln!("✗ {} problem(s) found in the selections:", violations.len());
    for violation in &violations {
        eprintln!("  - {}", violation);
    }
    false
}

fn print_options(catalog: &Catalog) {
    for option in catalog.options() {
        println!(
            "{:<34} {}  default: {}",
            option.id,
            option.kind.label(),
            describe_default(option)
        );
        println!("    {}", option.description);
        if !option.relevant.is_always() {
            println!(
                "    only when {} (otherwise {})",
                option.relevant, option.inactive
            );
        }
    }
}

fn describe_default(option: &OptionSpec) -> String {
    match &option.default {
        DefaultRule::Fixed(value) => value.to_string(),
        DefaultRule::When {
            condition,
            then,
            otherwise,
        } => format!("{} when {}, else {}", then, condition, otherwise),
    }
}

/// Report a failure and map it to its exit status, telling engine defects
/// apart from bad input
fn report_failure(err: &anyhow::Error) -> i32 {
    match engine_defect(err) {
        Some(defect) => {
            error!("Engine defect: {}", defect);
            eprintln!("✗ Internal error: {}", defect);
            eprintln!("  This is a defect in stackgen, not in your input. Please file a defect report.");
        }
        None => {
            error!("{:#}", err);
            eprintln!("✗ {:#}", err);
        }
    }
    exit_code(err)
}
