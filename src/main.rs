//! gridcalc - Spreadsheet formulas from the command line

use std::collections::BTreeSet;
use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use gridcalc_core::{CellRef, CellValue, Sheet, SheetConfig};
use tracing_subscriber::EnvFilter;

fn print_usage() {
    eprintln!("Usage: gridcalc [OPTIONS] [CELL=TEXT ...]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [CELL=TEXT ...]           Assign cells in order, then print each assigned cell");
    eprintln!("                            (e.g. A1=10 'B1==A1*2')");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --command <FORMULA>   Evaluate one formula in an empty sheet and print it");
    eprintln!("  --config <FILE>           Load grid size from a TOML file");
    eprintln!("  -h, --help                Print help");
}

fn usage_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    print_usage();
    std::process::exit(2);
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let args: Vec<String> = env::args().collect();

    let mut command: Option<String> = None;
    let mut config_file: Option<PathBuf> = None;
    let mut assignments: Vec<(String, String)> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "-c" | "--command" => {
                i += 1;
                if i >= args.len() {
                    usage_error("--command requires a formula");
                }
                command = Some(args[i].to_string());
            }
            "--config" => {
                i += 1;
                if i >= args.len() {
                    usage_error("--config requires a file path");
                }
                config_file = Some(PathBuf::from(&args[i]));
            }
            arg if arg.starts_with('-') => usage_error(&format!("Unknown option: {}", arg)),
            arg => match arg.split_once('=') {
                Some((cell, text)) if !cell.is_empty() => {
                    assignments.push((cell.to_string(), text.to_string()));
                }
                _ => usage_error(&format!("Expected CELL=TEXT, got: {}", arg)),
            },
        }
        i += 1;
    }

    if command.is_some() && !assignments.is_empty() {
        usage_error("--command cannot be combined with cell assignments");
    }
    if command.is_none() && assignments.is_empty() {
        print_usage();
        std::process::exit(2);
    }

    let config = match load_config(config_file.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    tracing::debug!(columns = config.columns, rows = config.rows, "sheet config");
    let mut sheet = Sheet::with_config(config);

    let code = match command {
        Some(formula) => run_command(&mut sheet, &formula),
        None => run_assignments(&mut sheet, &assignments),
    };
    match code {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Explicit `--config`, else `<config dir>/gridcalc/config.toml` when present.
fn load_config(explicit: Option<&Path>) -> Result<SheetConfig> {
    if let Some(path) = explicit {
        return SheetConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()));
    }
    let Some(proj) = ProjectDirs::from("", "", "gridcalc") else {
        return Ok(SheetConfig::default());
    };
    let path = proj.config_dir().join("config.toml");
    if !path.exists() {
        return Ok(SheetConfig::default());
    }
    SheetConfig::load(&path).with_context(|| format!("failed to load config {}", path.display()))
}

/// Evaluate a single formula in A1. A missing leading `=` is added.
fn run_command(sheet: &mut Sheet, formula: &str) -> Result<i32> {
    let text = if formula.starts_with('=') {
        formula.to_string()
    } else {
        format!("={}", formula)
    };
    let cell = CellRef::new(0, 0);
    sheet.set_cell_content(cell, &text)?;
    match sheet.cell_value(&cell) {
        CellValue::Error(e) => {
            println!("{}", e);
            Ok(1)
        }
        _ => {
            println!("{}", sheet.display_value(&cell));
            Ok(0)
        }
    }
}

/// Apply assignments in order and print every assigned cell, row-major.
fn run_assignments(sheet: &mut Sheet, assignments: &[(String, String)]) -> Result<i32> {
    let size = sheet.size();
    let mut assigned = BTreeSet::new();
    for (name, text) in assignments {
        let Some(cell) = CellRef::parse(name, size) else {
            usage_error(&format!(
                "Invalid cell reference: {} (grid is A1:{}{})",
                name,
                size.last_column_letter(),
                size.rows
            ));
        };
        sheet.set_cell_content(cell, text)?;
        assigned.insert(cell);
    }

    let mut code = 0;
    for cell in &assigned {
        println!("{}\t{}", cell, sheet.display_value(cell));
        if let Some(e) = sheet.cell_value(cell).as_error() {
            eprintln!("{}: {}", cell, e.message());
            code = 1;
        }
    }
    Ok(code)
}
