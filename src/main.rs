//! Library Dispatch Inspector CLI.
//!
//! Loads a per-library dispatch configuration and prints the resolved mode
//! and version for each queried library name, as the dispatcher would see
//! them at open time. Useful for auditing which backend a given library
//! would be routed to before running a guest program.

use clap::Parser;
use std::collections::BTreeMap;
use std::process;
use tracing_subscriber::EnvFilter;

use amiga_emulator::config::{LibConfig, LibMode, LibsConfig};
use amiga_emulator::libmgr::lib_base_name;

/// Command-line arguments for the dispatch inspector.
#[derive(Parser, Debug)]
#[command(author, version, about = "Amiga 68k library dispatch inspector")]
struct Args {
    #[arg(short, long, default_value = "configs/libs.toml")]
    config: String,

    /// Force this dispatch mode for all queried names.
    #[arg(short, long)]
    mode: Option<String>,

    /// Emit the resolved table as JSON.
    #[arg(long)]
    json: bool,

    /// Library names to resolve; defaults to all configured names.
    names: Vec<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let cfg = match LibsConfig::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("[!] FATAL: {}", e);
            process::exit(1);
        }
    };
    let force_mode: Option<LibMode> = match args.mode.as_deref().map(str::parse::<LibMode>).transpose() {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("[!] FATAL: {}", e);
            process::exit(1);
        }
    };

    let names: Vec<String> = if args.names.is_empty() {
        let mut names: Vec<String> = cfg.libs.keys().cloned().collect();
        names.sort();
        names
    } else {
        args.names.clone()
    };

    let mut table: BTreeMap<String, LibConfig> = BTreeMap::new();
    for name in &names {
        let mut lib_cfg = cfg.get_lib_config(name, lib_base_name(name));
        if let Some(mode) = force_mode {
            lib_cfg.mode = mode;
        }
        table.insert(name.clone(), lib_cfg);
    }

    if args.json {
        match serde_json::to_string_pretty(&table) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("[!] FATAL: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("Library Dispatch Table");
        println!("----------------------");
        println!(
            "Default:  mode={:<6} version={}",
            cfg.default.mode.to_string(),
            cfg.default.version
        );
        for (name, lib_cfg) in &table {
            println!(
                "  {:<28} mode={:<6} version={}",
                name,
                lib_cfg.mode.to_string(),
                lib_cfg.version
            );
        }
        println!("----------------------");
    }
}
