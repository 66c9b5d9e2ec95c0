mod cli;

use std::sync::Arc;

use clap::Parser;
use cli::Cli;
use colored::Colorize;
use flare::{assess, config, oracle::Oracle, output, types::RiskLevel};

fn main() {
    let cli = Cli::parse();

    let cwd = match cli.cwd {
        Some(p) => p,
        None => std::env::current_dir().unwrap_or_else(|e| {
            eprintln!("Error: could not determine current directory: {e}");
            std::process::exit(2);
        }),
    };

    let config = config::Config::load(cli.config.as_deref()).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(2);
    });

    eprintln!("{}", "Assessing command…".dimmed());

    let oracle = Arc::new(Oracle::with_http_backend());
    let report = assess::assess(&cli.command, &cwd, &config, &oracle);

    let formatted = output::format_assessment(&report, &cli.format);
    print!("{formatted}");

    std::process::exit(match report.risk_level {
        RiskLevel::None | RiskLevel::Low | RiskLevel::Medium => 0,
        RiskLevel::High => 1,
        RiskLevel::Critical => 2,
    });
}
