//! Loader Service - One-shot load of the IBGE geography snapshot
//!
//! Responsibilities:
//! - Load states and municipalities from the configured source
//!   (IBGE API with CSV fallback, or the Postgres warehouse)
//! - Print the dashboard summary as a text report or JSON
//! - Optionally seed the warehouse tables from the fetched snapshot
//!
//! Usage:
//!   # Remote load with fallback:
//!   cargo run --bin loader
//!
//!   # Force a specific source:
//!   cargo run --bin loader -- --source csv
//!
//!   # Fetch remotely and fill the warehouse:
//!   cargo run --bin loader -- --seed-warehouse

use anyhow::{Context, Result};
use clap::Parser;
use geodata::source::{api, mirror, warehouse};
use geodata::{load_geography, summarize, SourceConfig, SourceMode, Summary};

#[derive(Parser, Debug)]
#[command(
    name = "loader",
    about = "Loads the IBGE geography snapshot and prints the dashboard summary"
)]
struct Args {
    /// Source selection: auto (API with CSV fallback), api, csv or warehouse
    #[arg(long, default_value = "auto")]
    source: String,

    /// Print the summary as JSON instead of the text report
    #[arg(long, default_value = "false")]
    json: bool,

    /// Write the fetched snapshot into the warehouse tables (needs DB_URL)
    #[arg(long, default_value = "false")]
    seed_warehouse: bool,
}

#[derive(Debug, Clone)]
struct Config {
    base_url: String,
    estados_csv_url: String,
    municipios_csv_url: String,
    db_url: Option<String>,
}

impl Config {
    fn from_env() -> Self {
        Self {
            base_url: std::env::var("IBGE_BASE_URL")
                .unwrap_or_else(|_| api::DEFAULT_BASE_URL.to_string()),
            estados_csv_url: std::env::var("ESTADOS_CSV_URL")
                .unwrap_or_else(|_| mirror::DEFAULT_ESTADOS_URL.to_string()),
            municipios_csv_url: std::env::var("MUNICIPIOS_CSV_URL")
                .unwrap_or_else(|_| mirror::DEFAULT_MUNICIPIOS_URL.to_string()),
            db_url: std::env::var("DB_URL").ok(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();
    let args = Args::parse();
    let config = Config::from_env();

    println!("=== Localidades Loader ===");
    println!("Source: {}", args.source);

    let source_config = SourceConfig {
        base_url: config.base_url.clone(),
        estados_csv_url: config.estados_csv_url.clone(),
        municipios_csv_url: config.municipios_csv_url.clone(),
        mode: SourceMode::Remote,
    };

    let snapshot = match args.source.as_str() {
        "auto" => load_geography(&source_config).await?,
        "api" => api::load(&source_config).await?,
        "csv" => mirror::load(&source_config).await?,
        "warehouse" => {
            let db_url = config
                .db_url
                .as_deref()
                .context("DB_URL env var missing (required for --source warehouse)")?;
            warehouse::load(db_url).await?
        }
        other => anyhow::bail!("unknown source '{other}' (expected auto, api, csv or warehouse)"),
    };

    let summary = summarize(&snapshot);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_report(&summary);
    }

    if args.seed_warehouse {
        let db_url = config
            .db_url
            .as_deref()
            .context("DB_URL env var missing (required for --seed-warehouse)")?;
        println!("\nSeeding warehouse tables...");
        warehouse::seed(db_url, &snapshot).await?;
        println!("  ✓ estados: {} rows", snapshot.estados.len());
        println!("  ✓ municipios: {} rows", snapshot.municipios.len());
    }

    Ok(())
}

fn print_report(summary: &Summary) {
    println!("\nFonte dos dados: {}", summary.fonte);
    println!(
        "Carregado em: {}",
        summary.carregado_em.format("%Y-%m-%d %H:%M:%S UTC")
    );

    println!("\n=== Resumo ===");
    println!("Total de municípios: {}", summary.total_municipios);
    println!("Total de estados: {}", summary.total_estados);
    if let Some(regiao) = &summary.regiao_destaque {
        println!("Região com mais municípios: {regiao}");
    }

    println!("\nMunicípios por região:");
    println!("{:-<40}", "");
    for row in &summary.municipios_por_regiao {
        println!("  {:<14} {:>6}", row.regiao, row.municipios);
    }

    println!("\nTop 10 — Estados com mais municípios:");
    println!("{:-<40}", "");
    for row in &summary.top_estados {
        println!("  {:>2}. {:<4} {:>6}", row.rank, row.uf, row.municipios);
    }
}
