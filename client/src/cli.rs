use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use common::{AggregationPipeline, PipelineConfig};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::info;

use crate::sink::ConsoleSink;

#[derive(Parser, Debug)]
#[command(name = "client")]
#[command(about = "CLI para armar el mapa agregado por clave desde una API REST")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Corre una agregación completa y muestra el mapa resultante
    Run {
        /// Config JSON (si no se pasa, usa posts/todos/users de jsonplaceholder)
        #[arg(long, value_name = "ARCHIVO")]
        config: Option<PathBuf>,

        /// Pisa la URL base de la config y de AGGREGATOR_BASE_URL
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,

        /// Escribe el mapa en un archivo en vez de stdout
        #[arg(long, value_name = "ARCHIVO")]
        output: Option<PathBuf>,
    },
    /// Muestra la configuración efectiva
    Config {
        #[arg(long, value_name = "ARCHIVO")]
        config: Option<PathBuf>,
    },
}

/// Config final: archivo (o default) -> env var -> flag --base-url.
fn load_config(path: Option<&Path>, base_url: Option<String>) -> Result<PipelineConfig> {
    let cfg = match path {
        Some(p) => PipelineConfig::from_file(p)
            .with_context(|| format!("no se pudo leer la config {}", p.display()))?,
        None => PipelineConfig::default(),
    };

    let mut cfg = cfg.with_env_overrides();
    if let Some(url) = base_url {
        cfg.base_url = url;
    }

    cfg.validate()?;
    Ok(cfg)
}

/// Falla si el mapa no se pudo escribir en `--output`.
fn check_output(sink: &ConsoleSink) -> Result<()> {
    match sink.take_write_error() {
        Some(e) => Err(e).context("no se pudo escribir el resultado"),
        None => Ok(()),
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            base_url,
            output,
        } => {
            let cfg = load_config(config.as_deref(), base_url)?;
            info!(
                "agregando {} por `{}` desde {}",
                cfg.primary.path, cfg.group_key, cfg.base_url
            );

            let sink = Arc::new(ConsoleSink::new(output));
            let pipeline = AggregationPipeline::over_http(cfg, sink.clone())?;

            match pipeline.run().await {
                Ok(run) => {
                    if let Err(e) = check_output(&sink) {
                        eprintln!("Error guardando el resultado: {e:#}");
                        std::process::exit(1);
                    }
                    info!("corrida {}", run.run_id);
                    info!("  claves    : {}", run.keys);
                    info!("  requests  : {}", run.requests_issued);
                    info!("  duración  : {} ms", run.elapsed_ms());
                }
                Err(e) => {
                    eprintln!("Error ejecutando la agregación: {e}");
                    std::process::exit(1);
                }
            }
        }

        Commands::Config { config } => {
            let cfg = load_config(config.as_deref(), None)?;
            println!("{}", serde_json::to_string_pretty(&cfg)?);
        }
    }

    Ok(())
}
