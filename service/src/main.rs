use anyhow::Context;
use clap::Parser;
use generator::profile::{build_survey, write_survey, SurveyConfig};
use log::{info, warn};
use signalcore::survey::FilterParams;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::ServiceConfig;
use workflow::runner::Runner;

mod generator;
mod map_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Signal survey map driver")]
struct Args {
    /// Load the service config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Survey export to read, overriding the config
    #[arg(long)]
    source: Option<PathBuf>,
    /// Technology filter: ALL, 2G, 3G, 4G or 5G
    #[arg(long, default_value = "ALL")]
    tech: String,
    /// Operator filter, exact name or ALL
    #[arg(long, default_value = "ALL")]
    operator: String,
    /// PSC/PCI cell filter; empty disables it
    #[arg(long, default_value = "")]
    psc_pci: String,
    /// Run a single request and print the map view as JSON
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Serve the map endpoint until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
    /// Write a synthetic survey export; it becomes the source unless --source is given
    #[arg(long)]
    generate: Option<PathBuf>,
    #[arg(long, default_value_t = 500)]
    points: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if let Some(path) = &args.generate {
        let survey = SurveyConfig {
            points: args.points,
            seed: args.seed,
            ..Default::default()
        };
        let rows = build_survey(&survey)?;
        write_survey(path, &rows)?;
        println!("Generated {} survey rows -> {}", rows.len(), path.display());
    }

    let mut config = match &args.config {
        Some(path) => ServiceConfig::load(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(source) = args.source.clone().or_else(|| args.generate.clone()) {
        config = config.with_source(source);
    }

    let runner = Arc::new(Runner::new(config.clone()));

    if args.offline {
        let params = FilterParams {
            tech: args.tech.clone(),
            operator: args.operator.clone(),
            psc_pci: args.psc_pci.clone(),
        };
        let view = runner.execute(&params);
        println!(
            "{}",
            serde_json::to_string_pretty(&view).context("serialising map view")?
        );

        let metrics = runner.metrics();
        info!(
            "Offline run -> rows {}, survivors {}, errors {}",
            metrics.rows_read, metrics.survivors, metrics.errors
        );
    }
    if args.serve {
        let runtime = TokioBuilder::new_multi_thread()
            .enable_all()
            .build()
            .context("creating runtime for the map bridge")?;
        runtime.block_on(map_bridge::bridge::serve(runner, config.bind, async {
            if let Err(err) = signal::ctrl_c().await {
                warn!("awaiting Ctrl+C failed: {}", err);
            }
        }))?;
    }

    Ok(())
}
