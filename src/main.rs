use clap::Parser;
use tracing::info;

use strokeshapes::config::{DpOptions, PaleoThresholds};
use strokeshapes::dollarp::DpContext;
use strokeshapes::paleo::PaleoRecognizer;
use strokeshapes::{csv_data, data, socket_service};

/// strokeshapes - pen-stroke shape recognition service (PaleoSketch + $P)
#[derive(Parser)]
#[command(name = "strokeshapes")]
#[command(about = "Pen-stroke shape recognition via Unix socket", long_about = None)]
#[command(version = env!("GIT_VERSION"))]
struct Args {
    /// Path to the $P gesture template library (JSON or CSV format)
    #[arg(short = 'd', long, default_value = "templates.json")]
    data_file: String,

    /// Unix socket path for the recognition service
    #[arg(short = 's', long)]
    socket_path: Option<String>,

    /// Optional JSON file overriding the PaleoSketch thresholds
    #[arg(short = 'c', long)]
    config_file: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let socket_path = args
        .socket_path
        .unwrap_or_else(socket_service::default_socket_path);

    let thresholds = match &args.config_file {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        }
        None => PaleoThresholds::default(),
    };

    info!(version = env!("GIT_VERSION"), "strokeshapes starting");
    info!(data_file = %args.data_file, "loading template library");

    let library = if args.data_file.ends_with(".csv") {
        csv_data::load_templates_csv(&args.data_file)
    } else {
        data::load_templates_json(&args.data_file)
    };
    let library = match library {
        Ok(library) => library,
        Err(e) => {
            tracing::warn!(error = %e, "failed to load template library, starting with none");
            Vec::new()
        }
    };

    let mut dollarp = DpContext::with_options(DpOptions::default());
    for (name, strokes) in &library {
        for stroke in strokes {
            dollarp.add_template(stroke, name.clone());
        }
    }
    info!(num_templates = dollarp.templates().len(), "templates loaded");

    let paleo = PaleoRecognizer::with_config(thresholds, strokeshapes::config::ShapeRanks::default());

    info!(socket_path = %socket_path, "starting Unix socket service");
    let service = socket_service::SocketService::new(paleo, dollarp, socket_path);
    service.start()?;

    Ok(())
}
