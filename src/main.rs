mod conf;
mod dataset;
mod error;
mod es_client;
mod loader;
mod models;
mod resource;
#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::es_client::EsClient;

/// Loads the OGC Simple Features geo dataset into a running store.
#[derive(Parser, Debug)]
#[command(name = "ogc-geo-loader", version)]
struct Args {
    /// TOML or JSON config file, layered under OGC_LOADER_* variables.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Store endpoint, e.g. http://localhost:9200
    #[arg(long)]
    url: Option<String>,
    #[arg(long)]
    index: Option<String>,
    /// Directory holding ogc/ogc.json. Defaults to the source checkout's
    /// resources/, or resources/ next to the executable once installed.
    #[arg(long, value_name = "DIR")]
    resources: Option<PathBuf>,
    #[arg(long)]
    insecure: bool,
    /// Read mapping and aliases back after loading and compare them.
    #[arg(long)]
    verify: bool,
    #[arg(short, long)]
    debug: bool,
    #[arg(long)]
    log_json: bool,
}

fn init_tracing(debug: bool, json: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = conf::load(args.config.as_deref())?;
    if let Some(url) = args.url {
        config.set_url(url);
    }
    if let Some(index) = args.index {
        config.set_index(index);
    }
    if let Some(resources) = args.resources {
        config.set_resources(resources);
    }
    if args.insecure {
        config.set_insecure(true);
    }
    debug!(
        "Config loaded ... url={}, index={}, resources={:?}",
        config.get_url(),
        config.get_index(),
        config.get_resources()
    );

    let endpoint = config.endpoint();
    let http_client = es_client::build_http_client(&endpoint)?;
    let client = EsClient::new(endpoint, http_client);

    if let Some(server_info) = client.print_server_info("Target").await {
        if !server_info.supports_mapping_types() {
            warn!(
                "Store version {} rejects the '{}' mapping type, index creation will likely fail",
                server_info.get_version(),
                dataset::MAPPING_TYPE
            );
        }
    }

    let index = config.get_index();
    loader::load_dataset(&client, index, config.get_resources()).await?;
    info!("Geo data loaded");

    if args.verify {
        loader::verify_dataset(&client, index).await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.debug, args.log_json);
    info!("Application started!");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
