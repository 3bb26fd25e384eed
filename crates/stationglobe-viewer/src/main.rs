//! Station Globe - desktop entry point

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::main()
}

// The browser build starts from the library's wasm_bindgen entry
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::Parser;
    use stationglobe_core::config::{load_config, save_default_config};
    use stationglobe_viewer::app::{self, Launch};
    use stationglobe_viewer::sources::read_catalog;
    use tracing::{info, Level};
    use tracing_subscriber::FmtSubscriber;

    #[derive(Parser, Debug)]
    #[command(name = "stationglobe")]
    #[command(about = "Interactive globe of station locations")]
    #[command(version)]
    struct Args {
        /// Path to configuration file
        #[arg(short, long, default_value = "stationglobe.toml")]
        config: PathBuf,

        /// JSON file with the station list
        #[arg(short, long)]
        stations: Option<PathBuf>,

        /// JSON file with the observer list
        #[arg(short, long)]
        observers: Option<PathBuf>,

        /// Log level (trace, debug, info, warn, error)
        #[arg(short, long, default_value = "info")]
        log_level: String,

        /// Write the default configuration to the config path and exit
        #[arg(long)]
        write_default_config: bool,
    }

    pub fn main() -> Result<()> {
        let args = Args::parse();

        // Initialize logging
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .finish();

        tracing::subscriber::set_global_default(subscriber)?;

        info!("Station Globe v{}", env!("CARGO_PKG_VERSION"));

        if args.write_default_config {
            save_default_config(&args.config)
                .with_context(|| format!("Failed to write {}", args.config.display()))?;
            println!("Wrote default configuration to {}", args.config.display());
            return Ok(());
        }

        let config = load_config(&args.config)
            .with_context(|| format!("Failed to load {}", args.config.display()))?;
        let catalog = read_catalog(args.stations.as_deref(), args.observers.as_deref())?;

        info!(
            stations = catalog.len(),
            container = %config.page.container_id,
            "Starting globe"
        );

        app::run(Launch::Ready { config, catalog });
        Ok(())
    }
}
