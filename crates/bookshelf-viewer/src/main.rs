//! Bookshelf - native entry point

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use bookshelf_core::{load_config, ShelfSnapshot};
    use bookshelf_viewer::{app, snapshot};
    use clap::Parser;
    use tracing::{info, Level};
    use tracing_subscriber::FmtSubscriber;

    #[derive(Parser, Debug)]
    #[command(name = "bookshelf")]
    #[command(about = "3D bookshelf view of a task snapshot")]
    #[command(version)]
    struct Args {
        /// Path to configuration file
        #[arg(short, long, default_value = "bookshelf.toml")]
        config: PathBuf,

        /// Snapshot JSON to display (bundled demo shelf when omitted)
        #[arg(short, long)]
        snapshot: Option<PathBuf>,

        /// Log level (trace, debug, info, warn, error)
        #[arg(short, long, default_value = "info")]
        log_level: String,

        /// Write the default configuration to the config path and exit
        #[arg(long)]
        write_config: bool,
    }

    pub fn main() -> Result<()> {
        let args = Args::parse();

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

        info!("Bookshelf v{}", env!("CARGO_PKG_VERSION"));

        if args.write_config {
            bookshelf_core::config::save_default_config(&args.config)
                .with_context(|| format!("writing {}", args.config.display()))?;
            info!(path = %args.config.display(), "Default configuration written");
            return Ok(());
        }

        let config = load_config(&args.config)?;

        let snapshot = match &args.snapshot {
            Some(path) => ShelfSnapshot::load(path)
                .with_context(|| format!("loading snapshot {}", path.display()))?,
            None => {
                info!("No snapshot given, showing the demo shelf");
                snapshot::demo_snapshot()?
            }
        };

        info!(
            categories = snapshot.categories.len(),
            tasks = snapshot.task_count(),
            "Starting viewer"
        );

        app::run(config, Some(snapshot));
        Ok(())
    }
}
