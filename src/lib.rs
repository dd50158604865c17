pub mod catalog;
pub mod cli;
pub mod error;
pub mod folding;
pub mod labels;
pub mod session;
pub mod settings;
pub mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use catalog::{Catalog, DirectorySource};
use cli::Cli;
use labels::DirectoryIdentity;
use session::{LabelingController, SessionHandle};

pub use error::{LabelerError, LabelerResult};

/// Build a labeling session from the parsed command line and hand it to
/// the operator console.
pub async fn start(cli: Cli) -> Result<()> {
    cli.check_inputs()?;

    // Creates RESULTS_ROOT, which also holds the default settings file.
    let identity = DirectoryIdentity::new(&cli.results_root)?;
    let settings = cli.settings()?;
    let store = identity.resolve(&cli.user)?;

    let catalog = Catalog::load(&cli.catalog, cli.subset.as_deref())
        .with_context(|| format!("failed to load catalog {}", cli.catalog.display()))?;

    info!(
        "Starting session for {} ({} light curves, {}x{} grid, checkpoint {})",
        cli.user,
        catalog.len(),
        settings.grid.rows,
        settings.grid.cols,
        settings.checkpoint
    );

    let controller = LabelingController::new(
        catalog,
        Box::new(DirectorySource::new(&cli.raw_dir)),
        Box::new(store),
        &settings,
    );
    let session = SessionHandle::spawn(controller)?;

    terminal::run_console(&session, &settings.classes).await?;
    info!("Session for {} finished", cli.user);
    Ok(())
}

pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?
        .block_on(start(cli))
}
