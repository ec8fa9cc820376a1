mod edits;
mod notebook;
mod tiles;

use anyhow::Result;
use quill_engine::device::GpuInit;
use quill_engine::logging::{init_logging, LoggingConfig};
use quill_engine::window::{Runtime, RuntimeConfig};

use notebook::NotebookApp;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let app = NotebookApp::new()?;
    log::info!("quill studio starting");

    Runtime::run(
        RuntimeConfig {
            title: "Quill Studio".to_string(),
            ..RuntimeConfig::default()
        },
        GpuInit::default(),
        app,
    )
}
