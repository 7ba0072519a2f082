use std::sync::Arc;

use clap::Parser;
use cortex::core::config::ConfigPaths;
use cortex::core::{Config, ConfigStore, SessionContext};
use cortex::error::CortexError;
use cortex::flags::Flags;
use cortex::highlight::Palette;
use cortex::input::{PromptHelper, Terminal};
use cortex::model::{OpenAiBackend, ResponseGateway};
use cortex::process::{signal, ShellExecutor};
use cortex::shell::Session;
use tracing::warn;
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<(), CortexError> {
    let flags = Flags::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(flags.log_level())
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to set up logging: {e}");
    }

    // API keys may live in a local .env
    dotenvy::dotenv().ok();

    let paths = ConfigPaths::new(flags.config.as_deref())?;
    let store = ConfigStore::new(paths);
    let config = store.load_or_init().unwrap_or_else(|e| {
        warn!("couldn't load settings, using defaults: {e}");
        Config::default()
    });

    let context = Arc::new(SessionContext::new());
    let palette = Palette::new();
    let gateway = ResponseGateway::new(
        Box::new(OpenAiBackend::new(&config.backend)?),
        Arc::clone(&context),
    );
    let terminal = Terminal::new(Arc::clone(&context), PromptHelper::new(palette))?;
    let executor = ShellExecutor::new(palette);

    let mut session = Session::new(
        config,
        store,
        gateway,
        context,
        Box::new(terminal),
        Box::new(executor),
        palette,
    );
    if let Some(model) = flags.model {
        session = session.with_model(model);
    }

    signal::install_interrupt_handler()?;
    session.run()
}
