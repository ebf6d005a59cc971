use std::sync::Once;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Setup logging for the application, honouring `RUST_LOG`
pub fn setup_logging() -> eyre::Result<()> {
    let mut result = Ok(());
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        result = init_subscriber(filter);
    });

    result
}

/// Setup logging with custom level
pub fn setup_logging_with_level(level: &str) -> eyre::Result<()> {
    let filter = EnvFilter::try_new(level)?;
    let mut result = Ok(());
    INIT.call_once(|| {
        result = init_subscriber(filter);
    });

    result
}

// stdout belongs to the CLI output
fn init_subscriber(filter: EnvFilter) -> eyre::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .with(filter)
        .try_init()?;

    Ok(())
}
