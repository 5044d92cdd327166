use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn level_from_verbosity(verbosity: u8) -> tracing::Level {
    match verbosity {
        0..=1 => tracing::Level::WARN,
        2..=3 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    }
}

pub fn init(level: tracing::Level) -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("telescope={}", level).parse()?)
        .add_directive(level.into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
