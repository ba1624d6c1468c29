pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod export;
pub mod extract;
pub mod fake_match;
pub mod fatigue;
pub mod identity;
pub mod lineup;
pub mod physical;
pub mod pitch;
pub mod technical;
pub mod tracking;
pub mod velocity;

pub use context::{load_match, MatchContext};
pub use error::{PipelineError, PipelineResult};

/// Stderr logging for the binaries; `RUST_LOG` overrides the default filter.
pub fn init_tracing() -> anyhow::Result<()> {
    use anyhow::Context;
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("matchday_analytics=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;
    Ok(())
}
