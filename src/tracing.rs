use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

pub const DEFAULT_FILTER: &str = "info,actix_server=warn";

/// Install the global fmt subscriber. `RUST_LOG` overrides `default_filter`.
/// `LOG_FORMAT=compact` trades file/line locations for shorter lines. Logs go
/// to stderr so `query` output on stdout stays clean JSON.
pub fn init_tracing(default_filter: &str) -> Result<(), anyhow::Error> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let compact = crate::util::env::env_opt("LOG_FORMAT").as_deref() == Some("compact");

    SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_target(!compact)
        .with_file(!compact)
        .with_line_number(!compact)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))
}
