use thiserror::Error;
use tracing::info;
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Target of events emitted by the `cart` binary itself
pub const CLI_TARGET: &str = "cart";

/// Build the default filter directive for a service:
/// `<crate_target>=<level>,cart=<level>`
pub fn default_filter_directive(service_name: &str, log_level: &str) -> String {
    format!(
        "{}={},{}={}",
        service_name.replace('-', "_"),
        log_level,
        CLI_TARGET,
        log_level
    )
}

/// Initialize structured logging.
///
/// `RUST_LOG` wins when set; otherwise the service's own target logs at
/// `log_level`. Logs go to stderr so they never mix with command output.
pub fn init_observability(
    service_name: &str,
    log_level: &str,
    enable_json_logging: bool,
) -> Result<(), ObservabilityError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter_directive(service_name, log_level))
            .map_err(|e| ObservabilityError::Config(e.to_string()))?,
    };

    if enable_json_logging {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(false)
            .with_span_list(false)
            .with_target(false)
            .with_level(true)
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::NONE);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| ObservabilityError::TracingInit(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_file(false)
            .with_line_number(false)
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::NONE);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| ObservabilityError::TracingInit(e.to_string()))?;
    }

    info!(service = %service_name, "Observability initialized");
    Ok(())
}
