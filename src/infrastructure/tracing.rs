use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize tracing on stderr so command output on stdout stays clean.
/// Priority: SITECTL_LOG env > verbose flag > default (warn)
pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("SITECTL_LOG").unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "warn" };
        EnvFilter::new(format!("sitectl={}", level))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
