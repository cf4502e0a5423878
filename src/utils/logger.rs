use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `RUST_LOG` wins; otherwise the crate logs at info, or debug when verbose.
fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("bus_registry=debug,info")
        } else {
            EnvFilter::new("bus_registry=info")
        }
    })
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

/// Structured output for log collectors.
pub fn init_json_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .json(),
        )
        .init();
}
