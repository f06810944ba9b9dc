use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber. Diagnostics go to stderr so stdout only
/// carries the result lines.
///
/// `RUST_LOG` wins when set; otherwise `debug` picks between info and debug
/// for this crate.
pub fn init_logging(debug: bool) {
    let default_filter = if debug {
        "deploy=debug,info"
    } else {
        "deploy=info,warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}
