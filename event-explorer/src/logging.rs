use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter for a verbosity count: 0 is warnings, 1 debug, 2+ trace
/// for this workspace's crates.
pub fn default_directives(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "warn,event_explorer=debug,explorer_dispatch_core=debug",
        _ => "info,event_explorer=trace,explorer_dispatch_core=trace",
    }
}

/// Install the global subscriber, writing to stderr so command output on
/// stdout stays clean. `RUST_LOG` wins over `-v`.
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init();
}
