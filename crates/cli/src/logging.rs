use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// Install a stderr subscriber. `RUST_LOG` overrides the default level.
pub fn init() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
