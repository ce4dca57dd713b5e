use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialise desk-wide logging. Every subscribe connector's read loop runs inside an INFO-level
/// span; skipped records (parse failures, missing products, missing buckets) are logged at WARN
/// and the loop continues.
pub fn init() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::layer())
        .init()
}
