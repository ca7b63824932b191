use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Log to stderr. `RUST_LOG` wins over `verbosity` when set.
pub fn init_tracing(verbosity: u8) {
    if verbosity == 0 {
        return;
    }
    INIT.call_once(|| {
        let level = if verbosity == 1 { "debug" } else { "trace" };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("lipi_core={level},lipi_cli={level}")));
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_env_filter(filter)
            .init();
    });
}
