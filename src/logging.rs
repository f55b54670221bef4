use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Installs the global subscriber. Levels come from `GRADEBOOK_LOG`
/// (e.g. `GRADEBOOK_LOG=gradebook_standing=debug`), falling back to
/// `gradebook_standing=info`. Output goes to stderr so stdout stays clean
/// for summaries and JSON.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("GRADEBOOK_LOG")
            .unwrap_or_else(|_| EnvFilter::new("gradebook_standing=info"));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .with(filter)
            .init();
    });
}
