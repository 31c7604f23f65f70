//! Diagnostic log output

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable consulted for a log filter
pub const LOG_ENV: &str = "MARKSWEEP_LOG";

static INIT: Once = Once::new();

/// Initialise the tracing subscriber once per process
///
/// `MARKSWEEP_LOG` wins over `directive`, which wins over the
/// default of `marksweep=info`. Output goes to stderr.
pub fn init_logging(directive: Option<&str>) {
    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(directive.unwrap_or("marksweep=info")));

        fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .init();
    });
}
