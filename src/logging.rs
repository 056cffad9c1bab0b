//! Diagnostic logging on stderr
//!
//! Status lines for the user go through [`crate::ui::Reporter`]; this is the
//! developer-facing trace. `DESKFORGE_LOG` takes an `EnvFilter` directive;
//! without it only warnings are shown, or debug events with `--verbose`.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

const LOG_ENV: &str = "DESKFORGE_LOG";

fn default_directive(verbose: bool) -> &'static str {
    if verbose { "deskforge=debug" } else { "warn" }
}

/// Install the global subscriber; later calls are ignored
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init();
}
