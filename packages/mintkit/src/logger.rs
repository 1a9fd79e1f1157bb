//! Log output for applications.
//!
//! Mintkit reports recovered failures (panicking subscribers, malformed nodes, refused DOM edits)
//! through `tracing`. Nothing is printed unless a subscriber is installed, which [`init`] does.

use std::env;

pub use tracing::Level;
use tracing_subscriber::{filter::LevelFilter, prelude::*, util::TryInitError, EnvFilter};

/// Overrides the level passed to [`init`], using `EnvFilter` directives.
pub const LOG_ENV: &str = "MINTKIT_LOG";

/// Install a global fmt subscriber at `level`.
///
/// If `MINTKIT_LOG` is set its directives win. Fails if a global subscriber is already set.
pub fn init(level: Level) -> Result<(), TryInitError> {
    let mut filter = EnvFilter::default().add_directive(LevelFilter::from_level(level).into());

    if env::var(LOG_ENV).is_ok() {
        filter = EnvFilter::from_env(LOG_ENV);
    }

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_timer(tracing_subscriber::fmt::time::uptime());

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
}
