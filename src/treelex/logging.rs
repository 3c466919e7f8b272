//! Tracing setup
//!
//! The library only emits `tracing` events: `debug` when entries are registered or removed
//! and when descenders open and close, `trace` for every selected match. Nothing is printed
//! unless a subscriber is installed, which [init_tracing] does when `RUST_LOG` is set.
//!
//! ```bash
//! RUST_LOG=treelex=debug treelex lang.yaml input.txt
//! RUST_LOG=treelex::treelex::lexer=trace treelex lang.yaml input.txt
//! ```

use std::sync::Once;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Install a stderr subscriber filtered by `RUST_LOG`
///
/// Does nothing when `RUST_LOG` is unset. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(EnvFilter::from_default_env())
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}
