//! Default diagnostics setup
//!
//! The engine logs through `tracing` and never consults log state for
//! control flow. When the embedding application has not installed a
//! subscriber of its own, [`init_default`] provides the documented
//! fallback: warnings and above, written to stderr.

use tracing_subscriber::EnvFilter;

/// Installs the default subscriber if none is configured.
///
/// Honors `RUST_LOG` when set, otherwise filters at `warn`. A subscriber
/// already installed by the application wins; this call then does nothing.
pub fn init_default() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
