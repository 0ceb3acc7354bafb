use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. Logs go to stderr; stdout carries only the published URL.
///
/// `RUST_LOG` takes precedence over `verbose`.
pub fn init(verbose: bool, json: bool) {
  let default_level = if verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  let builder = fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false);

  let _ = if json { builder.json().try_init() } else { builder.try_init() };
}
