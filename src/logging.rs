use tracing_subscriber::{EnvFilter, fmt};

use crate::error::{Result, ToolError};

/// Installs the global tracing subscriber. Events go to stderr so that the
/// result lines printed on stdout stay machine readable.
///
/// `RUST_LOG` takes precedence; otherwise the level is derived from the number
/// of `-v` flags.
pub fn init(verbosity: u8) -> Result<()> {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}
