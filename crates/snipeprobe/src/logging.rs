//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Output format of the fmt subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Filter directive for a CLI verbosity level (`-q` = -1, default 0, `-v`…)
#[must_use]
pub fn level_for(verbosity: i8) -> &'static str {
    match verbosity {
        i8::MIN..=-1 => "error",
        0 => "info",
        1 => "snipeprobe=debug,info",
        _ => "trace",
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `default_level`.
///
/// Returns `false` when a subscriber was already installed.
pub fn init(default_level: &str, format: LogFormat) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for(-1), "error");
        assert_eq!(level_for(0), "info");
        assert_eq!(level_for(1), "snipeprobe=debug,info");
        assert_eq!(level_for(5), "trace");
    }

    #[test]
    fn test_second_init_is_harmless() {
        let _ = init("info", LogFormat::Text);
        assert!(!init("debug", LogFormat::Json));
    }
}
