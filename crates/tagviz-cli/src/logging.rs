//! Log subscriber setup
//!
//! Logs go to stderr so stdout stays free for reports. `RUST_LOG` is honored
//! unless `-v` was given; the default level is `info`.

use tracing_subscriber::EnvFilter;

/// Subscriber options from the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogOptions {
    /// Number of `-v` flags
    pub verbosity: u8,
    /// Emit one JSON object per event
    pub json: bool,
}

impl LogOptions {
    fn directive(self) -> &'static str {
        match self.verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Filter to install
    #[must_use]
    pub fn filter(self) -> EnvFilter {
        if self.verbosity == 0 {
            if let Ok(filter) = EnvFilter::try_from_default_env() {
                return filter;
            }
        }
        EnvFilter::new(self.directive())
    }
}

/// Install the global subscriber
///
/// # Errors
/// Returns error if a global subscriber is already installed
pub fn init(options: LogOptions) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(options.filter())
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = if options.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_level() {
        let verbose = LogOptions {
            verbosity: 1,
            json: false,
        };
        assert_eq!(verbose.filter().to_string(), "debug");

        let very = LogOptions {
            verbosity: 3,
            json: true,
        };
        assert_eq!(very.filter().to_string(), "trace");
    }
}
