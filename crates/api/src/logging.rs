use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset
const DEFAULT_DIRECTIVES: &str = "info,hyper=warn,reqwest=warn,tower_http=info";

/// Output format of the global subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event, for log shippers
    Json,
    /// Multi-line human readable output
    Pretty,
}

impl LogFormat {
    /// JSON in production, pretty everywhere else
    pub fn for_environment(environment: &str) -> Self {
        if environment.eq_ignore_ascii_case("production") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install the global subscriber. Returns `false` when one was already set.
pub fn init(format: LogFormat) -> bool {
    let installed = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .json(),
            )
            .try_init()
            .is_ok(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter())
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .try_init()
            .is_ok(),
    };

    if installed {
        tracing::info!("Logging initialized ({:?})", format);
    }
    installed
}

pub fn init_for_environment(environment: &str) -> bool {
    init(LogFormat::for_environment(environment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_selection() {
        assert_eq!(LogFormat::for_environment("production"), LogFormat::Json);
        assert_eq!(LogFormat::for_environment("PRODUCTION"), LogFormat::Json);
        assert_eq!(LogFormat::for_environment("development"), LogFormat::Pretty);
        assert_eq!(LogFormat::for_environment("staging"), LogFormat::Pretty);
    }

    #[test]
    fn test_second_init_is_rejected() {
        // Whichever test installs first wins; a later install never panics
        init(LogFormat::Pretty);
        assert!(!init(LogFormat::Json));
    }
}
