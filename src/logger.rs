use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Checked before `RUST_LOG`.
const LOG_ENV: &str = "RINHA_LOAD_LOG";
/// `--verbose`: debug for this crate only.
const VERBOSE_DIRECTIVE: &str = "info,rinha_load=debug";
const DEFAULT_DIRECTIVE: &str = "info";

/// Installs the global `tracing` subscriber. Later calls are no-ops apart
/// from a warning on stderr.
pub fn init_logging(verbose: bool, no_color: bool) {
    let directive = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(build_filter(directive.as_deref(), verbose))
        .with_ansi(!no_color)
        .with_target(false)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}

fn build_filter(directive: Option<&str>, verbose: bool) -> EnvFilter {
    let fallback = if verbose {
        VERBOSE_DIRECTIVE
    } else {
        DEFAULT_DIRECTIVE
    };
    directive
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(fallback))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_is_idempotent() {
        init_logging(false, true);
        init_logging(true, true);
    }

    #[test]
    fn explicit_directive_wins_over_verbose() -> Result<(), String> {
        let filter = build_filter(Some("warn"), true);
        if filter.to_string() != "warn" {
            return Err(format!("Unexpected filter {}", filter));
        }
        Ok(())
    }

    #[test]
    fn invalid_directive_falls_back() -> Result<(), String> {
        let filter = build_filter(Some("rinha_load=loud"), false);
        if filter.to_string() != DEFAULT_DIRECTIVE {
            return Err(format!("Unexpected filter {}", filter));
        }
        let verbose = build_filter(None, true).to_string();
        if !verbose.contains("rinha_load=debug") {
            return Err(format!("Unexpected verbose filter {}", verbose));
        }
        Ok(())
    }
}
