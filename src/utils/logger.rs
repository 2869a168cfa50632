use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;

/// Filter used when `RUST_LOG` is unset. Menu sessions share the terminal with
/// the log, so they only get warnings unless `-v` is given.
fn default_filter(verbose: bool, interactive: bool) -> &'static str {
    match (verbose, interactive) {
        (true, _) => "chocan_simulator=debug,warn",
        (false, true) => "warn",
        (false, false) => "chocan_simulator=info,warn",
    }
}

pub fn init_cli_logger(verbose: bool, interactive: bool, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose, interactive)));

    // stdout belongs to the terminal menus
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    match format {
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(layer.compact())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_sessions_default_to_warnings() {
        assert_eq!(default_filter(false, true), "warn");
        assert_eq!(default_filter(false, false), "chocan_simulator=info,warn");
        assert_eq!(default_filter(true, true), "chocan_simulator=debug,warn");
    }
}
