//! Logging configuration module
//!
//! Provides configurable JSON/Pretty logging output
//!
//! # Environment Variables
//! - `LOG_FORMAT`: Output format - `json` (default) or `pretty`
//! - `RUST_LOG`: Log level filter (default: `info`)

use tracing_subscriber::EnvFilter;

/// Initialize logging with configurable format
///
/// Reads `LOG_FORMAT` from environment:
/// - `json` (default): Machine-parseable JSON output for production
/// - `pretty`: Human-readable output for development
///
/// Also respects `RUST_LOG` for log level filtering (default: `info`)
pub fn init_logging() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_format.as_str() {
        "pretty" => {
            // Human-readable for development
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .pretty()
                .init();
        }
        _ => {
            // JSON for production (default)
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .json()
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    // NOTE: Unit testing `init_logging()` is not practical because:
    // 1. tracing_subscriber can only be initialized ONCE per process
    // 2. Calling init() twice causes a panic
    //
    // Validation approach:
    // - Env var parsing logic tested below
    // - Actual JSON output validated via integration testing:
    //   `LOG_FORMAT=json cargo run 2>&1 | head -1 | jq .`

    /// Test that "pretty" format is correctly recognized
    #[test]
    fn test_pretty_format_detection() {
        let test_cases = vec![
            ("pretty", true),
            ("json", false),
            ("PRETTY", false), // Case sensitive
            ("", false),
            ("other", false),
        ];

        for (input, expected_pretty) in test_cases {
            let is_pretty = input == "pretty";
            assert_eq!(is_pretty, expected_pretty, "Failed for input: {}", input);
        }
    }

    /// Test RUST_LOG parsing fallback
    #[test]
    fn test_env_filter_fallback() {
        use tracing_subscriber::EnvFilter;

        // When RUST_LOG is not set, should create a valid filter with default
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        assert!(!format!("{:?}", filter).is_empty());
    }
}
