/// Environment variable that overrides `RUST_LOG` for this crate's tools.
pub const LOG_ENV: &str = "QUADSTORE_LOG";

/// Copy `QUADSTORE_LOG` into `RUST_LOG` so a logger initialised afterwards
/// picks it up.
pub fn init_logging() {
    if let Ok(log_level) = std::env::var(LOG_ENV) {
        std::env::set_var("RUST_LOG", log_level);
    }
}
