//! Logging for the evidence collection core
//!
//! Records go through the `log` facade; the embedding process chooses the
//! backend (the `scribe` binary installs `env_logger`). Swallowed scan
//! conditions are logged at warning level with a code from [`codes`].

pub mod codes;
pub mod macros;

pub use codes::Code;

/// Render `"key" => value` pairs as a ` [key=value, ...]` suffix
pub fn format_context(context: &[(&str, String)]) -> String {
    if context.is_empty() {
        return String::new();
    }

    let pairs: Vec<String> = context
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    format!(" [{}]", pairs.join(", "))
}
