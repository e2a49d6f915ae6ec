//! Structured logging macros over the `log` facade
//!
//! Context values accept any `Display` type and are rendered as
//! `message [key=value, key=value]`.

/// Log error with a diagnostic `Code`
#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr) => {
        $crate::log::error!("[{}] {}", $code, $message)
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+ $(,)?) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            $crate::log::error!(
                "[{}] {}{}",
                $code,
                $message,
                $crate::logging::format_context(&context_strings)
            )
        }
    };
}

/// Log warning message with optional context
#[macro_export]
macro_rules! log_warning {
    ($message:expr) => {
        $crate::log::warn!("{}", $message)
    };

    ($message:expr, $($key:expr => $value:expr),+ $(,)?) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            $crate::log::warn!(
                "{}{}",
                $message,
                $crate::logging::format_context(&context_strings)
            )
        }
    };
}

/// Log informational message with optional context
#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        $crate::log::info!("{}", $message)
    };

    ($message:expr, $($key:expr => $value:expr),+ $(,)?) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            $crate::log::info!(
                "{}{}",
                $message,
                $crate::logging::format_context(&context_strings)
            )
        }
    };
}

/// Log debug message with optional context
#[macro_export]
macro_rules! log_debug {
    ($message:expr) => {
        $crate::log::debug!("{}", $message)
    };

    ($message:expr, $($key:expr => $value:expr),+ $(,)?) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            $crate::log::debug!(
                "{}{}",
                $message,
                $crate::logging::format_context(&context_strings)
            )
        }
    };
}
