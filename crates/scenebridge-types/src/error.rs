//! Unified error interface for SceneBridge.
//!
//! Every error enum in the workspace implements [`ErrorCode`] so that the
//! dispatch boundary can log failures with a stable, machine-readable code
//! instead of matching on display strings.
//!
//! # Example
//!
//! ```
//! use scenebridge_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum ProbeError {
//!     Missing(String),
//!     Busy,
//! }
//!
//! impl ErrorCode for ProbeError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::Missing(_) => "PROBE_MISSING",
//!             Self::Busy => "PROBE_BUSY",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::Busy)
//!     }
//! }
//!
//! let err = ProbeError::Busy;
//! assert_eq!(err.code(), "PROBE_BUSY");
//! assert!(err.is_recoverable());
//! ```

/// Machine-readable classification of an error.
///
/// # Code Format
///
/// - **UPPER_SNAKE_CASE**: e.g. `"BRIDGE_UNKNOWN_OBJECT"`
/// - **Crate prefix**: `PATH_`, `ACCESS_`, `RESOLVE_`, `EVENT_`, `BRIDGE_`,
///   `TRANSPORT_`
/// - **Stable**: codes appear in log lines that operators grep for, so they
///   never change once released
///
/// # Recoverability
///
/// An error is recoverable when sending the same message again later may
/// succeed (for example the transport was not ready yet). Malformed paths,
/// type mismatches and unknown message kinds are not recoverable: the
/// remote side has to change what it sends.
pub trait ErrorCode {
    /// Returns a machine-readable error code.
    fn code(&self) -> &'static str;

    /// Returns whether retrying may succeed.
    fn is_recoverable(&self) -> bool;
}

/// Asserts that an error code follows the workspace conventions.
///
/// # Checks
///
/// 1. Code is not empty
/// 2. Code starts with `expected_prefix`
/// 3. Code is UPPER_SNAKE_CASE
///
/// # Panics
///
/// Panics with a descriptive message if any check fails. Intended for tests.
///
/// # Example
///
/// ```
/// use scenebridge_types::{assert_error_code, ErrorCode};
///
/// struct Stale;
///
/// impl ErrorCode for Stale {
///     fn code(&self) -> &'static str { "CACHE_STALE" }
///     fn is_recoverable(&self) -> bool { true }
/// }
///
/// assert_error_code(&Stale, "CACHE_");
/// ```
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "Error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "Error code '{}' must start with prefix '{}'",
        code,
        expected_prefix
    );
    assert!(
        is_upper_snake_case(code),
        "Error code '{}' must be UPPER_SNAKE_CASE",
        code
    );
}

/// Asserts the conventions for every error in `errors`.
///
/// Use this with a list containing one value per enum variant.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return false;
    }

    s.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    enum ProbeError {
        Transient,
        Permanent,
    }

    impl ErrorCode for ProbeError {
        fn code(&self) -> &'static str {
            match self {
                Self::Transient => "PROBE_TRANSIENT",
                Self::Permanent => "PROBE_PERMANENT",
            }
        }

        fn is_recoverable(&self) -> bool {
            matches!(self, Self::Transient)
        }
    }

    #[test]
    fn codes_and_recoverability() {
        assert_eq!(ProbeError::Transient.code(), "PROBE_TRANSIENT");
        assert!(ProbeError::Transient.is_recoverable());
        assert!(!ProbeError::Permanent.is_recoverable());
    }

    #[test]
    fn all_variants_pass_convention() {
        assert_error_codes(&[ProbeError::Transient, ProbeError::Permanent], "PROBE_");
    }

    #[test]
    #[should_panic(expected = "must start with prefix")]
    fn wrong_prefix_panics() {
        assert_error_code(&ProbeError::Transient, "BRIDGE_");
    }

    #[test]
    fn snake_case_detection() {
        assert!(is_upper_snake_case("BRIDGE_UNKNOWN_OBJECT"));
        assert!(is_upper_snake_case("PATH_42"));
        assert!(!is_upper_snake_case(""));
        assert!(!is_upper_snake_case("bridge"));
        assert!(!is_upper_snake_case("_BRIDGE"));
        assert!(!is_upper_snake_case("BRIDGE_"));
        assert!(!is_upper_snake_case("BRIDGE__X"));
    }
}
