//! Object layer errors.
//!
//! Three error families, one per stage of touching a scene object:
//!
//! | Stage | Error | Prefix |
//! |-------|-------|--------|
//! | Parse a path string | [`PathError`] | `PATH_` |
//! | Read / write / call a member | [`AccessError`] | `ACCESS_` |
//! | Walk a path over the graph | [`ResolveError`] | `RESOLVE_` |
//!
//! Only [`AccessError::Failed`] is recoverable: a method may fail because
//! of transient object state. Everything else requires the remote side to
//! send something different.

use scenebridge_types::ErrorCode;
use thiserror::Error;

/// A path string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// Leading, trailing or repeated `/`, or a prefix with no body.
    #[error("empty step at position {index}")]
    EmptyStep { index: usize },

    /// A `kind:` prefix that names no step kind.
    #[error("unknown step kind `{prefix}`")]
    UnknownKind { prefix: String },

    /// `index:` followed by something that is not an integer.
    #[error("invalid index `{token}`")]
    InvalidIndex { token: String },

    /// Parentheses or quotes do not balance.
    #[error("unbalanced parentheses or quotes in `{path}`")]
    Unbalanced { path: String },

    /// `!` on a step other than the last.
    #[error("`!` is only allowed on the last step (found at position {index})")]
    MisplacedIndirection { index: usize },

    /// A method argument list entry is empty or malformed.
    #[error("invalid argument `{token}` for method `{method}`")]
    InvalidArgument { method: String, token: String },
}

impl ErrorCode for PathError {
    fn code(&self) -> &'static str {
        match self {
            Self::EmptyStep { .. } => "PATH_EMPTY_STEP",
            Self::UnknownKind { .. } => "PATH_UNKNOWN_KIND",
            Self::InvalidIndex { .. } => "PATH_INVALID_INDEX",
            Self::Unbalanced { .. } => "PATH_UNBALANCED",
            Self::MisplacedIndirection { .. } => "PATH_MISPLACED_INDIRECTION",
            Self::InvalidArgument { .. } => "PATH_INVALID_ARGUMENT",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

/// A typed member access failed.
///
/// Produced by accessor tables and wire conversions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// The type has no property with this name.
    #[error("{type_name} has no member `{member}`")]
    UnknownMember { type_name: String, member: String },

    /// The type has no method with this name.
    #[error("{type_name} has no method `{method}`")]
    UnknownMethod { type_name: String, method: String },

    /// The property has no setter.
    #[error("{type_name}.{member} is read-only")]
    ReadOnly { type_name: String, member: String },

    /// A wire value could not be converted to the member's native type.
    #[error("cannot convert `{field}`: expected {expected}, got {actual}")]
    Conversion {
        field: String,
        expected: String,
        actual: String,
    },

    /// Wrong number or kind of method arguments.
    #[error("invalid arguments for `{method}`: {message}")]
    InvalidArguments { method: String, message: String },

    /// The method ran and reported failure.
    #[error("`{method}` failed: {message}")]
    Failed { method: String, message: String },
}

impl AccessError {
    /// Creates a [`Conversion`](Self::Conversion) error.
    #[must_use]
    pub fn conversion(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::Conversion {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates an [`InvalidArguments`](Self::InvalidArguments) error.
    #[must_use]
    pub fn invalid_arguments(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            method: method.into(),
            message: message.into(),
        }
    }
}

impl ErrorCode for AccessError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnknownMember { .. } => "ACCESS_UNKNOWN_MEMBER",
            Self::UnknownMethod { .. } => "ACCESS_UNKNOWN_METHOD",
            Self::ReadOnly { .. } => "ACCESS_READ_ONLY",
            Self::Conversion { .. } => "ACCESS_CONVERSION",
            Self::InvalidArguments { .. } => "ACCESS_INVALID_ARGUMENTS",
            Self::Failed { .. } => "ACCESS_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// A path could not be walked or written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The path string itself is malformed.
    #[error("path parse error: {0}")]
    Parse(#[from] PathError),

    /// A non-optional step found nothing.
    #[error("unresolved step {step} (`{segment}`): {reason}")]
    Unresolved {
        /// Zero-based step index.
        step: usize,
        /// The step as written.
        segment: String,
        /// What was missing.
        reason: String,
    },

    /// The resolved member rejected the wire value's kind.
    #[error("cannot convert `{field}`: expected {expected}, got {actual}")]
    Conversion {
        field: String,
        expected: String,
        actual: String,
    },

    /// The path resolved, but to something that cannot be assigned.
    #[error("`{path}` is not writable: {reason}")]
    NotWritable { path: String, reason: String },
}

impl ResolveError {
    /// Creates an [`Unresolved`](Self::Unresolved) error.
    #[must_use]
    pub fn unresolved(step: usize, segment: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unresolved {
            step,
            segment: segment.into(),
            reason: reason.into(),
        }
    }

    /// Creates a [`NotWritable`](Self::NotWritable) error.
    #[must_use]
    pub fn not_writable(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NotWritable {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl ErrorCode for ResolveError {
    fn code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "RESOLVE_PARSE",
            Self::Unresolved { .. } => "RESOLVE_UNRESOLVED",
            Self::Conversion { .. } => "RESOLVE_CONVERSION",
            Self::NotWritable { .. } => "RESOLVE_NOT_WRITABLE",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}
