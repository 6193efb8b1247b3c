//! Error handling primitives shared across the core.
//!
//! Every failure is a typed [`MetaError`]; callers on the other side of the
//! FFI boundary only ever see the stable [`MetaCode`] plus the rendered reason.

use std::fmt;

use thiserror::Error;

use crate::data::domain::TargetKind;

/// Stable error codes that cross the FFI boundary.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MetaCode {
    /// Success code used as a sentinel.
    Ok = 0,
    /// The sidecar text could not be decoded structurally.
    MalformedMetadata = 1,
    /// A descriptor invariant failed.
    InvalidDescriptor = 2,
    /// A value type token outside the closed set.
    UnknownValueType = 3,
    /// Schema length differs from the column count.
    SchemaLengthMismatch = 4,
    /// A column has neither its own nor an inherited type.
    UnresolvedColumnType = 5,
    /// Descriptor shape is incompatible with the requested target.
    KindMismatch = 6,
    /// Body exists but its sidecar does not.
    MissingMetadata = 7,
    /// File system failure on the load/store path.
    Io = 8,
    /// Caller misuse of an API.
    InvalidRequest = 9,
    /// A result could not cross the FFI boundary.
    Internal = 10,
}

/// Descriptor invariant that failed validation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Invariant {
    /// Without a schema, the global `valueType` must be present.
    GlobalTypeRequired,
    /// `numNonZeros` must lie within `[0, numRows * numCols]`.
    NonZerosWithinCells,
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invariant::GlobalTypeRequired => f.write_str("global-type-required"),
            Invariant::NonZerosWithinCells => f.write_str("non-zeros-within-cells"),
        }
    }
}

/// Canonical error type for the core.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum MetaError {
    #[error("malformed metadata at {location}: {reason}")]
    MalformedMetadata { location: String, reason: String },

    #[error("invalid descriptor ({invariant}): {reason}")]
    InvalidDescriptor { invariant: Invariant, reason: String },

    #[error("unknown value type `{token}`{}", field_suffix(.field))]
    UnknownValueType { token: String, field: Option<String> },

    #[error("schema has {found} entries but numCols is {expected}")]
    SchemaLengthMismatch { expected: u64, found: usize },

    #[error("column {index} (`{label}`) has no value type and no global valueType to inherit")]
    UnresolvedColumnType { index: usize, label: String },

    #[error("cannot resolve as {requested}: {reason}")]
    KindMismatch { requested: TargetKind, reason: String },

    #[error("metadata file missing for `{path}` (body present)")]
    MissingMetadata { path: String },

    #[error("io error on `{path}`: {reason}")]
    Io { path: String, reason: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

fn field_suffix(field: &Option<String>) -> String {
    match field {
        Some(name) => format!(" in field `{name}`"),
        None => String::new(),
    }
}

/// Result alias used throughout the crate.
pub type MetaResult<T> = Result<T, MetaError>;

impl MetaError {
    /// Structural decode failure at `location` (a JSON position or field path).
    pub fn malformed(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedMetadata {
            location: location.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid(invariant: Invariant, reason: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            invariant,
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<String>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    /// Attach the originating field to an `UnknownValueType` error.
    pub fn in_field(self, name: impl Into<String>) -> Self {
        match self {
            Self::UnknownValueType { token, .. } => Self::UnknownValueType {
                token,
                field: Some(name.into()),
            },
            other => other,
        }
    }

    /// Stable code for this error.
    pub fn code(&self) -> MetaCode {
        match self {
            Self::MalformedMetadata { .. } => MetaCode::MalformedMetadata,
            Self::InvalidDescriptor { .. } => MetaCode::InvalidDescriptor,
            Self::UnknownValueType { .. } => MetaCode::UnknownValueType,
            Self::SchemaLengthMismatch { .. } => MetaCode::SchemaLengthMismatch,
            Self::UnresolvedColumnType { .. } => MetaCode::UnresolvedColumnType,
            Self::KindMismatch { .. } => MetaCode::KindMismatch,
            Self::MissingMetadata { .. } => MetaCode::MissingMetadata,
            Self::Io { .. } => MetaCode::Io,
            Self::InvalidRequest(_) => MetaCode::InvalidRequest,
        }
    }

    /// Stable textual tag, used in FFI envelopes and log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedMetadata { .. } => "MalformedMetadata",
            Self::InvalidDescriptor { .. } => "InvalidDescriptor",
            Self::UnknownValueType { .. } => "UnknownValueType",
            Self::SchemaLengthMismatch { .. } => "SchemaLengthMismatch",
            Self::UnresolvedColumnType { .. } => "UnresolvedColumnType",
            Self::KindMismatch { .. } => "KindMismatch",
            Self::MissingMetadata { .. } => "MissingMetadata",
            Self::Io { .. } => "Io",
            Self::InvalidRequest(_) => "InvalidRequest",
        }
    }

    /// Name of the sidecar field the error originated from, when known.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::UnknownValueType { field, .. } => field.as_deref(),
            Self::SchemaLengthMismatch { .. } | Self::UnresolvedColumnType { .. } => Some("schema"),
            Self::InvalidDescriptor { invariant, .. } => Some(match invariant {
                Invariant::GlobalTypeRequired => "valueType",
                Invariant::NonZerosWithinCells => "numNonZeros",
            }),
            Self::MalformedMetadata { location, .. }
                if !location.starts_with("line ") && !location.starts_with('<') =>
            {
                Some(location.as_str())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(MetaCode::Ok as u32, 0);
        assert_eq!(MetaCode::MalformedMetadata as u32, 1);
        assert_eq!(MetaCode::InvalidDescriptor as u32, 2);
        assert_eq!(MetaCode::UnknownValueType as u32, 3);
        assert_eq!(MetaCode::SchemaLengthMismatch as u32, 4);
        assert_eq!(MetaCode::UnresolvedColumnType as u32, 5);
        assert_eq!(MetaCode::KindMismatch as u32, 6);
        assert_eq!(MetaCode::MissingMetadata as u32, 7);
        assert_eq!(MetaCode::Io as u32, 8);
        assert_eq!(MetaCode::InvalidRequest as u32, 9);
        assert_eq!(MetaCode::Internal as u32, 10);
    }

    #[test]
    fn unknown_type_reports_field() {
        let err = MetaError::UnknownValueType {
            token: "i16".into(),
            field: None,
        }
        .in_field("schema[1].valueType");
        assert_eq!(err.field(), Some("schema[1].valueType"));
        assert_eq!(
            err.to_string(),
            "unknown value type `i16` in field `schema[1].valueType`"
        );
    }

    #[test]
    fn json_positions_are_not_fields() {
        let err = MetaError::malformed("line 1, column 4", "expected value");
        assert_eq!(err.field(), None);
        assert_eq!(MetaError::malformed("<root>", "expected an object").field(), None);
        let err = MetaError::malformed("numRows", "missing required field");
        assert_eq!(err.field(), Some("numRows"));
    }
}
