//! Closed set of element types and their textual tokens.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::common::error::{MetaError, MetaResult};

/// Element type of a matrix or of one frame column.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ValueType {
    SI8,
    SI32,
    SI64,
    UI8,
    UI32,
    UI64,
    F32,
    F64,
}

impl ValueType {
    /// Every member of the set, in canonical order.
    pub const ALL: [ValueType; 8] = [
        ValueType::SI8,
        ValueType::SI32,
        ValueType::SI64,
        ValueType::UI8,
        ValueType::UI32,
        ValueType::UI64,
        ValueType::F32,
        ValueType::F64,
    ];

    /// Parse a token, ignoring ASCII case. The empty string is rejected here;
    /// use [`ValueType::parse_entry`] where it means "inherit".
    pub fn parse_token(text: &str) -> MetaResult<Self> {
        let lower = text.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|vt| vt.as_str() == lower)
            .ok_or_else(|| MetaError::UnknownValueType {
                token: text.to_string(),
                field: None,
            })
    }

    /// Parse a schema-entry token where `""` is the unspecified sentinel.
    pub fn parse_entry(text: &str) -> MetaResult<Option<Self>> {
        if text.is_empty() {
            Ok(None)
        } else {
            Self::parse_token(text).map(Some)
        }
    }

    /// Canonical token for `text`, i.e. `format(parse(text))`.
    pub fn canonicalize(text: &str) -> MetaResult<&'static str> {
        Self::parse_token(text).map(|vt| vt.as_str())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::SI8 => "si8",
            ValueType::SI32 => "si32",
            ValueType::SI64 => "si64",
            ValueType::UI8 => "ui8",
            ValueType::UI32 => "ui32",
            ValueType::UI64 => "ui64",
            ValueType::F32 => "f32",
            ValueType::F64 => "f64",
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            ValueType::SI8 | ValueType::UI8 => 8,
            ValueType::SI32 | ValueType::UI32 | ValueType::F32 => 32,
            ValueType::SI64 | ValueType::UI64 | ValueType::F64 => 64,
        }
    }

    /// Width of one element in bytes.
    pub fn size_bytes(self) -> usize {
        (self.bits() / 8) as usize
    }

    pub fn is_float(self) -> bool {
        matches!(self, ValueType::F32 | ValueType::F64)
    }

    /// Floats count as signed.
    pub fn is_signed(self) -> bool {
        !matches!(self, ValueType::UI8 | ValueType::UI32 | ValueType::UI64)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = MetaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_token(s)
    }
}

impl Serialize for ValueType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
