//! Core metadata definitions and contracts.
//!
//! A [`MetadataDescriptor`] is the parsed form of one sidecar file. It moves
//! through decode, validation and resolution exactly once; a failure at any
//! step ends the load or store for that dataset.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::common::error::{Invariant, MetaError, MetaResult};

use super::schema::{ColumnSpec, Schema};
use super::value_type::ValueType;

/// What the calling container expects to build.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// Dense or sparse matrix, one element type throughout.
    Homogeneous,
    /// Labeled frame, one type per column.
    Heterogeneous,
}

impl TargetKind {
    /// Numeric form used across the FFI boundary.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(TargetKind::Homogeneous),
            1 => Some(TargetKind::Heterogeneous),
            _ => None,
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Homogeneous => f.write_str("homogeneous"),
            TargetKind::Heterogeneous => f.write_str("heterogeneous"),
        }
    }
}

/// Sidecar metadata for one dataset.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MetadataDescriptor {
    pub num_rows: u64,
    pub num_cols: u64,
    /// Global element type; default for schema entries without their own.
    pub value_type: Option<ValueType>,
    /// Nonzero-count hint for sparse reconstruction.
    pub num_non_zeros: Option<u64>,
    pub schema: Option<Schema>,
}

impl MetadataDescriptor {
    /// Descriptor for a matrix with one element type.
    pub fn homogeneous(
        num_rows: u64,
        num_cols: u64,
        value_type: ValueType,
        num_non_zeros: Option<u64>,
    ) -> Self {
        Self {
            num_rows,
            num_cols,
            value_type: Some(value_type),
            num_non_zeros,
            schema: None,
        }
    }

    /// Descriptor for a frame; the column count follows the schema.
    pub fn heterogeneous(num_rows: u64, value_type: Option<ValueType>, schema: Schema) -> Self {
        Self {
            num_rows,
            num_cols: schema.len() as u64,
            value_type,
            num_non_zeros: None,
            schema: Some(schema),
        }
    }

    /// Total cell count; widened so huge shapes cannot overflow.
    pub fn cells(&self) -> u128 {
        u128::from(self.num_rows) * u128::from(self.num_cols)
    }

    /// Check every descriptor invariant in one pass. Row and column counts
    /// are unsigned, so non-negativity holds by construction.
    pub fn validate(&self) -> MetaResult<()> {
        match &self.schema {
            Some(schema) => {
                schema.validate(self.num_cols)?;
                for (index, entry) in schema.entries().iter().enumerate() {
                    entry.resolve(index, self.value_type)?;
                }
            }
            None if self.value_type.is_none() => {
                return Err(MetaError::invalid(
                    Invariant::GlobalTypeRequired,
                    "valueType is required when no schema is given",
                ));
            }
            None => {}
        }

        if let Some(nnz) = self.num_non_zeros {
            if u128::from(nnz) > self.cells() {
                return Err(MetaError::invalid(
                    Invariant::NonZerosWithinCells,
                    format!(
                        "numNonZeros {nnz} exceeds numRows * numCols = {}",
                        self.cells()
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// One column after type resolution.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ResolvedColumn {
    pub label: String,
    #[serde(rename = "valueType")]
    pub value_type: ValueType,
}

/// Fully type-resolved dimensions handed to container construction.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedShape {
    pub kind: TargetKind,
    pub num_rows: u64,
    pub num_cols: u64,
    /// The single element type of a homogeneous shape.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    /// One entry per column; labels are empty for homogeneous shapes.
    pub columns: Vec<ResolvedColumn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_non_zeros: Option<u64>,
}

impl ResolvedShape {
    pub fn value_types(&self) -> Vec<ValueType> {
        self.columns.iter().map(|c| c.value_type).collect()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.label.as_str()).collect()
    }

    /// Bytes per row when every element is stored at its native width.
    pub fn row_bytes(&self) -> usize {
        self.columns.iter().map(|c| c.value_type.size_bytes()).sum()
    }
}

/// Store path: turn a container's runtime shape back into a descriptor.
/// Columns always carry their concrete type. A shape that cannot be written
/// as a valid sidecar is rejected here rather than at encode time.
impl TryFrom<&ResolvedShape> for MetadataDescriptor {
    type Error = MetaError;

    fn try_from(shape: &ResolvedShape) -> MetaResult<Self> {
        let descriptor = match shape.kind {
            TargetKind::Homogeneous => Self {
                num_rows: shape.num_rows,
                num_cols: shape.num_cols,
                value_type: shape
                    .value_type
                    .or_else(|| shape.columns.first().map(|c| c.value_type)),
                num_non_zeros: shape.num_non_zeros,
                schema: None,
            },
            TargetKind::Heterogeneous => Self {
                num_rows: shape.num_rows,
                num_cols: shape.num_cols,
                value_type: None,
                num_non_zeros: None,
                schema: Some(
                    shape
                        .columns
                        .iter()
                        .map(|c| ColumnSpec::new(c.label.clone(), c.value_type))
                        .collect(),
                ),
            },
        };
        descriptor.validate()?;
        Ok(descriptor)
    }
}

/// Repository contract for sidecar persistence next to a data body.
pub trait MetaRepo {
    /// Where the data body for `data_path` actually lives.
    fn body_path(&self, data_path: &Path) -> PathBuf;
    fn has_meta(&self, data_path: &Path) -> bool;
    fn read_meta(&self, data_path: &Path) -> MetaResult<MetadataDescriptor>;
    fn write_meta(&self, data_path: &Path, descriptor: &MetadataDescriptor) -> MetaResult<()>;
    /// Whether the data body itself exists.
    fn has_body(&self, data_path: &Path) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(num_cols: u64, global: Option<ValueType>, entries: Vec<ColumnSpec>) -> MetadataDescriptor {
        MetadataDescriptor {
            num_rows: 4,
            num_cols,
            value_type: global,
            num_non_zeros: None,
            schema: Some(Schema::new(entries)),
        }
    }

    #[test]
    fn global_type_required_without_schema() {
        let d = MetadataDescriptor {
            num_rows: 1,
            num_cols: 1,
            value_type: None,
            num_non_zeros: None,
            schema: None,
        };
        let err = d.validate().unwrap_err();
        assert!(matches!(
            err,
            MetaError::InvalidDescriptor {
                invariant: Invariant::GlobalTypeRequired,
                ..
            }
        ));
        assert_eq!(err.field(), Some("valueType"));
    }

    #[test]
    fn schema_length_checked_including_zero_cols() {
        let d = frame(0, None, vec![ColumnSpec::new("a", ValueType::F64)]);
        assert!(matches!(
            d.validate(),
            Err(MetaError::SchemaLengthMismatch { expected: 0, found: 1 })
        ));
        let d = frame(3, None, vec![ColumnSpec::new("a", ValueType::F64)]);
        assert!(matches!(
            d.validate(),
            Err(MetaError::SchemaLengthMismatch { expected: 3, found: 1 })
        ));
        assert!(frame(0, None, vec![]).validate().is_ok());
    }

    #[test]
    fn every_entry_must_resolve() {
        let d = frame(
            2,
            None,
            vec![ColumnSpec::new("a", ValueType::SI8), ColumnSpec::inherited("b")],
        );
        assert!(matches!(
            d.validate(),
            Err(MetaError::UnresolvedColumnType { index: 1, .. })
        ));
        let d = frame(
            2,
            Some(ValueType::SI32),
            vec![ColumnSpec::new("a", ValueType::SI8), ColumnSpec::inherited("b")],
        );
        assert!(d.validate().is_ok());
    }

    #[test]
    fn non_zero_bound_is_inclusive() {
        let dense = MetadataDescriptor::homogeneous(3, 5, ValueType::F64, Some(15));
        assert!(dense.validate().is_ok());
        let empty = MetadataDescriptor::homogeneous(3, 5, ValueType::F64, Some(0));
        assert!(empty.validate().is_ok());
        let over = MetadataDescriptor::homogeneous(3, 5, ValueType::F64, Some(16));
        let err = over.validate().unwrap_err();
        assert!(matches!(
            err,
            MetaError::InvalidDescriptor {
                invariant: Invariant::NonZerosWithinCells,
                ..
            }
        ));
        assert!(MetadataDescriptor::homogeneous(0, 7, ValueType::F64, Some(1))
            .validate()
            .is_err());
    }

    #[test]
    fn huge_shapes_do_not_overflow() {
        let d = MetadataDescriptor::homogeneous(u64::MAX, u64::MAX, ValueType::UI8, Some(u64::MAX));
        assert!(d.validate().is_ok());
    }

    #[test]
    fn validation_does_not_mutate() {
        let d = frame(1, Some(ValueType::F32), vec![ColumnSpec::inherited("a")]);
        let before = d.clone();
        d.validate().unwrap();
        assert_eq!(d, before);
        assert_eq!(d.schema.unwrap().entries()[0].value_type, None);
    }

    #[test]
    fn shape_back_to_descriptor() {
        let shape = ResolvedShape {
            kind: TargetKind::Heterogeneous,
            num_rows: 2,
            num_cols: 2,
            value_type: None,
            columns: vec![
                ResolvedColumn {
                    label: "foo".into(),
                    value_type: ValueType::SI64,
                },
                ResolvedColumn {
                    label: "bar".into(),
                    value_type: ValueType::F64,
                },
            ],
            num_non_zeros: None,
        };
        let d = MetadataDescriptor::try_from(&shape).unwrap();
        assert_eq!(d.value_type, None);
        assert_eq!(d.schema.as_ref().map(Schema::len), Some(2));
        assert_eq!(shape.row_bytes(), 16);
    }

    #[test]
    fn unwritable_shapes_are_rejected() {
        let untyped = ResolvedShape {
            kind: TargetKind::Homogeneous,
            num_rows: 3,
            num_cols: 0,
            value_type: None,
            columns: vec![],
            num_non_zeros: None,
        };
        assert!(matches!(
            MetadataDescriptor::try_from(&untyped),
            Err(MetaError::InvalidDescriptor {
                invariant: Invariant::GlobalTypeRequired,
                ..
            })
        ));

        let dense_overflow = ResolvedShape {
            kind: TargetKind::Homogeneous,
            num_rows: 2,
            num_cols: 2,
            value_type: Some(ValueType::F64),
            columns: vec![],
            num_non_zeros: Some(5),
        };
        assert!(MetadataDescriptor::try_from(&dense_overflow).is_err());

        let short_frame = ResolvedShape {
            kind: TargetKind::Heterogeneous,
            num_rows: 1,
            num_cols: 2,
            value_type: None,
            columns: vec![ResolvedColumn {
                label: "only".into(),
                value_type: ValueType::UI32,
            }],
            num_non_zeros: None,
        };
        assert!(matches!(
            MetadataDescriptor::try_from(&short_frame),
            Err(MetaError::SchemaLengthMismatch { expected: 2, found: 1 })
        ));
    }
}
