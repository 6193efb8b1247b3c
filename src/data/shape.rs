//! Reconcile a descriptor with the container kind the caller wants to build.
//!
//! Types come only from the descriptor, never from the data body.

use crate::common::error::{MetaError, MetaResult};

use super::domain::{MetadataDescriptor, ResolvedColumn, ResolvedShape, TargetKind};
use super::schema::Schema;
use super::value_type::ValueType;

/// Largest column count the resolver will materialise per-column entries for.
pub const MAX_RESOLVED_COLUMNS: u64 = 1 << 24;

/// Produce the instantiation parameters for `kind`.
pub fn resolve(descriptor: &MetadataDescriptor, kind: TargetKind) -> MetaResult<ResolvedShape> {
    match kind {
        TargetKind::Homogeneous => resolve_homogeneous(descriptor),
        TargetKind::Heterogeneous => resolve_heterogeneous(descriptor),
    }
}

fn mismatch(reason: impl Into<String>) -> MetaError {
    MetaError::KindMismatch {
        requested: TargetKind::Homogeneous,
        reason: reason.into(),
    }
}

/// The one element type a homogeneous target can use.
fn single_type(descriptor: &MetadataDescriptor) -> MetaResult<ValueType> {
    let Some(schema) = &descriptor.schema else {
        return descriptor
            .value_type
            .ok_or_else(|| mismatch("descriptor carries no element type"));
    };

    let resolved = schema.resolve_all(descriptor.value_type)?;
    let expected = match (descriptor.value_type, resolved.first()) {
        (Some(global), _) => global,
        (None, Some(first)) => first.value_type,
        (None, None) => return Err(mismatch("empty schema and no global valueType")),
    };
    match resolved.iter().position(|c| c.value_type != expected) {
        Some(index) => Err(mismatch(format!(
            "column {index} (`{}`) is {} but the matrix element type is {expected}",
            resolved[index].label, resolved[index].value_type
        ))),
        None => Ok(expected),
    }
}

/// Column count as a bounded `usize`, checked before anything is allocated.
fn column_count(descriptor: &MetadataDescriptor) -> MetaResult<usize> {
    let too_many = || {
        MetaError::InvalidRequest(format!(
            "numCols {} exceeds the addressable column limit of {MAX_RESOLVED_COLUMNS}",
            descriptor.num_cols
        ))
    };
    if descriptor.num_cols > MAX_RESOLVED_COLUMNS {
        return Err(too_many());
    }
    usize::try_from(descriptor.num_cols).map_err(|_| too_many())
}

fn resolve_homogeneous(descriptor: &MetadataDescriptor) -> MetaResult<ResolvedShape> {
    let num_cols = column_count(descriptor)?;
    let value_type = single_type(descriptor)?;
    let columns = (0..num_cols)
        .map(|_| ResolvedColumn {
            label: String::new(),
            value_type,
        })
        .collect();
    Ok(ResolvedShape {
        kind: TargetKind::Homogeneous,
        num_rows: descriptor.num_rows,
        num_cols: descriptor.num_cols,
        value_type: Some(value_type),
        columns,
        num_non_zeros: descriptor.num_non_zeros,
    })
}

fn resolve_heterogeneous(descriptor: &MetadataDescriptor) -> MetaResult<ResolvedShape> {
    let synthesized;
    let schema = match &descriptor.schema {
        Some(schema) => schema,
        None => {
            synthesized = Schema::uniform(column_count(descriptor)?);
            &synthesized
        }
    };
    schema.validate(descriptor.num_cols)?;
    let columns = schema.resolve_all(descriptor.value_type)?;

    if let Some(nnz) = descriptor.num_non_zeros {
        log::warn!(
            target: "sidecar",
            "numNonZeros={nnz} is not meaningful for a frame and is ignored"
        );
    }

    Ok(ResolvedShape {
        kind: TargetKind::Heterogeneous,
        num_rows: descriptor.num_rows,
        num_cols: descriptor.num_cols,
        value_type: None,
        columns,
        num_non_zeros: None,
    })
}
