//! Load, store and partition datasets around their sidecar metadata.

use std::io;
use std::path::Path;
use std::time::Instant;

use log::Level;

use crate::common::error::{MetaCode, MetaError, MetaResult};
use crate::common::log::log_event;
use crate::common::time;

use super::domain::{MetaRepo, MetadataDescriptor, ResolvedShape, TargetKind};
use super::shape;

const MODULE: &str = "data";

/// Upper bound on the worker count a single split may request.
pub const MAX_PARTITIONS: u64 = 1 << 16;

fn report<T>(event: &str, start: Instant, result: &MetaResult<T>) {
    let (level, code) = match result {
        Ok(_) => (Level::Debug, MetaCode::Ok),
        Err(err) => (Level::Warn, err.code()),
    };
    log_event(level, MODULE, event, code as u32, time::elapsed_ms(start));
}

/// Read, validate and resolve the sidecar of `data_path` for `kind`.
pub fn load_shape<R: MetaRepo>(repo: &R, data_path: &Path, kind: TargetKind) -> MetaResult<ResolvedShape> {
    let start = Instant::now();
    let result = if !repo.has_meta(data_path) && repo.has_body(data_path) {
        Err(MetaError::MissingMetadata {
            path: data_path.display().to_string(),
        })
    } else {
        repo.read_meta(data_path)
            .and_then(|descriptor| shape::resolve(&descriptor, kind))
    };
    report("load", start, &result);
    result
}

/// Persist a dataset: the body is written first, the sidecar only once the
/// body is complete, so a crash leaves a detectable body-without-metadata.
/// `write_body` receives the repository-resolved body path, the same one the
/// sidecar is placed next to.
pub fn store_dataset<R, F>(
    repo: &R,
    data_path: &Path,
    descriptor: &MetadataDescriptor,
    write_body: F,
) -> MetaResult<()>
where
    R: MetaRepo,
    F: FnOnce(&Path) -> io::Result<()>,
{
    let start = Instant::now();
    let body = repo.body_path(data_path);
    let result = descriptor
        .validate()
        .and_then(|_| write_body(&body).map_err(|err| MetaError::io(body.display().to_string(), &err)))
        .and_then(|_| repo.write_meta(data_path, descriptor));
    report("store", start, &result);
    result
}

/// Split a dataset row-wise into `parts` per-worker descriptors. Leading
/// partitions take the remainder rows; column typing is copied unchanged and
/// the nonzero hint is dropped because it cannot be apportioned.
///
/// `parts` may not exceed the row count (an empty dataset still yields one
/// partition) nor [`MAX_PARTITIONS`], so every partition but that one is
/// non-empty.
pub fn partition_rows(descriptor: &MetadataDescriptor, parts: u64) -> MetaResult<Vec<MetadataDescriptor>> {
    if parts == 0 {
        return Err(MetaError::InvalidRequest("cannot partition into zero parts".into()));
    }
    let limit = descriptor.num_rows.clamp(1, MAX_PARTITIONS);
    if parts > limit {
        return Err(MetaError::InvalidRequest(format!(
            "cannot partition {} rows into {parts} parts; at most {limit} allowed",
            descriptor.num_rows
        )));
    }
    descriptor.validate()?;

    let base = descriptor.num_rows / parts;
    let extra = descriptor.num_rows % parts;
    Ok((0..parts)
        .map(|idx| MetadataDescriptor {
            num_rows: base + u64::from(idx < extra),
            num_non_zeros: None,
            ..descriptor.clone()
        })
        .collect())
}
