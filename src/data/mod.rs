//! Data domain: sidecar metadata decode, validation, resolution and persistence.

pub mod codec;
pub mod domain;
pub mod repo_fs;
pub mod schema;
pub mod service;
pub mod shape;
pub mod value_type;

pub use domain::{MetaRepo, MetadataDescriptor, ResolvedColumn, ResolvedShape, TargetKind};
pub use repo_fs::FsMetaRepo;
pub use schema::{ColumnSpec, Schema};
pub use value_type::ValueType;
