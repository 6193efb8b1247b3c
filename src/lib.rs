// lib.rs - sidecar metadata core
pub mod api;
pub mod common;
pub mod data;

pub use common::error::{MetaCode, MetaError, MetaResult};
pub use data::codec::{decode, encode, encode_with, EncodeOptions};
pub use data::domain::{MetadataDescriptor, ResolvedColumn, ResolvedShape, TargetKind};
pub use data::schema::{ColumnSpec, Schema};
pub use data::shape::resolve;
pub use data::value_type::ValueType;
