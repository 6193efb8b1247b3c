//! Sidecar text <-> [`MetadataDescriptor`].
//!
//! The sidecar is a JSON object. Decoding accepts the empty-string "inherit"
//! convention on schema entries; encoding writes resolved types unless the
//! caller asks for the compact form. Unknown top-level keys are ignored.

use serde::Serialize;
use serde_json::Value;

use crate::common::error::{MetaError, MetaResult};
use crate::common::json;

use super::domain::MetadataDescriptor;
use super::schema::{ColumnSpec, Schema};
use super::value_type::ValueType;

const NUM_ROWS: &str = "numRows";
const NUM_COLS: &str = "numCols";
const VALUE_TYPE: &str = "valueType";
const NUM_NON_ZEROS: &str = "numNonZeros";
const SCHEMA: &str = "schema";
const LABEL: &str = "label";

/// Knobs for [`encode_with`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct EncodeOptions {
    /// Write `""` for entries that inherit the global type instead of the
    /// resolved token.
    pub compact_schema: bool,
}

/// Parse and validate sidecar text.
pub fn decode(text: &str) -> MetaResult<MetadataDescriptor> {
    let root: Value = serde_json::from_str(text).map_err(|err| {
        MetaError::malformed(
            format!("line {}, column {}", err.line(), err.column()),
            err.to_string(),
        )
    })?;
    let obj = json::as_object(&root, "<root>")?;

    let num_rows = json::require_u64(obj, NUM_ROWS, NUM_ROWS)?;
    let num_cols = json::require_u64(obj, NUM_COLS, NUM_COLS)?;
    let value_type = json::extract_string(obj, VALUE_TYPE, VALUE_TYPE)?
        .map(|token| ValueType::parse_token(token).map_err(|e| e.in_field(VALUE_TYPE)))
        .transpose()?;
    let num_non_zeros = json::extract_u64(obj, NUM_NON_ZEROS, NUM_NON_ZEROS)?;
    let schema = json::extract_array(obj, SCHEMA, SCHEMA)?
        .map(decode_schema)
        .transpose()?;

    let descriptor = MetadataDescriptor {
        num_rows,
        num_cols,
        value_type,
        num_non_zeros,
        schema,
    };
    descriptor.validate()?;
    Ok(descriptor)
}

fn decode_schema(items: &[Value]) -> MetaResult<Schema> {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let path = format!("{SCHEMA}[{idx}]");
            let entry = json::as_object(item, &path)?;
            let label_path = format!("{path}.{LABEL}");
            let type_path = format!("{path}.{VALUE_TYPE}");
            let label = json::require_string(entry, LABEL, &label_path)?;
            let token = json::require_string(entry, VALUE_TYPE, &type_path)?;
            let value_type = ValueType::parse_entry(token).map_err(|e| e.in_field(type_path))?;
            Ok(ColumnSpec {
                label: label.to_string(),
                value_type,
            })
        })
        .collect()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SidecarOut<'a> {
    num_rows: u64,
    num_cols: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    value_type: Option<ValueType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_non_zeros: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<Vec<EntryOut<'a>>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EntryOut<'a> {
    label: &'a str,
    value_type: &'static str,
}

/// Canonical sidecar text with every column type resolved.
pub fn encode(descriptor: &MetadataDescriptor) -> MetaResult<String> {
    encode_with(descriptor, EncodeOptions::default())
}

/// Encode with explicit options. Invalid descriptors are never written.
pub fn encode_with(descriptor: &MetadataDescriptor, opts: EncodeOptions) -> MetaResult<String> {
    descriptor.validate()?;

    let global = descriptor.value_type;
    let schema = descriptor
        .schema
        .as_ref()
        .map(|schema| {
            schema
                .entries()
                .iter()
                .enumerate()
                .map(|(index, entry)| {
                    let resolved = entry.resolve(index, global)?;
                    let value_type = if opts.compact_schema && entry.value_type.is_none() {
                        ""
                    } else {
                        resolved.as_str()
                    };
                    Ok(EntryOut {
                        label: &entry.label,
                        value_type,
                    })
                })
                .collect::<MetaResult<Vec<_>>>()
        })
        .transpose()?;

    let out = SidecarOut {
        num_rows: descriptor.num_rows,
        num_cols: descriptor.num_cols,
        value_type: global,
        num_non_zeros: descriptor.num_non_zeros,
        schema,
    };
    serde_json::to_string_pretty(&out).map_err(|err| MetaError::malformed("<encode>", err.to_string()))
}
