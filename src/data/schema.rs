//! Per-column description of a heterogeneous frame.
//!
//! Labels are carried verbatim: empty and duplicate labels are legal. An entry
//! without its own type inherits the descriptor's global type at resolution
//! time; that rule is kept explicit here because it has to survive a text
//! round trip.

use crate::common::error::{MetaError, MetaResult};

use super::domain::ResolvedColumn;
use super::value_type::ValueType;

/// One schema entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColumnSpec {
    pub label: String,
    /// `None` means "inherit the descriptor's global type".
    pub value_type: Option<ValueType>,
}

impl ColumnSpec {
    pub fn new(label: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            label: label.into(),
            value_type: Some(value_type),
        }
    }

    /// Entry whose type comes from the descriptor default.
    pub fn inherited(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value_type: None,
        }
    }

    /// Own type if specified, else `global`, else an error naming column `index`.
    pub fn resolve(&self, index: usize, global: Option<ValueType>) -> MetaResult<ValueType> {
        self.value_type
            .or(global)
            .ok_or_else(|| MetaError::UnresolvedColumnType {
                index,
                label: self.label.clone(),
            })
    }
}

/// Ordered column descriptions, one per column.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Schema {
    entries: Vec<ColumnSpec>,
}

impl Schema {
    pub fn new(entries: Vec<ColumnSpec>) -> Self {
        Self { entries }
    }

    /// Schema of `num_cols` unlabeled entries that all inherit the global type.
    pub fn uniform(num_cols: usize) -> Self {
        Self {
            entries: (0..num_cols).map(|_| ColumnSpec::inherited("")).collect(),
        }
    }

    pub fn entries(&self) -> &[ColumnSpec] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn validate(&self, num_cols: u64) -> MetaResult<()> {
        if self.entries.len() as u64 != num_cols {
            return Err(MetaError::SchemaLengthMismatch {
                expected: num_cols,
                found: self.entries.len(),
            });
        }
        Ok(())
    }

    /// Resolve every entry in order; stops at the first unresolved column.
    pub fn resolve_all(&self, global: Option<ValueType>) -> MetaResult<Vec<ResolvedColumn>> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                entry.resolve(index, global).map(|value_type| ResolvedColumn {
                    label: entry.label.clone(),
                    value_type,
                })
            })
            .collect()
    }
}

impl From<Vec<ColumnSpec>> for Schema {
    fn from(entries: Vec<ColumnSpec>) -> Self {
        Self::new(entries)
    }
}

impl FromIterator<ColumnSpec> for Schema {
    fn from_iter<I: IntoIterator<Item = ColumnSpec>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_must_match_for_every_count() {
        let schema = Schema::new(vec![ColumnSpec::new("a", ValueType::F64)]);
        assert!(schema.validate(1).is_ok());
        for cols in [0u64, 2, 3] {
            assert!(matches!(
                schema.validate(cols),
                Err(MetaError::SchemaLengthMismatch { found: 1, .. })
            ));
        }
        assert!(Schema::default().validate(0).is_ok());
        assert!(Schema::default().validate(1).is_err());
    }

    #[test]
    fn own_type_wins_over_global() {
        let entry = ColumnSpec::new("x", ValueType::UI8);
        assert_eq!(entry.resolve(0, Some(ValueType::F64)).unwrap(), ValueType::UI8);
    }

    #[test]
    fn inherits_or_fails() {
        let entry = ColumnSpec::inherited("y");
        assert_eq!(entry.resolve(2, Some(ValueType::F32)).unwrap(), ValueType::F32);
        let err = entry.resolve(2, None).unwrap_err();
        assert_eq!(
            err,
            MetaError::UnresolvedColumnType {
                index: 2,
                label: "y".into()
            }
        );
    }

    #[test]
    fn labels_pass_through_verbatim() {
        let schema: Schema = vec![
            ColumnSpec::new("", ValueType::SI8),
            ColumnSpec::new("dup", ValueType::SI8),
            ColumnSpec::inherited("dup"),
        ]
        .into();
        let cols = schema.resolve_all(Some(ValueType::F64)).unwrap();
        let labels: Vec<&str> = cols.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["", "dup", "dup"]);
        assert_eq!(cols[2].value_type, ValueType::F64);
    }
}
