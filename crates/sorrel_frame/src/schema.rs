use crate::datatype::DataType;
use crate::errors::{FrameError, Result};
use std::sync::Arc;

/// A single column descriptor: its type and optional name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDesc {
    pub datatype: DataType,
    pub name: Option<Arc<str>>,
}

/// Describes a frame: ordered column descriptors plus optional row names.
///
/// Names, where present, are unique within their axis. Lookups by name
/// report `NameNotFound` on a miss rather than a sentinel index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<ColumnDesc>,
    row_names: Vec<Option<Arc<str>>>,
}

impl Schema {
    pub const fn new() -> Self {
        Schema {
            columns: Vec::new(),
            row_names: Vec::new(),
        }
    }

    /// Build a schema of unnamed columns from single-character type tags,
    /// e.g. `"IBFS"`.
    pub fn from_type_str(types: &str) -> Result<Self> {
        let mut schema = Schema::new();
        for c in types.chars() {
            let datatype = DataType::from_char(c).ok_or(FrameError::UnknownTypeTag(c))?;
            schema.add_column(datatype, None)?;
        }
        Ok(schema)
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows.
    pub fn length(&self) -> usize {
        self.row_names.len()
    }

    pub fn columns(&self) -> &[ColumnDesc] {
        &self.columns
    }

    /// Iterate column types in schema order.
    pub fn column_types(&self) -> impl Iterator<Item = DataType> + '_ {
        self.columns.iter().map(|desc| desc.datatype)
    }

    /// Append a column descriptor. A name colliding with an existing column
    /// name is `DuplicateName`.
    pub fn add_column(&mut self, datatype: DataType, name: Option<Arc<str>>) -> Result<()> {
        if let Some(name) = &name {
            if self.col_idx(name).is_ok() {
                return Err(FrameError::DuplicateName(name.to_string()));
            }
        }
        self.columns.push(ColumnDesc { datatype, name });
        Ok(())
    }

    /// Append a row-name slot. The name is optional; a duplicate is
    /// `DuplicateName`.
    pub fn add_row(&mut self, name: Option<Arc<str>>) -> Result<()> {
        if let Some(name) = &name {
            if self.row_idx(name).is_ok() {
                return Err(FrameError::DuplicateName(name.to_string()));
            }
        }
        self.row_names.push(name);
        Ok(())
    }

    pub fn col_type(&self, idx: usize) -> Result<DataType> {
        self.columns
            .get(idx)
            .map(|desc| desc.datatype)
            .ok_or(FrameError::IndexOutOfRange {
                idx,
                len: self.columns.len(),
            })
    }

    pub fn col_name(&self, idx: usize) -> Result<Option<&str>> {
        self.columns
            .get(idx)
            .map(|desc| desc.name.as_deref())
            .ok_or(FrameError::IndexOutOfRange {
                idx,
                len: self.columns.len(),
            })
    }

    pub fn row_name(&self, idx: usize) -> Result<Option<&str>> {
        self.row_names
            .get(idx)
            .map(|name| name.as_deref())
            .ok_or(FrameError::IndexOutOfRange {
                idx,
                len: self.row_names.len(),
            })
    }

    /// Index of the column with the given name.
    pub fn col_idx(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|desc| desc.name.as_deref() == Some(name))
            .ok_or_else(|| FrameError::NameNotFound(name.to_string()))
    }

    /// Index of the row with the given name.
    pub fn row_idx(&self, name: &str) -> Result<usize> {
        self.row_names
            .iter()
            .position(|n| n.as_deref() == Some(name))
            .ok_or_else(|| FrameError::NameNotFound(name.to_string()))
    }

    /// Derive a schema with identical column typing but no rows.
    pub fn without_rows(&self) -> Schema {
        Schema {
            columns: self.columns.clone(),
            row_names: Vec::new(),
        }
    }
}
