use crate::datatype::{DataType, Value};
use crate::errors::{FrameError, Result};
use crate::schema::Schema;

/// Per-field visitor driven by [`Row::visit`].
///
/// `start` is called once with the row's offset in the frame, then `accept`
/// once per field in schema order, then `done`. The value reference is
/// loaned for the duration of the call.
pub trait Fielder {
    fn start(&mut self, row_idx: usize);
    fn accept(&mut self, value: &Value);
    fn done(&mut self);
}

/// A schema-bound scratch record: one typed slot per column.
///
/// A row is allocated once and reused across many fill/visit cycles; its
/// contents are only meaningful between a fill and the next fill. Slots
/// start unset, and reading or visiting an unset slot is `IncompleteRow`.
#[derive(Debug, Clone)]
pub struct Row {
    types: Vec<DataType>,
    slots: Vec<Option<Value>>,
    idx: usize,
}

impl Row {
    /// Build a row following a schema's column types.
    pub fn new(schema: &Schema) -> Self {
        let types: Vec<_> = schema.column_types().collect();
        let slots = vec![None; types.len()];
        Row {
            types,
            slots,
            idx: 0,
        }
    }

    /// Number of fields.
    pub fn width(&self) -> usize {
        self.types.len()
    }

    /// Type of the field at `col`.
    pub fn col_type(&self, col: usize) -> Result<DataType> {
        self.types
            .get(col)
            .copied()
            .ok_or(FrameError::IndexOutOfRange {
                idx: col,
                len: self.types.len(),
            })
    }

    /// Position of this row within its frame when it was last filled.
    /// Informational only; never used for addressing.
    pub fn idx(&self) -> usize {
        self.idx
    }

    pub fn set_idx(&mut self, idx: usize) {
        self.idx = idx;
    }

    /// Set the slot at `col`, type-checked against the schema's column type.
    pub fn set(&mut self, col: usize, value: Value) -> Result<()> {
        let expected = self.col_type(col)?;
        let got = value.datatype();
        if got != expected {
            return Err(FrameError::TypeMismatch { expected, got });
        }
        self.slots[col] = Some(value);
        Ok(())
    }

    /// Get the slot at `col`. An unset slot is `IncompleteRow`.
    pub fn get(&self, col: usize) -> Result<&Value> {
        self.slots
            .get(col)
            .ok_or(FrameError::IndexOutOfRange {
                idx: col,
                len: self.slots.len(),
            })?
            .as_ref()
            .ok_or(FrameError::IncompleteRow { col })
    }

    pub fn get_int(&self, col: usize) -> Result<i64> {
        match self.get(col)? {
            Value::Int(v) => Ok(*v),
            other => Err(FrameError::TypeMismatch {
                expected: DataType::Int,
                got: other.datatype(),
            }),
        }
    }

    pub fn get_bool(&self, col: usize) -> Result<bool> {
        match self.get(col)? {
            Value::Bool(v) => Ok(*v),
            other => Err(FrameError::TypeMismatch {
                expected: DataType::Bool,
                got: other.datatype(),
            }),
        }
    }

    pub fn get_float(&self, col: usize) -> Result<f64> {
        match self.get(col)? {
            Value::Float(v) => Ok(*v),
            other => Err(FrameError::TypeMismatch {
                expected: DataType::Float,
                got: other.datatype(),
            }),
        }
    }

    /// Get a string slot. `Ok(None)` is an absent string, not a missing
    /// slot.
    pub fn get_string(&self, col: usize) -> Result<Option<&str>> {
        match self.get(col)? {
            Value::String(v) => Ok(v.as_deref()),
            other => Err(FrameError::TypeMismatch {
                expected: DataType::String,
                got: other.datatype(),
            }),
        }
    }

    /// Visit every field in schema order with the given fielder. Visiting
    /// with any slot unset is `IncompleteRow`.
    pub fn visit<F: Fielder>(&self, row_idx: usize, fielder: &mut F) -> Result<()> {
        for (col, slot) in self.slots.iter().enumerate() {
            if slot.is_none() {
                return Err(FrameError::IncompleteRow { col });
            }
        }

        fielder.start(row_idx);
        for value in self.slots.iter().flatten() {
            fielder.accept(value);
        }
        fielder.done();
        Ok(())
    }
}
