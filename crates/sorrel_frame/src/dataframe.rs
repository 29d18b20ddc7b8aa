use crate::column::Column;
use crate::datatype::{DataType, Value};
use crate::errors::{FrameError, Result};
use crate::parallel;
use crate::row::Row;
use crate::rower::Rower;
use crate::schema::Schema;
use std::sync::Arc;

/// A table of equal-length typed columns described by a schema.
///
/// Columns are read-only shared state during any traversal; rowers that
/// need to produce output accumulate it in their own state or go through
/// [`filter`](Self::filter).
#[derive(Debug, Clone, Default)]
pub struct DataFrame {
    schema: Schema,
    columns: Vec<Column>,
}

impl DataFrame {
    /// Create a frame with empty columns matching the schema's column
    /// descriptors. Row names carried by the schema are dropped; a new
    /// frame starts with zero rows.
    pub fn from_schema(schema: &Schema) -> Self {
        let schema = schema.without_rows();
        let columns = schema
            .columns()
            .iter()
            .map(|desc| {
                let mut col = Column::empty(desc.datatype);
                col.set_name(desc.name.clone());
                col
            })
            .collect();
        DataFrame { schema, columns }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows. A frame with no columns reports the schema's
    /// row-name count, allowing rows without any column data.
    pub fn nrows(&self) -> usize {
        match self.columns.first() {
            Some(col) => col.len(),
            None => self.schema.length(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, col: usize) -> Result<&Column> {
        self.columns.get(col).ok_or(FrameError::IndexOutOfRange {
            idx: col,
            len: self.columns.len(),
        })
    }

    /// Append a column. Its length must match the current row count unless
    /// the frame is still empty, and its type and name are recorded in the
    /// schema.
    pub fn add_column(&mut self, mut column: Column, name: Option<Arc<str>>) -> Result<()> {
        let fresh = self.columns.is_empty() && self.schema.length() == 0;
        if !fresh && column.len() != self.nrows() {
            return Err(FrameError::LengthMismatch {
                expected: self.nrows(),
                got: column.len(),
            });
        }
        self.schema.add_column(column.datatype(), name.clone())?;
        column.set_name(name);
        self.columns.push(column);
        Ok(())
    }

    /// Column offset for a name.
    pub fn col_idx(&self, name: &str) -> Result<usize> {
        self.schema.col_idx(name)
    }

    /// Row offset for a name.
    pub fn row_idx(&self, name: &str) -> Result<usize> {
        self.schema.row_idx(name)
    }

    /// Get the cell at (`col`, `row`) as a tagged value.
    pub fn value(&self, col: usize, row: usize) -> Result<Value> {
        self.column(col)?.value(row)
    }

    pub fn get_int(&self, col: usize, row: usize) -> Result<i64> {
        match self.value(col, row)? {
            Value::Int(v) => Ok(v),
            other => Err(FrameError::TypeMismatch {
                expected: DataType::Int,
                got: other.datatype(),
            }),
        }
    }

    pub fn get_bool(&self, col: usize, row: usize) -> Result<bool> {
        match self.value(col, row)? {
            Value::Bool(v) => Ok(v),
            other => Err(FrameError::TypeMismatch {
                expected: DataType::Bool,
                got: other.datatype(),
            }),
        }
    }

    pub fn get_float(&self, col: usize, row: usize) -> Result<f64> {
        match self.value(col, row)? {
            Value::Float(v) => Ok(v),
            other => Err(FrameError::TypeMismatch {
                expected: DataType::Float,
                got: other.datatype(),
            }),
        }
    }

    /// Get a string cell. `Ok(None)` is an absent string.
    pub fn get_string(&self, col: usize, row: usize) -> Result<Option<Arc<str>>> {
        match self.value(col, row)? {
            Value::String(v) => Ok(v),
            other => Err(FrameError::TypeMismatch {
                expected: DataType::String,
                got: other.datatype(),
            }),
        }
    }

    /// Set the cell at (`col`, `row`). The row must already exist; growing
    /// the frame goes through [`add_row`](Self::add_row) so columns stay
    /// equal length.
    pub fn set(&mut self, col: usize, row: usize, value: Value) -> Result<()> {
        let nrows = self.nrows();
        if row >= nrows {
            return Err(FrameError::IndexOutOfRange {
                idx: row,
                len: nrows,
            });
        }
        let ncols = self.columns.len();
        let column = self
            .columns
            .get_mut(col)
            .ok_or(FrameError::IndexOutOfRange {
                idx: col,
                len: ncols,
            })?;
        column.set_value(row, value)
    }

    /// Fill `row`'s slots with the values at row offset `idx`.
    pub fn fill_row(&self, idx: usize, row: &mut Row) -> Result<()> {
        if idx >= self.nrows() {
            return Err(FrameError::IndexOutOfRange {
                idx,
                len: self.nrows(),
            });
        }
        if row.width() != self.ncols() {
            return Err(FrameError::LengthMismatch {
                expected: self.ncols(),
                got: row.width(),
            });
        }
        for (col, column) in self.columns.iter().enumerate() {
            row.set(col, column.value(idx)?)?;
        }
        row.set_idx(idx);
        Ok(())
    }

    /// Append a filled row without a row name.
    pub fn add_row(&mut self, row: &Row) -> Result<()> {
        self.add_row_inner(row, None)
    }

    /// Append a filled row with a row name.
    pub fn add_named_row(&mut self, row: &Row, name: Arc<str>) -> Result<()> {
        self.add_row_inner(row, Some(name))
    }

    fn add_row_inner(&mut self, row: &Row, name: Option<Arc<str>>) -> Result<()> {
        if row.width() != self.ncols() {
            return Err(FrameError::LengthMismatch {
                expected: self.ncols(),
                got: row.width(),
            });
        }
        // Validate every slot before mutating anything so the schema's
        // row-name list and the column lengths move together.
        for col in 0..row.width() {
            let value = row.get(col)?;
            let expected = self.schema.col_type(col)?;
            if value.datatype() != expected {
                return Err(FrameError::TypeMismatch {
                    expected,
                    got: value.datatype(),
                });
            }
        }
        self.schema.add_row(name)?;
        for (col, column) in self.columns.iter_mut().enumerate() {
            column.push_value(row.get(col)?.clone())?;
        }
        Ok(())
    }

    /// Visit rows 0..nrows in order. The rower's returned bool is ignored.
    pub fn map<R: Rower>(&self, rower: &mut R) -> Result<()> {
        let mut row = Row::new(&self.schema);
        for idx in 0..self.nrows() {
            self.fill_row(idx, &mut row)?;
            rower.accept(&row)?;
        }
        Ok(())
    }

    /// Build a new frame from the rows the rower accepts, preserving source
    /// order. The result shares this frame's column typing, starts with
    /// zero rows, and carries no row names.
    pub fn filter<R: Rower>(&self, rower: &mut R) -> Result<DataFrame> {
        let mut out = DataFrame::from_schema(&self.schema);
        let mut row = Row::new(&self.schema);
        for idx in 0..self.nrows() {
            self.fill_row(idx, &mut row)?;
            if rower.accept(&row)? {
                out.add_row(&row)?;
            }
        }
        Ok(out)
    }

    /// Parallel `map`: rows are partitioned into contiguous slices, one
    /// worker per slice, and the split-off rowers are joined back into
    /// `rower` in ascending slice order once every slice has finished.
    pub fn pmap<R>(&self, rower: &mut R) -> Result<()>
    where
        R: Rower + Send,
    {
        parallel::pmap(self, rower, parallel::default_partitions(self.nrows()))
    }

    /// `pmap` with a caller-pinned slice count. Any `partitions` value is
    /// clamped to `1..=nrows`.
    pub fn pmap_with_partitions<R>(&self, rower: &mut R, partitions: usize) -> Result<()>
    where
        R: Rower + Send,
    {
        parallel::pmap(self, rower, partitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The "IB" table from the traversal examples: ints 0..4, bools
    /// alternating false/true.
    fn spreadsheet() -> DataFrame {
        let schema = Schema::from_type_str("IB").unwrap();
        let mut df = DataFrame::from_schema(&schema);
        let mut row = Row::new(&schema);
        for idx in 0..4_i64 {
            row.set(0, Value::Int(idx)).unwrap();
            row.set(1, Value::Bool(idx % 2 == 1)).unwrap();
            df.add_row(&row).unwrap();
        }
        df
    }

    /// Sums column 0 where column 1 is true; accepts those rows.
    #[derive(Default)]
    struct SumWhereTrue {
        sum: i64,
        joins: usize,
    }

    impl Rower for SumWhereTrue {
        fn accept(&mut self, row: &Row) -> Result<bool> {
            let keep = row.get_bool(1)?;
            if keep {
                self.sum += row.get_int(0)?;
            }
            Ok(keep)
        }

        fn split(&self) -> Self {
            SumWhereTrue::default()
        }

        fn join(&mut self, other: Self) {
            self.sum += other.sum;
            self.joins += 1;
        }
    }

    /// Records the order rows were visited in.
    #[derive(Default)]
    struct IndexRecorder {
        seen: Vec<usize>,
    }

    impl Rower for IndexRecorder {
        fn accept(&mut self, row: &Row) -> Result<bool> {
            self.seen.push(row.idx());
            Ok(false)
        }

        fn split(&self) -> Self {
            IndexRecorder::default()
        }

        fn join(&mut self, other: Self) {
            self.seen.extend(other.seen);
        }
    }

    #[test]
    fn build_and_read_back() {
        let df = spreadsheet();
        assert_eq!(2, df.ncols());
        assert_eq!(4, df.nrows());
        assert_eq!(4, df.schema().length());

        assert_eq!(2, df.get_int(0, 2).unwrap());
        assert!(df.get_bool(1, 3).unwrap());
        assert!(matches!(
            df.get_bool(0, 0),
            Err(FrameError::TypeMismatch {
                expected: DataType::Bool,
                got: DataType::Int,
            })
        ));
        assert!(matches!(
            df.value(0, 4),
            Err(FrameError::IndexOutOfRange { idx: 4, len: 4 })
        ));
        assert!(matches!(
            df.value(2, 0),
            Err(FrameError::IndexOutOfRange { idx: 2, len: 2 })
        ));
    }

    #[test]
    fn add_column_checks_lengths_and_names() {
        let mut df = DataFrame::default();
        df.add_column((0..4_i64).collect(), Some("ints".into()))
            .unwrap();
        assert_eq!(4, df.nrows());

        let err = df
            .add_column([true, false].into_iter().collect::<Column>(), None)
            .unwrap_err();
        assert!(matches!(
            err,
            FrameError::LengthMismatch {
                expected: 4,
                got: 2,
            }
        ));

        let err = df
            .add_column((0..4_i64).collect(), Some("ints".into()))
            .unwrap_err();
        assert!(matches!(err, FrameError::DuplicateName(_)));

        df.add_column(
            [true, false, true, false].into_iter().collect::<Column>(),
            Some("bools".into()),
        )
        .unwrap();
        assert_eq!(1, df.col_idx("bools").unwrap());
        assert_eq!(Some("bools"), df.column(1).unwrap().name());
    }

    #[test]
    fn set_replaces_within_bounds_only() {
        let mut df = spreadsheet();
        df.set(0, 1, Value::Int(10)).unwrap();
        assert_eq!(10, df.get_int(0, 1).unwrap());

        // The frame path never grows a single column.
        let err = df.set(0, 4, Value::Int(4)).unwrap_err();
        assert!(matches!(err, FrameError::IndexOutOfRange { idx: 4, len: 4 }));
        assert_eq!(4, df.nrows());
    }

    #[test]
    fn add_row_is_validated_before_mutation() {
        let mut df = spreadsheet();
        let other_schema = Schema::from_type_str("BI").unwrap();
        let mut row = Row::new(&other_schema);
        row.set(0, Value::Bool(true)).unwrap();
        row.set(1, Value::Int(9)).unwrap();

        let err = df.add_row(&row).unwrap_err();
        assert!(matches!(err, FrameError::TypeMismatch { .. }));
        assert_eq!(4, df.nrows());
        assert_eq!(4, df.schema().length());

        // Incomplete rows are rejected too.
        let mut row = Row::new(df.schema());
        row.set(0, Value::Int(4)).unwrap();
        let err = df.add_row(&row).unwrap_err();
        assert!(matches!(err, FrameError::IncompleteRow { col: 1 }));
        assert_eq!(4, df.nrows());
    }

    #[test]
    fn named_rows_resolve_by_name() {
        let schema = Schema::from_type_str("I").unwrap();
        let mut df = DataFrame::from_schema(&schema);
        let mut row = Row::new(&schema);

        row.set(0, Value::Int(1)).unwrap();
        df.add_named_row(&row, "first".into()).unwrap();
        row.set(0, Value::Int(2)).unwrap();
        df.add_row(&row).unwrap();

        assert_eq!(0, df.row_idx("first").unwrap());
        assert!(matches!(
            df.row_idx("second"),
            Err(FrameError::NameNotFound(_))
        ));
    }

    #[test]
    fn map_visits_rows_in_order() {
        let df = spreadsheet();
        let mut recorder = IndexRecorder::default();
        df.map(&mut recorder).unwrap();
        assert_eq!(vec![0, 1, 2, 3], recorder.seen);
    }

    #[test]
    fn map_sums_spreadsheet() {
        let df = spreadsheet();
        let mut rower = SumWhereTrue::default();
        df.map(&mut rower).unwrap();
        assert_eq!(4, rower.sum);
        assert_eq!(0, rower.joins);
    }

    #[test]
    fn pmap_sums_spreadsheet_with_two_slices() {
        let df = spreadsheet();
        let mut rower = SumWhereTrue::default();
        df.pmap_with_partitions(&mut rower, 2).unwrap();
        assert_eq!(4, rower.sum);
        assert_eq!(1, rower.joins);
    }

    #[test]
    fn filter_keeps_accepted_rows_in_order() {
        let df = spreadsheet();
        let mut rower = SumWhereTrue::default();
        let out = df.filter(&mut rower).unwrap();

        assert_eq!(2, out.nrows());
        assert_eq!(1, out.get_int(0, 0).unwrap());
        assert_eq!(3, out.get_int(0, 1).unwrap());
        assert_eq!(
            df.schema().column_types().collect::<Vec<_>>(),
            out.schema().column_types().collect::<Vec<_>>()
        );
        // Filtered tables start row-name-less.
        assert!(matches!(
            out.schema().row_name(0),
            Err(FrameError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn filter_of_nothing_is_empty_frame() {
        let schema = Schema::from_type_str("IB").unwrap();
        let df = DataFrame::from_schema(&schema);
        let mut rower = SumWhereTrue::default();
        let out = df.filter(&mut rower).unwrap();
        assert_eq!(0, out.nrows());
        assert_eq!(2, out.ncols());
    }

    #[test]
    fn columnless_frame_tracks_rows_through_schema() {
        let mut schema = Schema::new();
        schema.add_row(Some("r0".into())).unwrap();
        schema.add_row(None).unwrap();

        let mut df = DataFrame::from_schema(&schema);
        assert_eq!(0, df.nrows());

        let row = Row::new(df.schema());
        df.add_row(&row).unwrap();
        df.add_row(&row).unwrap();
        assert_eq!(2, df.nrows());
        df.map(&mut IndexRecorder::default()).unwrap();
    }
}
