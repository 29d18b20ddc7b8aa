//! Renders a frame in SoR format: one row per line, each cell in angle
//! brackets. Bools are `<1>`/`<0>`, floats keep a fractional part so their
//! typing survives a read back, strings are always quoted with `\"` and
//! `\\` escapes, and an absent string is `<>`. Row names are not emitted.

use crate::errors::Result;
use sorrel_frame::dataframe::DataFrame;
use sorrel_frame::datatype::Value;
use sorrel_frame::row::{Fielder, Row};
use std::io::Write;

/// Fielder that renders one row's cells into a line buffer.
#[derive(Default)]
struct SorFielder {
    line: String,
}

impl Fielder for SorFielder {
    fn start(&mut self, _row_idx: usize) {
        self.line.clear();
    }

    fn accept(&mut self, value: &Value) {
        match value {
            Value::Int(v) => self.line.push_str(&format!("<{v}>")),
            Value::Bool(true) => self.line.push_str("<1>"),
            Value::Bool(false) => self.line.push_str("<0>"),
            // Debug formatting keeps a ".0" on integral floats, so the
            // reader infers Float for them rather than Int.
            Value::Float(v) => self.line.push_str(&format!("<{v:?}>")),
            Value::String(Some(s)) => {
                self.line.push_str("<\"");
                for c in s.chars() {
                    match c {
                        '"' => self.line.push_str("\\\""),
                        '\\' => self.line.push_str("\\\\"),
                        c => self.line.push(c),
                    }
                }
                self.line.push_str("\">");
            }
            Value::String(None) => self.line.push_str("<>"),
        }
    }

    fn done(&mut self) {}
}

/// Write `frame` in SoR format.
pub fn write_frame<W: Write>(frame: &DataFrame, out: &mut W) -> Result<()> {
    let mut row = Row::new(frame.schema());
    let mut fielder = SorFielder::default();
    for idx in 0..frame.nrows() {
        frame.fill_row(idx, &mut row)?;
        row.visit(idx, &mut fielder)?;
        out.write_all(fielder.line.as_bytes())?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Render `frame` to a SoR string.
pub fn to_string(frame: &DataFrame) -> Result<String> {
    let mut buf = Vec::new();
    write_frame(frame, &mut buf)?;
    Ok(String::from_utf8(buf).expect("writer emits utf8"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;
    use sorrel_frame::column::Column;
    use std::sync::Arc;

    fn mixed_frame() -> DataFrame {
        let mut df = DataFrame::default();
        df.add_column((1..4_i64).collect(), Some("id".into())).unwrap();
        df.add_column(
            [true, false, true].into_iter().collect::<Column>(),
            Some("flag".into()),
        )
        .unwrap();
        df.add_column([1.5, 2.0, -0.25].into_iter().collect::<Column>(), None)
            .unwrap();
        df.add_column(
            [Some(Arc::from("plain")), Some(Arc::from("quo\"te")), None]
                .into_iter()
                .collect::<Column>(),
            None,
        )
        .unwrap();
        df
    }

    #[test]
    fn golden_output() {
        let df = mixed_frame();
        let got = to_string(&df).unwrap();
        let want = "\
<1><1><1.5><\"plain\">
<2><0><2.0><\"quo\\\"te\">
<3><1><-0.25><>
";
        assert_eq!(want, got);
    }

    #[test]
    fn empty_frame_writes_nothing() {
        let df = DataFrame::default();
        assert_eq!("", to_string(&df).unwrap());
    }

    #[test]
    fn integral_floats_keep_their_fraction() {
        let mut df = DataFrame::default();
        df.add_column([3.0_f64].into_iter().collect::<Column>(), None)
            .unwrap();
        assert_eq!("<3.0>\n", to_string(&df).unwrap());
    }
}
