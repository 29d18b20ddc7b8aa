//! SoR parsing.
//!
//! # Inference
//!
//! Column count is the widest row in the input. Column types are inferred
//! over a bounded leading sample with the hierarchy Bool < Int < Float <
//! String: a column's type is the least type admitting every sampled cell.
//! Bare `0`/`1` cells admit Bool, digit cells admit Int, numerics with a
//! `.` or exponent admit Float. Anything else forces String, as does any
//! quoted cell or a missing `<>` cell, since only string cells can be
//! absent in a frame.

use crate::errors::{Result, SorError};
use sorrel_frame::dataframe::DataFrame;
use sorrel_frame::datatype::{DataType, Value};
use sorrel_frame::row::Row;
use sorrel_frame::schema::Schema;
use std::sync::Arc;
use tracing::debug;

/// Number of leading rows sampled for column type inference.
const INFER_SAMPLE_ROWS: usize = 500;

/// One tokenized cell, before any typing is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RawCell {
    Missing,
    Bare(String),
    Quoted(String),
}

fn parse_error(line: usize, msg: impl Into<String>) -> SorError {
    SorError::Parse {
        line,
        msg: msg.into(),
    }
}

/// Tokenize one line into bracketed cells. Whitespace between and around
/// cells is insignificant; quoted content is taken verbatim after
/// unescaping.
fn tokenize_line(line: &str, line_no: usize) -> Result<Vec<RawCell>> {
    let mut cells = Vec::new();
    let mut iter = line.chars().peekable();

    loop {
        while iter.next_if(|c| c.is_whitespace()).is_some() {}
        match iter.next() {
            None => break,
            Some('<') => {}
            Some(other) => {
                return Err(parse_error(line_no, format!("expected '<', found {other:?}")))
            }
        }

        while iter.next_if(|c| c.is_whitespace()).is_some() {}

        if iter.next_if_eq(&'"').is_some() {
            let mut text = String::new();
            loop {
                match iter.next() {
                    None => return Err(parse_error(line_no, "unterminated quoted value")),
                    Some('"') => break,
                    Some('\\') => match iter.next() {
                        Some(c @ ('"' | '\\')) => text.push(c),
                        Some(c) => {
                            return Err(parse_error(line_no, format!("invalid escape '\\{c}'")))
                        }
                        None => return Err(parse_error(line_no, "unterminated escape")),
                    },
                    Some(c) => text.push(c),
                }
            }
            while iter.next_if(|c| c.is_whitespace()).is_some() {}
            if iter.next() != Some('>') {
                return Err(parse_error(line_no, "expected '>' after quoted value"));
            }
            cells.push(RawCell::Quoted(text));
        } else {
            let mut text = String::new();
            loop {
                match iter.next() {
                    None => return Err(parse_error(line_no, "unterminated value")),
                    Some('>') => break,
                    Some(c) => text.push(c),
                }
            }
            let text = text.trim();
            if text.is_empty() {
                cells.push(RawCell::Missing);
            } else {
                cells.push(RawCell::Bare(text.to_string()));
            }
        }
    }

    Ok(cells)
}

/// Widening rank within the inference hierarchy.
const fn rank(datatype: DataType) -> u8 {
    match datatype {
        DataType::Bool => 0,
        DataType::Int => 1,
        DataType::Float => 2,
        DataType::String => 3,
    }
}

fn bare_type(text: &str) -> DataType {
    if text == "0" || text == "1" {
        return DataType::Bool;
    }
    if text.parse::<i64>().is_ok() {
        return DataType::Int;
    }
    if text.parse::<f64>().is_ok() && text.contains(['.', 'e', 'E']) {
        return DataType::Float;
    }
    DataType::String
}

fn cell_type(cell: &RawCell) -> DataType {
    match cell {
        RawCell::Missing | RawCell::Quoted(_) => DataType::String,
        RawCell::Bare(text) => bare_type(text),
    }
}

fn infer_types(rows: &[(usize, Vec<RawCell>)], width: usize) -> Vec<DataType> {
    let mut types = vec![DataType::Bool; width];
    for (_, cells) in rows.iter().take(INFER_SAMPLE_ROWS) {
        for (col, cell) in cells.iter().enumerate() {
            let got = cell_type(cell);
            if rank(got) > rank(types[col]) {
                types[col] = got;
            }
        }
    }
    types
}

fn parse_cell(cell: &RawCell, datatype: DataType, line_no: usize) -> Result<Value> {
    match (datatype, cell) {
        (DataType::String, RawCell::Missing) => Ok(Value::String(None)),
        (DataType::String, RawCell::Bare(s) | RawCell::Quoted(s)) => {
            Ok(Value::String(Some(Arc::from(s.as_str()))))
        }
        (_, RawCell::Missing) => Err(parse_error(
            line_no,
            format!("missing value in {datatype} column"),
        )),
        (_, RawCell::Quoted(_)) => Err(parse_error(
            line_no,
            format!("quoted value in {datatype} column"),
        )),
        (DataType::Bool, RawCell::Bare(s)) => match s.as_str() {
            "0" => Ok(Value::Bool(false)),
            "1" => Ok(Value::Bool(true)),
            other => Err(parse_error(line_no, format!("invalid bool {other:?}"))),
        },
        (DataType::Int, RawCell::Bare(s)) => s
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| parse_error(line_no, format!("invalid int {s:?}"))),
        (DataType::Float, RawCell::Bare(s)) => s
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| parse_error(line_no, format!("invalid float {s:?}"))),
    }
}

/// Parse SoR text into a frame.
///
/// Every non-blank line is a row and must have as many cells as the widest
/// row; ragged input is a parse error since only String columns can
/// represent an absent cell. The result has unnamed columns and no row
/// names; column order and typing round-trip through the writer exactly.
pub fn read_frame(input: &str) -> Result<DataFrame> {
    let mut rows = Vec::new();
    for (line_idx, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = line_idx + 1;
        rows.push((line_no, tokenize_line(line, line_no)?));
    }

    let width = rows.iter().map(|(_, cells)| cells.len()).max().unwrap_or(0);
    let types = infer_types(&rows, width);
    debug!(width, ?types, "inferred sor schema");

    let mut schema = Schema::new();
    for datatype in &types {
        schema.add_column(*datatype, None)?;
    }

    let mut frame = DataFrame::from_schema(&schema);
    let mut row = Row::new(&schema);
    for (line_no, cells) in &rows {
        if cells.len() != width {
            return Err(parse_error(
                *line_no,
                format!("expected {width} fields, found {}", cells.len()),
            ));
        }
        for (col, cell) in cells.iter().enumerate() {
            row.set(col, parse_cell(cell, types[col], *line_no)?)?;
        }
        frame.add_row(&row)?;
    }

    Ok(frame)
}
