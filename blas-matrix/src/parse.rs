//! Text to matrix parsing
//!
//! Rows are separated by `;`, fields within a row by `,` or whitespace. Rows
//! may have different field counts: the matrix is as wide as the widest row
//! and missing trailing cells are zero.

use blas_plugin::prelude::*;
use crate::dispatch::evaluate_ordered;
use crate::helpers::extract_text;

pub(crate) const PARSE: &str = "math/blas/matrix/parse";

fn parse_row(row: &str, index: usize) -> Result<Vec<f64>, BlasError> {
    row.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|field| !field.is_empty())
        .map(|field| {
            field.parse::<f64>().map_err(|_| {
                BlasError::parse_error(format!("row {}: '{}' is not a number", index, field))
            })
        })
        .collect()
}

/// Parse `text` into a matrix with the given storage.
///
/// Trailing empty rows (as in `"1,2;3,4;"`) are ignored; any other empty row
/// is an error.
pub fn parse_matrix(text: &str, density: Density) -> Result<Matrix, BlasError> {
    let mut segments: Vec<&str> = text.split(';').collect();
    while segments.last().is_some_and(|s| s.trim().is_empty()) {
        segments.pop();
    }
    if segments.is_empty() {
        return Err(BlasError::parse_error("no rows in matrix text"));
    }

    let mut rows = Vec::with_capacity(segments.len());
    for (i, segment) in segments.iter().enumerate() {
        let row = parse_row(segment, i)?;
        if row.is_empty() {
            return Err(BlasError::parse_error(format!("row {} is empty", i)));
        }
        rows.push(row);
    }

    let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut data = nalgebra::DMatrix::zeros(rows.len(), cols);
    for (i, row) in rows.iter().enumerate() {
        for (j, &x) in row.iter().enumerate() {
            data[(i, j)] = x;
        }
    }
    Ok(Matrix::from_dense(data, density))
}

// ============ parse ============

pub struct ParseFn;

static PARSE_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("text", "Text", "Matrix text, rows separated by ';', fields by ',' or whitespace"),
    ArgMeta::optional("density", "Text", "Storage of every parsed matrix", "dense"),
];

static PARSE_EXAMPLES: [&str; 3] = [
    "parse(\"1,2;3,4\") → [[1,2],[3,4]]",
    "parse(\"1;1;1\") → 3×1 matrix",
    "parse(\"4,3;2,1;0,0\", \"sparse\") → sparse 3×2 matrix",
];
static PARSE_RELATED: [&str; 2] = ["math/blas/matrix/create", "math/blas/vector/fromlist"];

impl ActionPlugin for ParseFn {
    fn meta(&self) -> ActionMeta {
        ActionMeta {
            name: PARSE,
            description: "Parse text into matrices, one per text argument",
            usage: "parse(text, ..., [density])",
            args: &PARSE_ARGS,
            min_args: 1,
            returns: "Matrix per text",
            examples: &PARSE_EXAMPLES,
            category: "blas/matrix",
            related: &PARSE_RELATED,
        }
    }

    fn execute(&self, parallel: bool, ctx: &ExecContext, args: &[Value], ret: &mut Vec<Value>) -> Result<(), BlasError> {
        let operands = Operands::flatten(args);
        let (texts, density) = operands.split_density();
        evaluate_ordered(PARSE, parallel, ctx, texts, |_, v| {
            let text = extract_text(v, PARSE, "text")?;
            Ok(parse_matrix(text, density)?.into())
        }, ret)
    }
}
