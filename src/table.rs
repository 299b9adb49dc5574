//! Arrow assembly of extracted columns.

use std::collections::HashSet;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, UInt64Array, new_null_array};
use arrow::compute::concat;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use thiserror::Error;

use crate::extract::ColumnMap;
use crate::readers::ColumnData;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("column {0} appears more than once")]
    DuplicateColumn(String),
}

impl ColumnData {
    pub fn data_type(&self) -> DataType {
        match self {
            ColumnData::Float64(_) => DataType::Float64,
            ColumnData::Int64(_) => DataType::Int64,
            ColumnData::UInt64(_) => DataType::UInt64,
        }
    }

    pub fn into_array(self) -> ArrayRef {
        match self {
            ColumnData::Float64(v) => Arc::new(Float64Array::from(v)),
            ColumnData::Int64(v) => Arc::new(Int64Array::from(v)),
            ColumnData::UInt64(v) => Arc::new(UInt64Array::from(v)),
        }
    }
}

/// Builds a record batch from a column map.
///
/// All columns must have the same length. An empty map gives a batch with no
/// columns and no rows.
pub fn to_record_batch(columns: ColumnMap) -> Result<RecordBatch, TableError> {
    if columns.is_empty() {
        return Ok(RecordBatch::new_empty(Arc::new(Schema::empty())));
    }

    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(columns.len());
    let mut arrays = Vec::with_capacity(columns.len());

    for (name, data) in columns {
        if !seen.insert(name.clone()) {
            return Err(TableError::DuplicateColumn(name));
        }
        fields.push(Field::new(name, data.data_type(), true));
        arrays.push(data.into_array());
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

/// Places the columns of `right` after the columns of `left`, pairing rows by
/// position.
///
/// When the row counts differ the result has as many rows as the longer side
/// and the shorter side's columns are padded with trailing nulls. Nothing is
/// truncated.
pub fn concat_columns(left: &RecordBatch, right: &RecordBatch) -> Result<RecordBatch, TableError> {
    let num_rows = left.num_rows().max(right.num_rows());

    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(left.num_columns() + right.num_columns());
    let mut arrays = Vec::with_capacity(left.num_columns() + right.num_columns());

    for batch in [left, right] {
        for (field, array) in batch.schema().fields().iter().zip(batch.columns()) {
            if !seen.insert(field.name().clone()) {
                return Err(TableError::DuplicateColumn(field.name().clone()));
            }
            fields.push(field.as_ref().clone().with_nullable(true));
            arrays.push(pad_to(array, num_rows)?);
        }
    }

    if fields.is_empty() {
        return Ok(RecordBatch::new_empty(Arc::new(Schema::empty())));
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

/// Appends one column to the end of a batch.
pub fn append_column(
    batch: &RecordBatch,
    name: &str,
    array: ArrayRef,
) -> Result<RecordBatch, TableError> {
    if batch.schema().column_with_name(name).is_some() {
        return Err(TableError::DuplicateColumn(name.to_string()));
    }

    let mut fields: Vec<Field> = batch
        .schema()
        .fields()
        .iter()
        .map(|field| field.as_ref().clone())
        .collect();
    fields.push(Field::new(name, array.data_type().clone(), true));

    let mut arrays = batch.columns().to_vec();
    arrays.push(array);

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

fn pad_to(array: &ArrayRef, len: usize) -> Result<ArrayRef, ArrowError> {
    if array.len() >= len {
        return Ok(Arc::clone(array));
    }

    let padding = new_null_array(array.data_type(), len - array.len());
    concat(&[array.as_ref(), padding.as_ref()])
}
