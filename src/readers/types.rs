use std::path::{Path, PathBuf};

use ndarray::{ArrayD, Axis};
use thiserror::Error;

/// Read access to the datasets of one open granule.
///
/// Implementations release the underlying handle when dropped.
pub trait VariableSource {
    fn read_variable(&self, path: &str) -> Result<VariableArray, ReadError>;

    /// Every dataset path in the granule, without a leading `/`.
    fn variable_paths(&self) -> Result<Vec<String>, ReadError>;
}

pub trait GranuleOpener {
    type Granule: VariableSource;

    fn open(&self, path: &Path) -> Result<Self::Granule, ReadError>;
}

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("failed to open granule {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: hdf5::Error,
    },

    #[error("variable not found in granule: {path}")]
    MissingVariable { path: String },

    #[error("variable {path} has unsupported element type {dtype}")]
    UnsupportedType { path: String, dtype: String },

    #[error("variable {path} has {ndim} dimensions, expected 1 or 2")]
    UnsupportedShape { path: String, ndim: usize },

    #[error("failed to read {path}: {source}")]
    Hdf5 {
        path: String,
        #[source]
        source: hdf5::Error,
    },
}

/// A dataset read fully into memory, widened to 64 bits.
#[derive(Debug, Clone, PartialEq)]
pub enum VariableArray {
    Float(ArrayD<f64>),
    Int(ArrayD<i64>),
    UInt(ArrayD<u64>),
}

impl VariableArray {
    pub fn shape(&self) -> &[usize] {
        match self {
            VariableArray::Float(a) => a.shape(),
            VariableArray::Int(a) => a.shape(),
            VariableArray::UInt(a) => a.shape(),
        }
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Splits the array into 1-D columns.
    ///
    /// A 1-D array yields a single column. A 2-D array of shape (L, N) yields N
    /// columns of length L in ascending column order. Callers check the rank
    /// first; higher ranks are split along axis 1 as well.
    pub fn into_columns(self) -> Vec<ColumnData> {
        match self {
            VariableArray::Float(a) => split_columns(&a).into_iter().map(ColumnData::Float64).collect(),
            VariableArray::Int(a) => split_columns(&a).into_iter().map(ColumnData::Int64).collect(),
            VariableArray::UInt(a) => split_columns(&a).into_iter().map(ColumnData::UInt64).collect(),
        }
    }
}

fn split_columns<T: Clone>(array: &ArrayD<T>) -> Vec<Vec<T>> {
    if array.ndim() <= 1 {
        return vec![array.iter().cloned().collect()];
    }

    array
        .axis_iter(Axis(1))
        .map(|column| column.iter().cloned().collect())
        .collect()
}

/// One named column of a [`crate::extract::ColumnMap`].
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Float64(Vec<f64>),
    Int64(Vec<i64>),
    UInt64(Vec<u64>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Float64(v) => v.len(),
            ColumnData::Int64(v) => v.len(),
            ColumnData::UInt64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_f64(&self) -> Option<&[f64]> {
        match self {
            ColumnData::Float64(v) => Some(v),
            _ => None,
        }
    }
}
