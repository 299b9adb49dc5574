pub mod h5;
pub mod types;

pub use h5::{H5Granule, H5Opener};
pub use types::{ColumnData, GranuleOpener, ReadError, VariableArray, VariableSource};
