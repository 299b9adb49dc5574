//! Readers for ICESat-2 ATL03 granules.
//!
//! [`granule::GranuleTableBuilder`] reads the photon-rate and segment-rate
//! variables of one beam into an Arrow [`arrow::record_batch::RecordBatch`].
//! [`spatial::extract_bboxes`] turns the footprint of a CMR search result into
//! gdal polygons.

pub mod bbox;
pub mod beam;
pub mod config;
pub mod extract;
pub mod granule;
pub mod readers;
pub mod spatial;
pub mod table;
pub mod time;
pub mod utils;

pub use beam::Beam;
pub use config::{Config, GranuleRequest, VariableDefaults, VariableGroup};
pub use extract::{ColumnMap, extract_variables};
pub use granule::{GranuleError, GranuleTableBuilder, read_atl03};
pub use spatial::{SpatialError, extract_bboxes};
