//! Photon-rate and segment-rate tables for one beam of an ATL03 granule.

use std::path::Path;

use arrow::record_batch::RecordBatch;
use thiserror::Error;
use tracing::{debug, info};

use crate::beam::Beam;
use crate::config::{Config, DEFAULT_SEGMENT_PREFIX, GranuleRequest, VariableDefaults};
use crate::extract::{ColumnMap, ExtractError, extract_variables};
use crate::readers::{ColumnData, GranuleOpener, H5Opener, ReadError};
use crate::table::{TableError, append_column, concat_columns, to_record_batch};
use crate::time::{DELTA_TIME, TIME, timestamp_column};

#[derive(Error, Debug)]
pub enum GranuleError {
    #[error("{group} is an empty list")]
    EmptyVariableList { group: &'static str },

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Table(#[from] TableError),
}

impl GranuleError {
    /// Path of the variable that was not found, if that is what failed.
    pub fn missing_variable(&self) -> Option<&str> {
        match self {
            GranuleError::Read(ReadError::MissingVariable { path })
            | GranuleError::Extract(ExtractError::Read(ReadError::MissingVariable { path })) => {
                Some(path.as_str())
            }
            _ => None,
        }
    }
}

/// Builds granule tables from an injected set of default variable lists.
#[derive(Debug, Clone)]
pub struct GranuleTableBuilder<O = H5Opener> {
    opener: O,
    defaults: VariableDefaults,
    segment_prefix: String,
    decode_delta_time: bool,
}

impl GranuleTableBuilder<H5Opener> {
    pub fn new(defaults: VariableDefaults) -> Self {
        Self::with_opener(H5Opener, defaults)
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.defaults().clone())
            .segment_prefix(config.segment_prefix())
            .decode_delta_time(config.decode_delta_time())
    }
}

impl Default for GranuleTableBuilder<H5Opener> {
    fn default() -> Self {
        Self::new(VariableDefaults::default())
    }
}

impl<O: GranuleOpener> GranuleTableBuilder<O> {
    pub fn with_opener(opener: O, defaults: VariableDefaults) -> Self {
        Self {
            opener,
            defaults,
            segment_prefix: DEFAULT_SEGMENT_PREFIX.to_string(),
            decode_delta_time: false,
        }
    }

    pub fn segment_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.segment_prefix = prefix.into();
        self
    }

    /// Appends a UTC `time` column decoded from `delta_time` when it is read.
    pub fn decode_delta_time(mut self, enabled: bool) -> Self {
        self.decode_delta_time = enabled;
        self
    }

    pub fn defaults(&self) -> &VariableDefaults {
        &self.defaults
    }

    /// Photon-rate variable paths for `beam`.
    pub fn photon_variables(&self, beam: Beam, request: &GranuleRequest) -> Vec<String> {
        request
            .height_variables
            .as_ref()
            .unwrap_or(&self.defaults.height_variables)
            .iter()
            .map(|variable| beam.qualify(variable))
            .collect()
    }

    /// Segment-rate variable paths for `beam`: geolocation first, then
    /// geophysical corrections.
    pub fn segment_variables(
        &self,
        beam: Beam,
        request: &GranuleRequest,
    ) -> Result<Vec<String>, GranuleError> {
        let groups = [
            (
                "geolocation_variables",
                &request.geolocation_variables,
                &self.defaults.geolocation_variables,
            ),
            (
                "geophysical_correction_variables",
                &request.geophysical_correction_variables,
                &self.defaults.geophysical_correction_variables,
            ),
        ];

        let mut variables = Vec::new();
        for (group, selection, defaults) in groups {
            if selection.is_empty_list() {
                return Err(GranuleError::EmptyVariableList { group });
            }
            if let Some(names) = selection.resolve(defaults) {
                variables.extend(names.iter().map(|variable| beam.qualify(variable)));
            }
        }

        Ok(variables)
    }

    /// Reads one beam of a granule into a single table.
    ///
    /// Photon-rate columns come first, followed by the segment-rate columns
    /// with the segment prefix. The two halves are paired by row position
    /// only: row i of the photon table sits next to row i of the segment
    /// table, and the shorter half is padded with nulls.
    pub fn build(
        &self,
        path: &Path,
        beam: Beam,
        request: &GranuleRequest,
    ) -> Result<RecordBatch, GranuleError> {
        let photon_variables = self.photon_variables(beam, request);
        let segment_variables = self.segment_variables(beam, request)?;

        let (photon_columns, segment_columns) = {
            let granule = self.opener.open(path)?;

            let photons =
                extract_variables(&granule, &photon_variables, None, &self.defaults.surfaces)?;
            let segments = extract_variables(
                &granule,
                &segment_variables,
                Some(self.segment_prefix.as_str()),
                &self.defaults.surfaces,
            )?;

            (photons, segments)
        };
        debug!(
            path = %path.display(),
            %beam,
            photon_columns = photon_columns.len(),
            segment_columns = segment_columns.len(),
            "granule closed"
        );

        let photons = self.photon_table(photon_columns)?;
        let segments = to_record_batch(segment_columns)?;
        let table = concat_columns(&photons, &segments)?;

        info!(
            path = %path.display(),
            %beam,
            photon_rows = photons.num_rows(),
            segment_rows = segments.num_rows(),
            columns = table.num_columns(),
            "built granule table"
        );

        Ok(table)
    }

    fn photon_table(&self, columns: ColumnMap) -> Result<RecordBatch, GranuleError> {
        let timestamps = match columns.get(DELTA_TIME) {
            Some(ColumnData::Float64(delta_times)) if self.decode_delta_time => {
                Some(timestamp_column(delta_times))
            }
            _ => None,
        };

        let batch = to_record_batch(columns)?;
        match timestamps {
            Some(timestamps) => Ok(append_column(&batch, TIME, timestamps)?),
            None => Ok(batch),
        }
    }
}

/// Reads one beam of a granule with the default variable lists.
pub fn read_atl03(
    path: &Path,
    beam: Beam,
    request: &GranuleRequest,
) -> Result<RecordBatch, GranuleError> {
    GranuleTableBuilder::<H5Opener>::default().build(path, beam, request)
}
