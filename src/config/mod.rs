use serde::de::Error;
use serde::{Deserialize, Deserializer};

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::beam::Beam;

pub mod error;
pub use error::ConfigError;

pub const DEFAULT_SEGMENT_PREFIX: &str = "seg";

const HEIGHT_VARIABLES: [&str; 8] = [
    "heights/h_ph",
    "heights/delta_time",
    "heights/lat_ph",
    "heights/lon_ph",
    "heights/quality_ph",
    "heights/signal_conf_ph",
    "heights/dist_ph_along",
    "heights/dist_ph_across",
];

const GEOLOCATION_VARIABLES: [&str; 3] = [
    "geolocation/ph_index_beg",
    "geolocation/segment_ph_cnt",
    "geolocation/segment_dist_x",
];

const GEOPHYSICAL_CORRECTION_VARIABLES: [&str; 3] = [
    "geophys_corr/tide_ocean",
    "geophys_corr/tide_equilibrium",
    "geophys_corr/dem_h",
];

const SURFACES: [&str; 5] = ["land", "ocean", "sea_ice", "land_ice", "inland_water"];

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// Variable lists used when a request asks for a group's defaults, and the
/// surface labels for signal confidence columns.
///
/// Paths are relative to a beam group.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VariableDefaults {
    pub height_variables: Vec<String>,
    pub geolocation_variables: Vec<String>,
    pub geophysical_correction_variables: Vec<String>,
    pub surfaces: Vec<String>,
}

impl Default for VariableDefaults {
    fn default() -> Self {
        Self {
            height_variables: owned(&HEIGHT_VARIABLES),
            geolocation_variables: owned(&GEOLOCATION_VARIABLES),
            geophysical_correction_variables: owned(&GEOPHYSICAL_CORRECTION_VARIABLES),
            surfaces: owned(&SURFACES),
        }
    }
}

/// Selection for an optional segment-rate variable group.
///
/// Deserializes from `true` (defaults), `false` (skip) or a list of names.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum VariableGroup {
    Disabled,
    #[default]
    Default,
    Explicit(Vec<String>),
}

impl VariableGroup {
    /// Names selected by this group, or `None` when it is disabled.
    ///
    /// An explicit empty list resolves to an empty slice; callers reject it.
    pub fn resolve<'a>(&'a self, defaults: &'a [String]) -> Option<&'a [String]> {
        match self {
            VariableGroup::Disabled => None,
            VariableGroup::Default => Some(defaults),
            VariableGroup::Explicit(names) => Some(names),
        }
    }

    pub fn is_empty_list(&self) -> bool {
        matches!(self, VariableGroup::Explicit(names) if names.is_empty())
    }
}

impl From<bool> for VariableGroup {
    fn from(enabled: bool) -> Self {
        if enabled {
            VariableGroup::Default
        } else {
            VariableGroup::Disabled
        }
    }
}

impl From<Vec<String>> for VariableGroup {
    fn from(names: Vec<String>) -> Self {
        VariableGroup::Explicit(names)
    }
}

impl<'de> Deserialize<'de> for VariableGroup {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Flag(bool),
            List(Vec<String>),
        }

        Ok(match Helper::deserialize(deserializer)? {
            Helper::Flag(enabled) => enabled.into(),
            Helper::List(names) => names.into(),
        })
    }
}

/// Which variables to read from one beam of a granule.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct GranuleRequest {
    /// Photon-rate variables; `None` reads the default height variables.
    pub height_variables: Option<Vec<String>>,
    pub geolocation_variables: VariableGroup,
    pub geophysical_correction_variables: VariableGroup,
}

#[derive(Debug, Clone)]
pub struct Config {
    beams: Vec<Beam>,
    request: GranuleRequest,
    defaults: VariableDefaults,
    segment_prefix: String,
    decode_delta_time: bool,
}

// Deserializes through a helper so that empty beam lists and empty explicit
// variable groups are rejected when the file is loaded.
impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ConfigHelper {
            beams: Option<Vec<Beam>>,
            #[serde(flatten)]
            request: GranuleRequest,
            #[serde(default)]
            defaults: VariableDefaults,
            segment_prefix: Option<String>,
            #[serde(default)]
            decode_delta_time: bool,
        }

        let helper = ConfigHelper::deserialize(deserializer)?;

        let beams = helper.beams.unwrap_or_else(|| Beam::ALL.to_vec());
        if beams.is_empty() {
            return Err(D::Error::custom(ConfigError::NoBeams));
        }

        if helper.request.geolocation_variables.is_empty_list() {
            return Err(D::Error::custom(ConfigError::EmptyVariableList(
                "geolocation_variables".to_string(),
            )));
        }

        if helper.request.geophysical_correction_variables.is_empty_list() {
            return Err(D::Error::custom(ConfigError::EmptyVariableList(
                "geophysical_correction_variables".to_string(),
            )));
        }

        Ok(Config {
            beams,
            request: helper.request,
            defaults: helper.defaults,
            segment_prefix: helper
                .segment_prefix
                .unwrap_or_else(|| DEFAULT_SEGMENT_PREFIX.to_string()),
            decode_delta_time: helper.decode_delta_time,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            beams: Beam::ALL.to_vec(),
            request: GranuleRequest::default(),
            defaults: VariableDefaults::default(),
            segment_prefix: DEFAULT_SEGMENT_PREFIX.to_string(),
            decode_delta_time: false,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let config: Config = serde_json::from_reader(reader).map_err(ConfigError::from)?;

        Ok(config)
    }

    pub fn beams(&self) -> &[Beam] {
        &self.beams
    }

    pub fn request(&self) -> &GranuleRequest {
        &self.request
    }

    pub fn defaults(&self) -> &VariableDefaults {
        &self.defaults
    }

    pub fn segment_prefix(&self) -> &str {
        &self.segment_prefix
    }

    pub fn decode_delta_time(&self) -> bool {
        self.decode_delta_time
    }
}
