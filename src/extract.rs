//! Reads granule variables into named 1-D columns.

use thiserror::Error;
use tracing::debug;

use crate::readers::{ColumnData, ReadError, VariableSource};

/// Base names containing this marker carry one column per surface type.
pub const SIGNAL_CONFIDENCE_MARKER: &str = "signal_conf_ph";

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(
        "signal confidence variable {variable} has {found} columns but {expected} surface labels are configured"
    )]
    SurfaceLabelCountMismatch {
        variable: String,
        expected: usize,
        found: usize,
    },
}

/// Ordered mapping from generated column name to column data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMap {
    columns: Vec<(String, ColumnData)>,
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: String, data: ColumnData) {
        self.columns.push((name, data));
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ColumnData> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, data)| data)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnData)> {
        self.columns.iter().map(|(name, data)| (name.as_str(), data))
    }
}

impl IntoIterator for ColumnMap {
    type Item = (String, ColumnData);
    type IntoIter = std::vec::IntoIter<(String, ColumnData)>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}

/// Final path segment of a variable path.
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Reads every variable in `variable_paths`, in order, and flattens them into
/// columns.
///
/// 1-D variables become one column named after the variable. 2-D variables
/// become one column per entry of their second axis: signal confidence
/// variables are suffixed with the matching label from `surfaces`, all others
/// with the column index. A `prefix` is joined to every name with `_`.
pub fn extract_variables<S>(
    source: &S,
    variable_paths: &[String],
    prefix: Option<&str>,
    surfaces: &[String],
) -> Result<ColumnMap, ExtractError>
where
    S: VariableSource + ?Sized,
{
    let mut columns = ColumnMap::new();

    for path in variable_paths {
        let base = base_name(path);
        let name = match prefix {
            Some(prefix) => format!("{}_{}", prefix, base),
            None => base.to_string(),
        };

        let array = source.read_variable(path)?;
        match array.ndim() {
            1 => {
                columns.push(name, array.into_columns().remove(0));
            }
            2 => {
                let split = array.into_columns();
                let suffixes = column_suffixes(path, base, split.len(), surfaces)?;
                for (suffix, data) in suffixes.into_iter().zip(split) {
                    columns.push(format!("{}_{}", name, suffix), data);
                }
            }
            ndim => {
                return Err(ReadError::UnsupportedShape {
                    path: path.clone(),
                    ndim,
                }
                .into());
            }
        }
        debug!(variable = %path, columns = columns.len(), "extracted variable");
    }

    Ok(columns)
}

fn column_suffixes(
    path: &str,
    base: &str,
    width: usize,
    surfaces: &[String],
) -> Result<Vec<String>, ExtractError> {
    if !base.contains(SIGNAL_CONFIDENCE_MARKER) {
        return Ok((0..width).map(|i| i.to_string()).collect());
    }

    if width != surfaces.len() {
        return Err(ExtractError::SurfaceLabelCountMismatch {
            variable: path.to_string(),
            expected: surfaces.len(),
            found: width,
        });
    }

    Ok(surfaces.to_vec())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::VariableDefaults;
    use crate::readers::VariableArray;
    use ndarray::{arr1, arr2, Array3};
    use std::collections::HashMap;

    /// Granule backed by a map of in-memory arrays.
    #[derive(Debug, Default, Clone)]
    pub(crate) struct MemoryGranule {
        pub(crate) variables: HashMap<String, VariableArray>,
    }

    impl MemoryGranule {
        pub(crate) fn with(mut self, path: &str, array: VariableArray) -> Self {
            self.variables.insert(path.to_string(), array);
            self
        }
    }

    impl VariableSource for MemoryGranule {
        fn read_variable(&self, path: &str) -> Result<VariableArray, ReadError> {
            self.variables
                .get(path)
                .cloned()
                .ok_or_else(|| ReadError::MissingVariable {
                    path: path.to_string(),
                })
        }

        fn variable_paths(&self) -> Result<Vec<String>, ReadError> {
            let mut paths: Vec<String> = self.variables.keys().cloned().collect();
            paths.sort();
            Ok(paths)
        }
    }

    fn paths(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    fn surfaces() -> Vec<String> {
        VariableDefaults::default().surfaces
    }

    #[test]
    fn test_keys_follow_input_order() {
        let granule = MemoryGranule::default()
            .with("gt1l/heights/lon_ph", VariableArray::Float(arr1(&[1.0, 2.0]).into_dyn()))
            .with("gt1l/heights/h_ph", VariableArray::Float(arr1(&[3.0, 4.0]).into_dyn()))
            .with("gt1l/heights/quality_ph", VariableArray::Int(arr1(&[0, 1]).into_dyn()));

        let columns = extract_variables(
            &granule,
            &paths(&["gt1l/heights/quality_ph", "gt1l/heights/lon_ph", "gt1l/heights/h_ph"]),
            None,
            &surfaces(),
        )
        .unwrap();

        assert_eq!(columns.names(), vec!["quality_ph", "lon_ph", "h_ph"]);
    }

    #[test]
    fn test_one_dimensional_values_are_unchanged() {
        let values = vec![1.25, -3.5, 1e9, f64::MIN_POSITIVE];
        let granule = MemoryGranule::default().with(
            "gt1l/heights/h_ph",
            VariableArray::Float(arr1(&values).into_dyn()),
        );

        let columns =
            extract_variables(&granule, &paths(&["gt1l/heights/h_ph"]), None, &surfaces()).unwrap();

        assert_eq!(columns.len(), 1);
        assert_eq!(columns.get("h_ph"), Some(&ColumnData::Float64(values)));
    }

    #[test]
    fn test_two_dimensional_columns_are_indexed() {
        let granule = MemoryGranule::default().with(
            "gt1l/geolocation/velocity_sc",
            VariableArray::Float(arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).into_dyn()),
        );

        let columns = extract_variables(
            &granule,
            &paths(&["gt1l/geolocation/velocity_sc"]),
            None,
            &surfaces(),
        )
        .unwrap();

        assert_eq!(
            columns.names(),
            vec!["velocity_sc_0", "velocity_sc_1", "velocity_sc_2"]
        );
        assert_eq!(columns.get("velocity_sc_0"), Some(&ColumnData::Float64(vec![1.0, 4.0])));
        assert_eq!(columns.get("velocity_sc_2"), Some(&ColumnData::Float64(vec![3.0, 6.0])));
    }

    #[test]
    fn test_signal_confidence_columns_use_surface_labels() {
        let granule = MemoryGranule::default().with(
            "gt1l/heights/signal_conf_ph",
            VariableArray::Int(arr2(&[[0, 1, 2, 3, 4], [4, 3, 2, 1, -1]]).into_dyn()),
        );

        let columns = extract_variables(
            &granule,
            &paths(&["gt1l/heights/signal_conf_ph"]),
            None,
            &surfaces(),
        )
        .unwrap();

        assert_eq!(
            columns.names(),
            vec![
                "signal_conf_ph_land",
                "signal_conf_ph_ocean",
                "signal_conf_ph_sea_ice",
                "signal_conf_ph_land_ice",
                "signal_conf_ph_inland_water",
            ]
        );
        assert_eq!(columns.get("signal_conf_ph_ocean"), Some(&ColumnData::Int64(vec![1, 3])));
        assert_eq!(
            columns.get("signal_conf_ph_inland_water"),
            Some(&ColumnData::Int64(vec![4, -1]))
        );
    }

    #[test]
    fn test_signal_confidence_width_mismatch_is_an_error() {
        let granule = MemoryGranule::default().with(
            "gt1l/heights/signal_conf_ph",
            VariableArray::Int(arr2(&[[0, 1, 2, 3], [4, 3, 2, 1]]).into_dyn()),
        );

        let result = extract_variables(
            &granule,
            &paths(&["gt1l/heights/signal_conf_ph"]),
            None,
            &surfaces(),
        );

        match result {
            Err(ExtractError::SurfaceLabelCountMismatch {
                variable,
                expected,
                found,
            }) => {
                assert_eq!(variable, "gt1l/heights/signal_conf_ph");
                assert_eq!(expected, 5);
                assert_eq!(found, 4);
            }
            other => panic!("expected surface label mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_prefix_applies_to_both_ranks() {
        let granule = MemoryGranule::default()
            .with("gt1l/geophys_corr/dem_h", VariableArray::Float(arr1(&[100.0]).into_dyn()))
            .with(
                "gt1l/heights/signal_conf_ph",
                VariableArray::Int(arr2(&[[0, 1, 2, 3, 4]]).into_dyn()),
            );

        let columns = extract_variables(
            &granule,
            &paths(&["gt1l/geophys_corr/dem_h", "gt1l/heights/signal_conf_ph"]),
            Some("seg"),
            &surfaces(),
        )
        .unwrap();

        assert_eq!(columns.names()[0], "seg_dem_h");
        assert_eq!(columns.names()[1], "seg_signal_conf_ph_land");
        assert_eq!(columns.names()[5], "seg_signal_conf_ph_inland_water");
    }

    #[test]
    fn test_missing_variable_propagates_path() {
        let granule = MemoryGranule::default()
            .with("gt1l/heights/h_ph", VariableArray::Float(arr1(&[1.0]).into_dyn()));

        let result = extract_variables(
            &granule,
            &paths(&["gt1l/heights/h_ph", "gt1l/heights/lat_ph"]),
            None,
            &surfaces(),
        );

        match result {
            Err(ExtractError::Read(ReadError::MissingVariable { path })) => {
                assert_eq!(path, "gt1l/heights/lat_ph")
            }
            other => panic!("expected missing variable, got {:?}", other),
        }
    }

    #[test]
    fn test_three_dimensional_variable_is_rejected() {
        let granule = MemoryGranule::default().with(
            "gt1l/cube",
            VariableArray::Float(Array3::<f64>::zeros((2, 2, 2)).into_dyn()),
        );

        let result = extract_variables(&granule, &paths(&["gt1l/cube"]), None, &surfaces());

        assert!(matches!(
            result,
            Err(ExtractError::Read(ReadError::UnsupportedShape { ndim: 3, .. }))
        ));
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("gt1l/heights/h_ph"), "h_ph");
        assert_eq!(base_name("h_ph"), "h_ph");
    }
}
