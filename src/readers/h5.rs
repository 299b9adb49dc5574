use std::path::Path;

use hdf5::types::TypeDescriptor;
use tracing::debug;

use super::{GranuleOpener, ReadError, VariableArray, VariableSource};

/// Opens granules read-only through libhdf5.
#[derive(Debug, Default, Clone, Copy)]
pub struct H5Opener;

/// An open ATL03 granule. The file is closed when this value is dropped.
pub struct H5Granule {
    file: hdf5::File,
}

impl GranuleOpener for H5Opener {
    type Granule = H5Granule;

    fn open(&self, path: &Path) -> Result<H5Granule, ReadError> {
        let file = hdf5::File::open(path).map_err(|source| ReadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "opened granule");

        Ok(H5Granule { file })
    }
}

impl H5Granule {
    // H5Lexists only answers for the last link, so every parent is checked too.
    fn contains(&self, path: &str) -> bool {
        let mut prefix = String::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);

            if !self.file.link_exists(&prefix) {
                return false;
            }
        }

        !prefix.is_empty()
    }
}

impl VariableSource for H5Granule {
    fn read_variable(&self, path: &str) -> Result<VariableArray, ReadError> {
        if !self.contains(path) {
            return Err(ReadError::MissingVariable {
                path: path.to_string(),
            });
        }

        let hdf5_err = |source| ReadError::Hdf5 {
            path: path.to_string(),
            source,
        };

        let dataset = self.file.dataset(path).map_err(hdf5_err)?;
        let descriptor = dataset
            .dtype()
            .and_then(|dtype| dtype.to_descriptor())
            .map_err(hdf5_err)?;

        let array = match descriptor {
            TypeDescriptor::Float(_) => VariableArray::Float(dataset.read_dyn::<f64>().map_err(hdf5_err)?),
            TypeDescriptor::Integer(_) => VariableArray::Int(dataset.read_dyn::<i64>().map_err(hdf5_err)?),
            TypeDescriptor::Unsigned(_) => VariableArray::UInt(dataset.read_dyn::<u64>().map_err(hdf5_err)?),
            other => {
                return Err(ReadError::UnsupportedType {
                    path: path.to_string(),
                    dtype: format!("{:?}", other),
                });
            }
        };
        debug!(path, shape = ?array.shape(), "read variable");

        Ok(array)
    }

    fn variable_paths(&self) -> Result<Vec<String>, ReadError> {
        let mut paths = Vec::new();
        collect_datasets(&self.file, &mut paths).map_err(|source| ReadError::Hdf5 {
            path: "/".to_string(),
            source,
        })?;
        paths.sort();

        Ok(paths)
    }
}

fn collect_datasets(group: &hdf5::Group, paths: &mut Vec<String>) -> hdf5::Result<()> {
    for dataset in group.datasets()? {
        paths.push(dataset.name().trim_start_matches('/').to_string());
    }

    for child in group.groups()? {
        collect_datasets(&child, paths)?;
    }

    Ok(())
}
