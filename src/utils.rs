use std::path::{Path, PathBuf};

use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use walkdir::WalkDir;

pub fn is_granule_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("h5") | Some("hdf5")
    )
}

/// Expands directories into the granule files they contain, recursively.
/// Plain file paths are kept as given. The result is sorted and deduplicated.
pub fn find_granules(paths: &[PathBuf]) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut granules = Vec::new();

    for path in paths {
        if !path.is_dir() {
            granules.push(path.clone());
            continue;
        }

        for entry in WalkDir::new(path) {
            let entry = entry?;
            if entry.file_type().is_file() && is_granule_file(entry.path()) {
                granules.push(entry.into_path());
            }
        }
    }

    granules.sort();
    granules.dedup();

    Ok(granules)
}

/// Renders the first `rows` rows of a table.
pub fn format_table_head(batch: &RecordBatch, rows: usize) -> Result<String, ArrowError> {
    let head = batch.slice(0, rows.min(batch.num_rows()));
    Ok(pretty_format_batches(&[head])?.to_string())
}
