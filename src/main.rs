use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use arrow::csv::Writer;
use arrow::record_batch::RecordBatch;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use atl03_reader::bbox::Bbox;
use atl03_reader::spatial::{extract_rings, polygon_from_ring};
use atl03_reader::utils::{find_granules, format_table_head};
use atl03_reader::{Config, GranuleTableBuilder};

#[derive(Parser, Debug)]
#[command(version, about = "Read ICESat-2 ATL03 granules into tables")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read the configured beams of each granule into a table
    Read {
        /// JSON run configuration; defaults read every beam with the standard variables
        #[arg(short, long, env = "ATL03_CONFIG")]
        config: Option<PathBuf>,

        /// Number of rows to print per table
        #[arg(long, default_value_t = 10)]
        rows: usize,

        /// Write each table to <dir>/<granule>_<beam>.csv
        #[arg(long)]
        csv_dir: Option<PathBuf>,

        /// Granule files or directories containing them
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Print the footprint polygons of a saved CMR search result
    Footprint {
        /// JSON file holding one UMM-G record or a list of them
        record: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Read {
            config,
            rows,
            csv_dir,
            paths,
        } => {
            let config = match config {
                Some(path) => Config::from_file(path)?,
                None => Config::default(),
            };
            read_granules(&config, &paths, rows, csv_dir.as_deref())
        }
        Command::Footprint { record } => print_footprint(&record),
    }
}

fn read_granules(
    config: &Config,
    paths: &[PathBuf],
    rows: usize,
    csv_dir: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let granules = find_granules(paths)?;
    info!(granules = granules.len(), beams = config.beams().len(), "reading granules");

    if let Some(dir) = csv_dir {
        fs::create_dir_all(dir)?;
    }

    let builder = GranuleTableBuilder::from_config(config);
    let mut failures = 0;

    for granule in &granules {
        for &beam in config.beams() {
            let table = match builder.build(granule, beam, config.request()) {
                Ok(table) => table,
                Err(e) => {
                    error!(granule = %granule.display(), %beam, "{}", e);
                    failures += 1;
                    continue;
                }
            };

            println!(
                "{} {}: {} rows x {} columns",
                granule.display(),
                beam,
                table.num_rows(),
                table.num_columns()
            );
            println!("{}", format_table_head(&table, rows)?);

            if let Some(dir) = csv_dir {
                let stem = granule
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .unwrap_or("granule");
                write_csv(&dir.join(format!("{}_{}.csv", stem, beam)), &table)?;
            }
        }
    }

    info!(
        tables = granules.len() * config.beams().len() - failures,
        failures, "done"
    );

    Ok(())
}

fn write_csv(path: &Path, table: &RecordBatch) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = Writer::new(File::create(path)?);
    writer.write(table)?;
    info!(path = %path.display(), "wrote table");

    Ok(())
}

fn print_footprint(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let reader = BufReader::new(File::open(path)?);
    let value: Value = serde_json::from_reader(reader)?;

    let records = match value {
        Value::Array(records) => records,
        record => vec![record],
    };

    for record in &records {
        let rings = extract_rings(record)?;
        let granule_ur = record
            .pointer("/umm/GranuleUR")
            .and_then(Value::as_str)
            .unwrap_or("<unnamed granule>");
        println!("{}", granule_ur);

        for ring in &rings {
            println!("  {}", polygon_from_ring(ring)?.wkt()?);
        }

        if let Some(bbox) = Bbox::from_rings(&rings)? {
            println!(
                "  bbox: xmin={} xmax={} ymin={} ymax={}",
                bbox.xmin, bbox.xmax, bbox.ymin, bbox.ymax
            );
        }
    }

    Ok(())
}
