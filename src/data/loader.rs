//! Dataset loading from CSV files.
//!
//! Format:
//! - UTF-8, comma-separated, first row is a header (names are discarded)
//! - every following row is numeric and as wide as the header
//! - the last `num_outputs` columns are targets, everything before them is
//!   an input feature
//!
//! Loading is all-or-nothing: any malformed row fails the whole load.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::debug;

use crate::data::dataset::Dataset;
use crate::error::{NetError, Result};

/// Reads a dataset file. See the module docs for the format.
pub fn load_dataset(path: impl AsRef<Path>, num_outputs: usize) -> Result<Dataset> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| NetError::Data(format!("cannot open {}: {}", path.display(), e)))?;
    let ds = parse_dataset(BufReader::new(file), num_outputs)?;
    debug!(
        path = %path.display(),
        rows = ds.len(),
        inputs = ds.num_inputs(),
        outputs = ds.num_outputs(),
        "loaded dataset"
    );
    Ok(ds)
}

/// Parses a dataset from any reader.
pub fn parse_dataset<R: Read>(reader: R, num_outputs: usize) -> Result<Dataset> {
    if num_outputs == 0 {
        return Err(NetError::Config("number of target columns must be at least 1".into()));
    }

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let width = rdr
        .headers()
        .map_err(|e| NetError::Data(format!("cannot read header: {}", e)))?
        .len();
    if width == 0 {
        return Err(NetError::Data("missing header row".into()));
    }
    if width <= num_outputs {
        return Err(NetError::Data(format!(
            "header has {} columns, need at least {} ({} targets plus 1 input)",
            width,
            num_outputs + 1,
            num_outputs
        )));
    }
    let split = width - num_outputs;

    let mut inputs: Vec<Vec<f64>> = Vec::new();
    let mut targets: Vec<Vec<f64>> = Vec::new();

    for (row_idx, record) in rdr.records().enumerate() {
        let row_num = row_idx + 1;
        let record = record.map_err(|e| NetError::Data(format!("row {}: {}", row_num, e)))?;
        if record.len() != width {
            return Err(NetError::Data(format!(
                "row {}: expected {} columns, got {}",
                row_num,
                width,
                record.len()
            )));
        }
        let values = record
            .iter()
            .map(|cell| {
                cell.parse::<f64>().map_err(|_| {
                    NetError::Data(format!("row {}: '{}' is not a valid number", row_num, cell))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        let (x, t) = values.split_at(split);
        inputs.push(x.to_vec());
        targets.push(t.to_vec());
    }

    if inputs.is_empty() {
        return Err(NetError::Data("dataset contains no data rows".into()));
    }

    Dataset::new(inputs, targets)
}
