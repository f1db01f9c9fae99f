use crate::error::DataLoadError;
use crate::types::{
    Dataset, PermitRecord, RawRow, COL_APPROVE_BEYOND, COL_APPROVE_WITHIN, COL_DISTRICT,
    COL_MANDAL, COL_RECEIVED, COL_REJECT_BEYOND, COL_REJECT_WITHIN, REQUIRED_COLUMNS,
};
use crate::util::{parse_count, CountParseError};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Read a permission CSV from disk.
pub fn load(path: impl AsRef<Path>) -> Result<Dataset, DataLoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let data = load_from_reader(file)?;
    debug!(path = %path.display(), rows = data.len(), "dataset loaded");
    Ok(data)
}

/// Read a permission CSV from any byte source.
///
/// The header must name every required column; extra columns are ignored.
/// The first bad row aborts the load so a partial dataset is never returned.
pub fn load_from_reader<R: Read>(reader: R) -> Result<Dataset, DataLoadError> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|source| DataLoadError::Csv { row: None, source })?;
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DataLoadError::MissingColumns(missing));
    }

    let mut data = Vec::new();
    for (idx, result) in rdr.deserialize::<RawRow>().enumerate() {
        let row = idx as u64 + 1;
        let raw = result.map_err(|source| DataLoadError::Csv {
            row: Some(row),
            source,
        })?;
        data.push(clean_row(raw, row)?);
    }
    Ok(data)
}

fn clean_row(raw: RawRow, row: u64) -> Result<PermitRecord, DataLoadError> {
    Ok(PermitRecord {
        district_name: required_text(raw.district_name, row, COL_DISTRICT)?,
        mandal_name: required_text(raw.mandal_name, row, COL_MANDAL)?,
        total_received: required_count(raw.total_received.as_deref(), row, COL_RECEIVED)?,
        approve_within_sla: required_count(
            raw.approve_within_sla.as_deref(),
            row,
            COL_APPROVE_WITHIN,
        )?,
        approve_beyond_sla: required_count(
            raw.approve_beyond_sla.as_deref(),
            row,
            COL_APPROVE_BEYOND,
        )?,
        reject_within_sla: required_count(raw.reject_within_sla.as_deref(), row, COL_REJECT_WITHIN)?,
        reject_beyond_sla: required_count(raw.reject_beyond_sla.as_deref(), row, COL_REJECT_BEYOND)?,
    })
}

// Names are kept verbatim since grouping is an exact string match.
fn required_text(
    value: Option<String>,
    row: u64,
    column: &'static str,
) -> Result<String, DataLoadError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(DataLoadError::MissingValue { row, column }),
    }
}

fn required_count(
    value: Option<&str>,
    row: u64,
    column: &'static str,
) -> Result<u64, DataLoadError> {
    parse_count(value).map_err(|e| match e {
        CountParseError::Missing => DataLoadError::MissingValue { row, column },
        CountParseError::Invalid => DataLoadError::InvalidValue {
            row,
            column,
            value: value.unwrap_or_default().to_string(),
        },
    })
}
