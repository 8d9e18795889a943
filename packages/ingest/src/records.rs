//! Migration flow CSV loading.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use migration_map_flow_models::MigrationRecord;

use crate::IngestError;

/// Reads every record from the migration CSV at `path`.
///
/// # Errors
///
/// Returns an [`IngestError`] if the file cannot be opened or a row
/// cannot be parsed.
pub fn load_migration_records(path: &Path) -> Result<Vec<MigrationRecord>, IngestError> {
    let file = File::open(path)?;
    read_migration_records(file)
}

/// Reads migration records from any CSV source.
///
/// Columns are matched by header name; columns other than `LONFR`,
/// `LATFR`, `LONTO`, `LATTO`, and `PrdMIG` are ignored.
///
/// # Errors
///
/// Returns [`IngestError::Csv`] if a row cannot be parsed.
pub fn read_migration_records(reader: impl Read) -> Result<Vec<MigrationRecord>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let records = reader
        .deserialize()
        .collect::<Result<Vec<MigrationRecord>, _>>()?;

    log::info!("Parsed {} migration records", records.len());

    Ok(records)
}
