use std::fs;
use std::io::{BufWriter, Write as _};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CoreError;

/// Append records to a JSON-lines file, one object per line.
pub fn append<'a, T, I>(path: &Path, records: I) -> Result<usize, CoreError>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let mut out = BufWriter::new(file);
    let mut written = 0;
    for record in records {
        let line = serde_json::to_string(record)?;
        out.write_all(line.as_bytes())?;
        out.write_all(b"\n")?;
        written += 1;
    }
    out.flush()?;
    Ok(written)
}

/// Read every parseable record from a JSON-lines file. A missing file is
/// empty; malformed lines are skipped.
pub fn read_tolerant<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, CoreError> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut records = Vec::new();
    for (lineno, line) in data.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::debug!("Skipping malformed line {} in {}: {e}", lineno + 1, path.display());
            }
        }
    }
    Ok(records)
}
