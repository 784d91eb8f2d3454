//! CSV parsing for import files.

use csv::{ReaderBuilder, Trim};

use super::kind::ImportKind;
use super::row::RowRecord;
use super::ImportError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse `bytes` into row records for `kind`.
///
/// The first record is always treated as the header row and discarded, whatever
/// its width; the remaining records are mapped positionally onto
/// [`ImportKind::headers`]. Extra trailing columns are ignored, missing ones
/// fail the file. Blank lines are skipped.
pub fn parse_rows(kind: ImportKind, bytes: &[u8]) -> Result<Vec<RowRecord>, ImportError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let headers = kind.headers();

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for (number, record) in reader.records().enumerate().skip(1) {
        let record = record.map_err(|e| ImportError::Parse(format!("fila {number}: {e}")))?;
        if record.len() < headers.len() {
            return Err(ImportError::Parse(format!(
                "fila {number}: se esperaban {} columnas ({}), se encontraron {}",
                headers.len(),
                headers.join(", "),
                record.len()
            )));
        }
        let values = record.iter().take(headers.len()).map(str::to_string).collect();
        rows.push(RowRecord::new(number, headers, values));
    }
    Ok(rows)
}
