use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};
use skyql_error::{Result, SkyqlError};

/// Read `chunk,subchunk` rows, one per line.
///
/// Blank lines and lines starting with `#` are skipped.
pub fn read_rows(reader: impl Read) -> Result<Vec<(i64, i64)>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(row_error)?;
        // Whitespace-only lines.
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        let line = record.position().map(|p| p.line() as usize).unwrap_or_default();
        rows.push(
            parse_row(&record).map_err(|message| SkyqlError::InvalidRow { line, message })?,
        );
    }
    Ok(rows)
}

fn row_error(err: csv::Error) -> SkyqlError {
    let line = err
        .position()
        .map(|p| p.line() as usize)
        .unwrap_or_default();
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(err) => SkyqlError::Io(err),
        _ => SkyqlError::InvalidRow { line, message },
    }
}

fn parse_row(record: &StringRecord) -> Result<(i64, i64), String> {
    if record.len() != 2 {
        let fields: Vec<_> = record.iter().collect();
        return Err(format!(
            "expected 'chunk,subchunk', got '{}'",
            fields.join(",")
        ));
    }

    let parse = |s: &str| {
        s.parse::<i64>()
            .map_err(|e| format!("'{s}' is not an integer: {e}"))
    };
    Ok((parse(&record[0])?, parse(&record[1])?))
}
