//! Line-oriented record files.
//!
//! Each file holds one comma-separated record per line. Lines starting with
//! `#` and blank lines are ignored. A line with the wrong number of fields
//! is skipped; a line whose fields fail to parse aborts the rest of the
//! file with the error from the codec.
//!
//! On write, a `# Format: ...` comment line comes first. Fields that contain
//! a comma or a quote are quoted so they read back unchanged.
//!
//! Reading honours the same quoting: a field that begins with `"` is taken
//! as quoted, so a hand-written line like `"Vintage" horn` reads as
//! `Vintage horn`. A quote anywhere else in a field (`12" cymbal`) is kept
//! as written.

pub mod records;

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tracing::{debug, warn};

use crate::error::{Result, StoreError};

pub use records::Location;

/// Outcome of reading one record file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    /// Records handed to the visitor
    pub accepted: usize,
    /// Lines skipped for having the wrong field count
    pub skipped: usize,
}

/// Read every `N`-field record in `path`, passing each to `visit`.
///
/// A missing file is treated as empty.
///
/// # Errors
///
/// - `Io` if the file exists but cannot be opened
/// - `Csv` if the file cannot be decoded (e.g. invalid UTF-8)
/// - any error returned by `visit`, which stops the read
pub fn read_records<const N: usize, F>(path: &Path, mut visit: F) -> Result<ReadStats>
where
    F: FnMut(&[&str; N], Location<'_>) -> Result<()>,
{
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "record file not found, starting empty");
            return Ok(ReadStats::default());
        }
        Err(e) => return Err(StoreError::io(path, e)),
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .flexible(true)
        .from_reader(file);

    let mut stats = ReadStats::default();
    let mut record = StringRecord::new();

    while reader
        .read_record(&mut record)
        .map_err(|e| StoreError::csv(path, e))?
    {
        let line = record.position().map_or(0, |pos| pos.line());

        // Whitespace-only line
        if record.len() == 1 && record[0].trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = record.iter().collect();
        let Ok(fields) = <[&str; N]>::try_from(fields) else {
            debug!(path = %path.display(), line, fields = record.len(), "skipping record with wrong field count");
            stats.skipped += 1;
            continue;
        };

        visit(&fields, Location { file: path, line })?;
        stats.accepted += 1;
    }

    Ok(stats)
}

/// Write `header` followed by one line per row to `path`, replacing it.
///
/// # Returns
///
/// The number of rows written.
pub fn write_records<I, R, T>(path: &Path, header: &str, rows: I) -> Result<usize>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    let mut file = File::create(path).map_err(|e| StoreError::io(path, e))?;
    writeln!(file, "{header}").map_err(|e| StoreError::io(path, e))?;

    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

    let mut written = 0;
    for row in rows {
        writer
            .write_record(row)
            .map_err(|e| StoreError::csv(path, e))?;
        written += 1;
    }
    writer.flush().map_err(|e| StoreError::io(path, e))?;

    debug!(path = %path.display(), written, "record file written");
    Ok(written)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<const N: usize>(path: &Path) -> (Vec<Vec<String>>, ReadStats) {
        let mut rows = Vec::new();
        let stats = read_records::<N, _>(path, |fields, _| {
            rows.push(fields.iter().map(|f| f.to_string()).collect());
            Ok(())
        })
        .unwrap();
        (rows, stats)
    }

    #[test]
    fn test_read_skips_comments_blanks_and_bad_arity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.txt");
        fs::write(
            &path,
            "# Format: username,password,firstName,lastName\n\
             alice,pw,Alice,Smith\n\
             \n\
             bob,pw,Bob\n\
             carol,pw,Carol,Jones,extra\n\
             dave,pw,Dave,Brown\n",
        )
        .unwrap();

        let (rows, stats) = collect::<4>(&path);

        assert_eq!(stats, ReadStats { accepted: 2, skipped: 2 });
        assert_eq!(rows[0], vec!["alice", "pw", "Alice", "Smith"]);
        assert_eq!(rows[1][0], "dave");
    }

    #[test]
    fn test_read_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let (rows, stats) = collect::<4>(&dir.path().join("nope.txt"));

        assert!(rows.is_empty());
        assert_eq!(stats, ReadStats::default());
    }

    #[test]
    fn test_read_visitor_error_stops() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.txt");
        fs::write(&path, "1,a,b,RUSH\n2,a,b,RUSH\n3,a,b,RUSH\n").unwrap();

        let mut seen = Vec::new();
        let result = read_records::<4, _>(&path, |fields, at| {
            if fields[0] == "2" {
                return Err(StoreError::MalformedField {
                    file: at.file.to_path_buf(),
                    line: at.line,
                    field: "orderID",
                    value: fields[0].to_string(),
                });
            }
            seen.push(fields[0].to_string());
            Ok(())
        });

        assert!(matches!(result, Err(StoreError::MalformedField { line: 2, .. })));
        assert_eq!(seen, vec!["1"]);
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("products.txt");

        let rows = vec![
            vec!["Flute", "Woodwind", "300.00", "Gemeinhardt", "5", "Beginner flute"],
            vec!["Tuba", "Brass", "1200.00", "Yamaha", "3", "Tuba, student model"],
        ];
        let written = write_records(&path, "# Format: test", rows.clone()).unwrap();
        assert_eq!(written, 2);

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# Format: test\n"));
        assert!(text.contains("Flute,Woodwind,300.00,Gemeinhardt,5,Beginner flute\n"));

        let (read, stats) = collect::<6>(&path);
        assert_eq!(stats.accepted, 2);
        assert_eq!(read[1][5], "Tuba, student model");
    }

    #[test]
    fn test_read_quotes_only_at_field_start() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.txt");
        fs::write(
            &path,
            "Crash,Percussion,150.00,Zildjian,2,12\" cymbal\n\
             Cornet,Brass,400.00,Besson,1,\"Vintage\" horn\n",
        )
        .unwrap();

        let (rows, stats) = collect::<6>(&path);

        assert_eq!(stats.accepted, 2);
        assert_eq!(rows[0][5], "12\" cymbal");
        assert_eq!(rows[1][5], "Vintage horn");
    }

    #[test]
    fn test_write_quotes_embedded_quote() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.txt");

        let rows = vec![vec!["Crash", "Percussion", "150.00", "Zildjian", "2", "12\" cymbal"]];
        write_records(&path, "# Format: test", rows).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"12\"\" cymbal\""));

        let (read, _) = collect::<6>(&path);
        assert_eq!(read[0][5], "12\" cymbal");
    }
}
