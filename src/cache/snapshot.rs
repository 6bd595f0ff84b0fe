//! Snapshot Module
//!
//! Crash-safe export of cache contents to a CSV file.
//!
//! Content is written in full to `<destination>.tmp`, flushed and synced,
//! then renamed over `destination`. A failed write removes the temp file
//! and never touches `destination`.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::codec;
use crate::error::{CacheError, Result};

// == Snapshot Record ==
/// A value that can be written as one snapshot row.
pub trait SnapshotRecord {
    /// Returns the row's fields in header order, unquoted.
    fn to_fields(&self) -> Vec<String>;

    /// Returns the fully quoted row.
    fn to_row(&self) -> String {
        codec::encode_row(self.to_fields())
    }
}

// == Temp Path ==
/// Returns the sibling temp path used while `destination` is being written.
pub fn temp_path(destination: &Path) -> PathBuf {
    let mut name: OsString = destination
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("snapshot"));
    name.push(".tmp");
    destination.with_file_name(name)
}

// == Write Rows ==
/// Writes an optional header followed by `rows`, one per line.
pub fn write_rows<W, I>(out: &mut W, header: Option<&[&str]>, rows: I) -> io::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = String>,
{
    if let Some(header) = header {
        writeln!(out, "{}", codec::encode_row(header))?;
    }
    let mut count = 0;
    for row in rows {
        writeln!(out, "{}", row)?;
        count += 1;
    }
    Ok(count)
}

// == Write Atomic ==
/// Writes a file through a temp sibling and an atomic rename.
///
/// `write` receives a buffered writer on the temp file. The observable file
/// at `destination` is always either its previous content or the complete
/// new content.
pub fn write_atomic<F, T>(destination: &Path, write: F) -> Result<T>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<T>,
{
    let tmp = temp_path(destination);

    let file = File::create(&tmp).map_err(|e| CacheError::io("create temp file", &tmp, e))?;
    let mut out = BufWriter::new(file);

    let written = write(&mut out)
        .and_then(|value| {
            out.flush()?;
            out.get_ref().sync_all()?;
            Ok(value)
        })
        .map_err(|e| {
            discard(&tmp);
            CacheError::io("write temp file", &tmp, e)
        })?;
    drop(out);

    commit(&tmp, destination, |from, to| fs::rename(from, to))?;

    debug!("Snapshot committed to {}", destination.display());
    Ok(written)
}

/// Moves `tmp` onto `destination`. If the first rename fails, removes
/// `destination` and renames once more. The temp file is discarded when
/// neither attempt lands.
fn commit<R>(tmp: &Path, destination: &Path, rename: R) -> Result<()>
where
    R: Fn(&Path, &Path) -> io::Result<()>,
{
    let Err(first) = rename(tmp, destination) else {
        return Ok(());
    };
    warn!(
        "Rename of {} failed ({}), retrying after removing destination",
        tmp.display(),
        first
    );

    match fs::remove_file(destination) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            discard(tmp);
            return Err(CacheError::io("remove stale snapshot", destination, e));
        }
    }
    rename(tmp, destination).map_err(|e| {
        discard(tmp);
        CacheError::io("rename temp file onto", destination, e)
    })
}

fn discard(tmp: &Path) {
    if let Err(e) = fs::remove_file(tmp) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!("Could not remove temp file {}: {}", tmp.display(), e);
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::tempdir;

    struct Row(&'static str, &'static str);

    impl SnapshotRecord for Row {
        fn to_fields(&self) -> Vec<String> {
            vec![self.0.to_string(), self.1.to_string()]
        }
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let tmp = temp_path(Path::new("/data/out/cache.csv"));
        assert_eq!(tmp, PathBuf::from("/data/out/cache.csv.tmp"));
    }

    #[test]
    fn test_to_row_quotes_fields() {
        assert_eq!(Row("1", "a,b").to_row(), "1,\"a,b\"");
    }

    #[test]
    fn test_write_rows_with_header() {
        let mut buf = Vec::new();
        let rows = vec![Row("1", "x").to_row(), Row("2", "y").to_row()];
        let count = write_rows(&mut buf, Some(&["id", "value"][..]), rows).unwrap();

        assert_eq!(count, 2);
        assert_eq!(String::from_utf8(buf).unwrap(), "id,value\n1,x\n2,y\n");
    }

    #[test]
    fn test_write_rows_without_header() {
        let mut buf = Vec::new();
        let count = write_rows(&mut buf, None, vec!["1,x".to_string()]).unwrap();
        assert_eq!(count, 1);
        assert_eq!(String::from_utf8(buf).unwrap(), "1,x\n");
    }

    #[test]
    fn test_write_atomic_creates_file() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("snap.csv");

        write_atomic(&dest, |out| out.write_all(b"hello\n")).unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "hello\n");
        assert!(!temp_path(&dest).exists());
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("snap.csv");
        fs::write(&dest, "old\n").unwrap();

        write_atomic(&dest, |out| out.write_all(b"new\n")).unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "new\n");
    }

    #[test]
    fn test_failed_write_leaves_destination_untouched() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("snap.csv");
        fs::write(&dest, "previous,complete\n").unwrap();
        let before = fs::read(&dest).unwrap();

        let result: Result<()> = write_atomic(&dest, |out| {
            out.write_all(b"partial")?;
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        });

        assert!(matches!(result, Err(CacheError::Io { .. })));
        assert_eq!(fs::read(&dest).unwrap(), before);
        assert!(!temp_path(&dest).exists(), "temp file should be discarded");
    }

    #[test]
    fn test_uncreatable_temp_file_reports_io_error() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("missing_dir").join("snap.csv");

        let result = write_atomic(&dest, |out| out.write_all(b"x"));
        match result {
            Err(CacheError::Io { action, .. }) => assert_eq!(action, "create temp file"),
            other => panic!("expected Io error, got {:?}", other),
        }
        assert!(!dest.exists());
    }

    #[test]
    fn test_commit_retries_after_removing_destination() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("snap.csv");
        let tmp = temp_path(&dest);
        fs::write(&dest, "old\n").unwrap();
        fs::write(&tmp, "new\n").unwrap();

        let attempts = Cell::new(0);
        let result = commit(&tmp, &dest, |from, to| {
            attempts.set(attempts.get() + 1);
            if attempts.get() == 1 {
                // stale destination still present on the first try
                assert!(to.exists());
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked"));
            }
            assert!(!to.exists(), "destination should be removed before retrying");
            fs::rename(from, to)
        });

        assert!(result.is_ok());
        assert_eq!(attempts.get(), 2);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "new\n");
        assert!(!tmp.exists());
    }

    #[test]
    fn test_commit_discards_temp_when_retry_fails() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("snap.csv");
        let tmp = temp_path(&dest);
        fs::write(&dest, "old\n").unwrap();
        fs::write(&tmp, "new\n").unwrap();

        let result = commit(&tmp, &dest, |_, _| {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked"))
        });

        match result {
            Err(CacheError::Io { action, .. }) => assert_eq!(action, "rename temp file onto"),
            other => panic!("expected Io error, got {:?}", other),
        }
        assert!(!tmp.exists());
    }

    #[test]
    fn test_rename_onto_directory_reports_error() {
        // neither rename nor remove_file can replace a directory
        let dir = tempdir().unwrap();
        let dest = dir.path().join("snap.csv");
        fs::create_dir(&dest).unwrap();

        let result = write_atomic(&dest, |out| out.write_all(b"x"));

        assert!(matches!(result, Err(CacheError::Io { .. })));
        assert!(dest.is_dir());
        assert!(!temp_path(&dest).exists());
    }
}
