//! Writing the merged table as TSV.

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tempfile::NamedTempFile;

use crate::error::{MergeError, Result};
use crate::table::MergedTable;

/// Fails with [`MergeError::OutputExists`] if `path` exists and `overwrite` is false.
pub fn ensure_writable(path: &Path, overwrite: bool) -> Result<()> {
    if !overwrite && path.exists() {
        return Err(MergeError::OutputExists {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn write_error(path: &Path) -> impl FnOnce(io::Error) -> MergeError + '_ {
    move |source| MergeError::Write {
        path: path.to_path_buf(),
        source,
    }
}

/// Creates a hidden temporary file next to `path`, so the final rename
/// stays on one filesystem.
fn stage_output(path: &Path) -> Result<NamedTempFile> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let staged = tempfile::Builder::new()
        .prefix(".join-mpa-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(write_error(path))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        staged
            .as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .map_err(write_error(path))?;
    }
    Ok(staged)
}

/// Moves a fully written temporary file to `path`.
///
/// Without `overwrite` the rename refuses to replace an existing file.
fn persist_output(staged: NamedTempFile, path: &Path, overwrite: bool) -> Result<()> {
    let persisted = if overwrite {
        staged.persist(path)
    } else {
        staged.persist_noclobber(path)
    };
    persisted.map(|_| ()).map_err(|e| {
        let source = io::Error::from(e);
        if source.kind() == io::ErrorKind::AlreadyExists {
            MergeError::OutputExists {
                path: path.to_path_buf(),
            }
        } else {
            write_error(path)(source)
        }
    })
}

/// Writes `table` to `path` as tab-separated text with a header row.
///
/// The rows go to a temporary file that replaces `path` only once it is
/// complete, so a failed write leaves no partial output behind. Without
/// `overwrite` an existing file is never replaced.
pub fn write_merged_table(table: &MergedTable, path: &Path, overwrite: bool) -> Result<()> {
    ensure_writable(path, overwrite)?;
    let mut df = table.to_dataframe()?;

    let staged = stage_output(path)?;
    {
        let mut writer = BufWriter::new(staged.as_file());
        CsvWriter::new(&mut writer)
            .include_header(true)
            .with_separator(b'\t')
            .finish(&mut df)?;
        writer.flush().map_err(write_error(path))?;
    }
    persist_output(staged, path, overwrite)?;

    tracing::info!(
        path = %path.display(),
        rows = df.height(),
        samples = table.samples().len(),
        "wrote merged table"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use mpa_ingest::{SampleTable, TaxonKey, detect_lines};
    use tempfile::TempDir;

    fn dir_entries(dir: &TempDir) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    fn single_sample(sample_id: &str) -> MergedTable {
        let header = format!("#SampleID\t{sample_id}");
        let layout = detect_lines(&[header.as_str()]).unwrap();
        let table =
            SampleTable::from_rows("s.tsv", layout, [(TaxonKey::from("X"), Some(1.0))]).unwrap();
        let mut merged = MergedTable::new(table.key_columns().to_vec());
        merged.join_outer(table);
        merged
    }

    #[test]
    fn test_ensure_writable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.tsv");
        assert!(ensure_writable(&path, false).is_ok());

        fs::write(&path, "existing").unwrap();
        assert!(matches!(
            ensure_writable(&path, false),
            Err(MergeError::OutputExists { .. })
        ));
        assert!(ensure_writable(&path, true).is_ok());
    }

    #[test]
    fn test_existing_output_is_not_truncated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.tsv");
        fs::write(&path, "existing").unwrap();

        let table = MergedTable::new(vec!["#SampleID".to_string()]);
        let err = write_merged_table(&table, &path, false).unwrap_err();

        assert!(matches!(err, MergeError::OutputExists { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "existing");
    }

    #[test]
    fn test_write_leaves_only_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.tsv");

        write_merged_table(&single_sample("S1"), &path, false).unwrap();

        assert_eq!(dir_entries(&dir), ["out.tsv"]);
        assert_eq!(fs::read_to_string(&path).unwrap(), "#SampleID\tS1\nX\t1.0\n");
    }

    #[test]
    fn test_failed_write_leaves_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.tsv");

        // Sample column collides with the key column, so the frame cannot be built.
        let err = write_merged_table(&single_sample("#SampleID"), &path, false).unwrap_err();

        assert!(matches!(err, MergeError::DataFrame { .. }));
        assert!(dir_entries(&dir).is_empty());
    }

    #[test]
    fn test_persist_refuses_to_replace_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.tsv");
        fs::write(&path, "existing").unwrap();

        let mut staged = stage_output(&path).unwrap();
        staged.write_all(b"new").unwrap();
        let err = persist_output(staged, &path, false).unwrap_err();

        assert!(matches!(err, MergeError::OutputExists { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "existing");
        assert_eq!(dir_entries(&dir), ["out.tsv"]);
    }

    #[test]
    fn test_persist_replaces_when_overwriting() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.tsv");
        fs::write(&path, "stale").unwrap();

        let mut staged = stage_output(&path).unwrap();
        staged.write_all(b"fresh").unwrap();
        persist_output(staged, &path, true).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "fresh");
        assert_eq!(dir_entries(&dir), ["out.tsv"]);
    }
}
