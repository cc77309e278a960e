//! Writing pages and caches with backups

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tracing::{info, warn};

/// Format of the stamp inserted before a file's extension
pub const DATESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// `path` with `~` appended
#[must_use]
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push("~");
    PathBuf::from(name)
}

/// Move an existing `path` to `path~`, replacing any older backup
///
/// Failures are reported and otherwise ignored so the new file still gets written.
pub fn backup_file(path: &Path) {
    if !path.exists() {
        return;
    }
    let backup = backup_path(path);
    if backup.exists() {
        if let Err(err) = fs::remove_file(&backup) {
            warn!("Failed to remove old backup {}: {err}", backup.display());
        }
    }
    if let Err(err) = fs::rename(path, &backup) {
        warn!("Failed to back up {}: {err}", path.display());
    }
}

/// `dir/stem{stamp}.ext` for `dir/stem.ext`
#[must_use]
pub fn datestamped_path(path: &Path, when: &DateTime<Local>) -> PathBuf {
    let stamp = when.format(DATESTAMP_FORMAT).to_string();
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    let name = match path.extension() {
        Some(ext) => format!("{stem}{stamp}.{}", ext.to_string_lossy()),
        None => format!("{stem}{stamp}"),
    };
    path.with_file_name(name)
}

/// Write `contents` to `path`, keeping the previous version as `path~`
pub fn write_with_backup(contents: &str, path: &Path) -> Result<()> {
    backup_file(path);
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(())
}

/// Write with a backup, plus a datestamped copy when `datestamp` is set
pub fn write_with_datestamp(contents: &str, path: &Path, datestamp: bool) -> Result<()> {
    write_with_backup(contents, path)?;
    if datestamp {
        let copy = datestamped_path(path, &Local::now());
        fs::write(&copy, contents)
            .with_context(|| format!("Failed to write {}", copy.display()))?;
        info!("Wrote {}", copy.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn stamp_goes_before_the_extension() {
        let when = Local
            .with_ymd_and_hms(2009, 3, 7, 14, 5, 9)
            .single()
            .expect("valid time");
        assert_eq!(
            datestamped_path(Path::new("/www/index.html"), &when),
            PathBuf::from("/www/index20090307-140509.html")
        );
        assert_eq!(
            datestamped_path(Path::new("cache"), &when),
            PathBuf::from("cache20090307-140509")
        );
    }

    #[test]
    fn rewriting_keeps_one_backup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("index.html");

        write_with_backup("one", &path).expect("first");
        assert!(!backup_path(&path).exists());

        write_with_backup("two", &path).expect("second");
        write_with_backup("three", &path).expect("third");
        assert_eq!(fs::read_to_string(&path).expect("read"), "three");
        assert_eq!(fs::read_to_string(backup_path(&path)).expect("read"), "two");
    }

    #[test]
    fn datestamped_copy_is_written() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cache.xml");
        write_with_datestamp("<posts/>", &path, true).expect("write");

        let names: Vec<String> = fs::read_dir(dir.path())
            .expect("list")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names
            .iter()
            .any(|name| name.starts_with("cache2") && name.ends_with(".xml")));
    }
}
