use std::fs;
use std::io;
use std::path::Path;

use filetime::FileTime;
use walkdir::WalkDir;

use crate::errors::FixError;

/// Copies every file under `payload_root` into `target_path`, keeping the
/// relative layout and overwriting whatever is already there.
///
/// `target_path` must already exist. Returns the number of files copied.
/// A failure part way through leaves the files copied so far in place.
pub fn apply(payload_root: &Path, target_path: &Path) -> Result<u64, FixError> {
    if !target_path.is_dir() {
        return Err(FixError::filesystem(
            target_path,
            io::Error::new(io::ErrorKind::NotFound, "target directory does not exist"),
        ));
    }

    let mut copied = 0u64;

    for entry in WalkDir::new(payload_root).min_depth(1) {
        let entry = entry.map_err(|err| {
            let path = err
                .path()
                .unwrap_or(payload_root)
                .to_path_buf();
            let source = err
                .into_io_error()
                .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "filesystem loop"));
            FixError::filesystem(path, source)
        })?;
        if entry.file_type().is_dir() {
            continue;
        }

        let relative = entry.path().strip_prefix(payload_root).map_err(|err| {
            FixError::filesystem(entry.path(), io::Error::new(io::ErrorKind::Other, err))
        })?;
        let destination = target_path.join(relative);

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|err| FixError::filesystem(parent, err))?;
        }
        fs::copy(entry.path(), &destination)
            .map_err(|err| FixError::filesystem(&destination, err))?;
        preserve_times(entry.path(), &destination);

        copied += 1;
        tracing::debug!("Copied: {}", relative.display());
    }

    Ok(copied)
}

fn preserve_times(source: &Path, destination: &Path) {
    let Ok(meta) = fs::metadata(source) else {
        return;
    };
    let mtime = FileTime::from_last_modification_time(&meta);
    let atime = FileTime::from_last_access_time(&meta);
    if let Err(err) = filetime::set_file_times(destination, atime, mtime) {
        tracing::debug!(
            "could not preserve timestamps on {}: {}",
            destination.display(),
            err
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("bin/x64")).unwrap();
        fs::create_dir_all(dir.path().join("empty")).unwrap();
        fs::write(dir.path().join("OnlineFix.ini"), b"[OnlineFix]").unwrap();
        fs::write(dir.path().join("bin/x64/winmm.dll"), b"fix").unwrap();
        fs::write(dir.path().join("bin/steam_api64.dll"), b"api").unwrap();
        dir
    }

    #[test]
    fn copies_every_file_with_layout() {
        let source = payload();
        let target = tempfile::tempdir().unwrap();

        let copied = apply(source.path(), target.path()).unwrap();

        assert_eq!(copied, 3);
        assert_eq!(fs::read(target.path().join("bin/x64/winmm.dll")).unwrap(), b"fix");
        assert_eq!(fs::read(target.path().join("bin/steam_api64.dll")).unwrap(), b"api");
        assert!(target.path().join("OnlineFix.ini").is_file());
    }

    #[test]
    fn rerun_overwrites_and_counts_again() {
        let source = payload();
        let target = tempfile::tempdir().unwrap();
        fs::create_dir_all(target.path().join("bin")).unwrap();
        fs::write(target.path().join("bin/steam_api64.dll"), b"original").unwrap();
        fs::write(target.path().join("game.exe"), b"exe").unwrap();

        assert_eq!(apply(source.path(), target.path()).unwrap(), 3);
        assert_eq!(apply(source.path(), target.path()).unwrap(), 3);

        assert_eq!(fs::read(target.path().join("bin/steam_api64.dll")).unwrap(), b"api");
        assert_eq!(fs::read(target.path().join("game.exe")).unwrap(), b"exe");
    }

    #[test]
    fn modification_time_is_preserved() {
        let source = payload();
        let stamp = FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(source.path().join("OnlineFix.ini"), stamp).unwrap();
        let target = tempfile::tempdir().unwrap();

        apply(source.path(), target.path()).unwrap();

        let meta = fs::metadata(target.path().join("OnlineFix.ini")).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&meta).unix_seconds(), 1_600_000_000);
    }

    #[test]
    fn missing_target_is_filesystem_error() {
        let source = payload();
        let parent = tempfile::tempdir().unwrap();
        let target = parent.path().join("not-installed");

        let err = apply(source.path(), &target).unwrap_err();
        assert!(matches!(err, FixError::Filesystem { .. }), "got {err:?}");
        assert!(!target.exists());
    }

    #[test]
    fn empty_payload_copies_nothing() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        assert_eq!(apply(source.path(), target.path()).unwrap(), 0);
    }
}
