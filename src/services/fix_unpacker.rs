use std::fs::{self, File};
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::errors::FixError;
use crate::models::AppId;

pub const EXTRACT_DIR_NAME: &str = "extracted";

type UnpackResult<T> = std::result::Result<T, FixError>;

/// Extracts `archive_path` into `<workspace>/extracted` and returns the
/// payload root: the `<app_id>` folder when the archive wraps its content in
/// one, the extraction root otherwise.
pub fn unpack(archive_path: &Path, workspace: &Path, app_id: AppId) -> UnpackResult<PathBuf> {
    let extract_root = workspace.join(EXTRACT_DIR_NAME);
    fs::create_dir_all(&extract_root).map_err(|err| FixError::filesystem(&extract_root, err))?;

    let archive_file = File::open(archive_path).map_err(|err| FixError::filesystem(archive_path, err))?;
    let mut archive =
        ZipArchive::new(archive_file).map_err(|err| FixError::CorruptArchive(err.to_string()))?;

    let extracted = extract_all(&mut archive, &extract_root)?;
    tracing::info!(
        "Extracted {} entries to: {}",
        extracted,
        extract_root.display()
    );

    Ok(resolve_payload_root(&extract_root, app_id))
}

pub fn resolve_payload_root(extract_root: &Path, app_id: AppId) -> PathBuf {
    let wrapped = extract_root.join(app_id.to_string());
    if wrapped.is_dir() {
        wrapped
    } else {
        extract_root.to_path_buf()
    }
}

fn extract_all<R: Read + Seek>(archive: &mut ZipArchive<R>, root: &Path) -> UnpackResult<usize> {
    let mut extracted = 0usize;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|err| FixError::CorruptArchive(err.to_string()))?;

        let relative = entry
            .enclosed_name()
            .map(Path::to_path_buf)
            .ok_or_else(|| {
                FixError::CorruptArchive(format!(
                    "entry {:?} points outside the archive root",
                    entry.name()
                ))
            })?;
        let out_path = root.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|err| FixError::filesystem(&out_path, err))?;
        } else {
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent).map_err(|err| FixError::filesystem(parent, err))?;
            }
            let mut outfile =
                File::create(&out_path).map_err(|err| FixError::filesystem(&out_path, err))?;
            copy_entry(&mut entry, &mut outfile, &out_path)?;
        }

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            // Keep owner rwx so the merge step can always read what we wrote.
            let permissions = fs::Permissions::from_mode((mode & 0o777) | 0o700);
            fs::set_permissions(&out_path, permissions)
                .map_err(|err| FixError::filesystem(&out_path, err))?;
        }

        extracted += 1;
    }

    Ok(extracted)
}

// Read failures mean a damaged entry, write failures mean a local disk problem.
fn copy_entry(reader: &mut impl Read, writer: &mut impl Write, out_path: &Path) -> UnpackResult<u64> {
    let mut buffer = [0u8; 65536];
    let mut written = 0u64;
    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|err| FixError::CorruptArchive(format!("{}: {}", out_path.display(), err)))?;
        if bytes_read == 0 {
            break;
        }
        writer
            .write_all(&buffer[..bytes_read])
            .map_err(|err| FixError::filesystem(out_path, err))?;
        written += bytes_read as u64;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, FileOptions::default()).unwrap();
            } else {
                writer.start_file(*name, FileOptions::default()).unwrap();
                writer.write_all(contents).unwrap();
            }
        }
        let bytes = writer.finish().unwrap().into_inner();
        fs::write(path, bytes).unwrap();
    }

    fn app(id: u32) -> AppId {
        AppId::new(id).unwrap()
    }

    #[test]
    fn wrapped_payload_resolves_to_app_id_folder() {
        let workspace = tempfile::tempdir().unwrap();
        let archive = workspace.path().join("123.zip");
        write_zip(
            &archive,
            &[("123/", b""), ("123/game.dll", b"dll"), ("123/bin/steam_api64.dll", b"api")],
        );

        let root = unpack(&archive, workspace.path(), app(123)).unwrap();

        assert_eq!(root, workspace.path().join(EXTRACT_DIR_NAME).join("123"));
        assert_eq!(fs::read(root.join("bin/steam_api64.dll")).unwrap(), b"api");
    }

    #[test]
    fn flat_payload_resolves_to_extraction_root() {
        let workspace = tempfile::tempdir().unwrap();
        let archive = workspace.path().join("55.zip");
        write_zip(&archive, &[("OnlineFix.ini", b"[x]"), ("winmm.dll", b"dll")]);

        let root = unpack(&archive, workspace.path(), app(55)).unwrap();

        assert_eq!(root, workspace.path().join(EXTRACT_DIR_NAME));
        assert!(root.join("OnlineFix.ini").is_file());
    }

    #[test]
    fn folder_named_after_other_id_is_not_the_payload() {
        let workspace = tempfile::tempdir().unwrap();
        let archive = workspace.path().join("12.zip");
        write_zip(&archive, &[("123/file.txt", b"x")]);

        let root = unpack(&archive, workspace.path(), app(12)).unwrap();
        assert_eq!(root, workspace.path().join(EXTRACT_DIR_NAME));
    }

    #[test]
    fn non_zip_input_is_corrupt_archive() {
        let workspace = tempfile::tempdir().unwrap();
        let archive = workspace.path().join("9.zip");
        fs::write(&archive, b"<html>rate limited</html>").unwrap();

        let err = unpack(&archive, workspace.path(), app(9)).unwrap_err();
        assert!(matches!(err, FixError::CorruptArchive(_)), "got {err:?}");
    }

    #[test]
    fn entries_escaping_root_are_rejected() {
        let workspace = tempfile::tempdir().unwrap();
        let archive = workspace.path().join("4.zip");
        write_zip(&archive, &[("../evil.dll", b"x")]);

        let err = unpack(&archive, workspace.path(), app(4)).unwrap_err();
        assert!(matches!(err, FixError::CorruptArchive(_)), "got {err:?}");
        assert!(!workspace.path().join("evil.dll").exists());
    }
}
