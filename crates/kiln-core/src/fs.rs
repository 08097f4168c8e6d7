use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Recursively collect files under `root` whose extension is `extension` (no leading dot).
///
/// Missing directories are treated as empty. The result is sorted so callers
/// that feed it into generation get a deterministic order.
pub fn collect_files_with_extension(root: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let extension = extension.trim_start_matches('.');
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(err) => return Err(err),
        };

        for entry in entries {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let path = entry.path();

            if file_type.is_dir() {
                pending.push(path);
                continue;
            }

            if file_type.is_file() && path.extension().is_some_and(|ext| ext == extension) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// The extension of `path` with its leading dot (`.java`), as providers and
/// staleness checks key it. `None` for extensionless or non-UTF-8 names.
pub fn dotted_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
}

pub fn collect_java_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    collect_files_with_extension(root, "java")
}

/// Last-modified time of `path` in milliseconds since the Unix epoch.
pub fn modified_millis(path: &Path) -> io::Result<u64> {
    let modified = fs::metadata(path)?.modified()?;
    Ok(system_time_millis(modified))
}

/// Clamps times before the epoch to `0`.
pub fn system_time_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis().min(u64::MAX as u128) as u64)
        .unwrap_or(0)
}

/// Writes `contents` to `path`, creating parent directories as needed.
pub fn write_creating_dirs(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, contents)
}
