use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

/// Replace `path` with `contents` so readers never observe a partial file.
///
/// Writes a temp file next to the target and renames it over. When the
/// rename cannot happen (bind-mounted files such as a container's
/// `/etc/hosts`, or no write access to the directory) the file is
/// rewritten in place instead.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    match replace_via_rename(path, contents) {
        Ok(()) => Ok(()),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "atomic replace failed, writing in place");
            fs::write(path, contents)
        }
    }
}

fn replace_via_rename(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;

    if let Ok(meta) = fs::metadata(path) {
        tmp.as_file().set_permissions(meta.permissions())?;
    }

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
