//! I/O utility functions

use std::fs;
use std::io;
use std::path::Path;

/// Write content to a file using write-then-rename.
///
/// A report or scenario is never left half-written if the process dies
/// mid-write. The temporary file sits next to the target so the rename stays
/// on one filesystem.
pub fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let temp_path = temp_path_for(path);
    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

fn temp_path_for(path: &Path) -> std::path::PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
