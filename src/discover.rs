use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Return the first regular file in `dir` whose name ends in `.zip` (any case).
///
/// The directory is not searched recursively. Which archive wins when there
/// are several depends on the platform's directory enumeration order.
pub fn find_first_zip(dir: &Path) -> io::Result<Option<PathBuf>> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        let is_zip = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.to_ascii_lowercase().ends_with(".zip"));
        if !is_zip {
            continue;
        }

        // Follows symlinks, so a link to an archive counts
        if path.is_file() {
            debug!(archive = %path.display(), "found archive");
            return Ok(Some(path));
        }
    }

    Ok(None)
}
