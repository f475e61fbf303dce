use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Turn an archive entry name into a relative path that stays inside the destination.
///
/// Both `/` and `\` are treated as separators. `.` segments are dropped and `..`
/// pops the previous segment; popping past the top, or any absolute name, is a
/// zip-slip attempt and yields [`Error::PathTraversal`]. Drive prefixes such as
/// `C:` only count as absolute where the platform reads them that way.
///
/// The result may be empty (e.g. `./`), which callers treat as the destination itself.
pub fn sanitize_entry_name(name: &str) -> Result<PathBuf> {
    if name.contains('\0') {
        return Err(Error::InvalidEntryName {
            entry: name.to_string(),
        });
    }

    let traversal = || Error::PathTraversal {
        entry: name.to_string(),
    };

    let unified = name.replace('\\', "/");
    if unified.starts_with('/') {
        return Err(traversal());
    }

    let mut result = PathBuf::new();
    for component in Path::new(&unified).components() {
        match component {
            Component::Normal(part) => result.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !result.pop() {
                    return Err(traversal());
                }
            }
            Component::RootDir | Component::Prefix(_) => return Err(traversal()),
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_plain_paths() {
        assert_eq!(sanitize_entry_name("a.txt").unwrap(), Path::new("a.txt"));
        assert_eq!(
            sanitize_entry_name("dir/sub/b.txt").unwrap(),
            Path::new("dir/sub/b.txt")
        );
        assert_eq!(sanitize_entry_name("dir/").unwrap(), Path::new("dir"));
    }

    #[test]
    fn normalizes_dots_and_backslashes() {
        assert_eq!(
            sanitize_entry_name("./dir//x/../b.txt").unwrap(),
            Path::new("dir/b.txt")
        );
        assert_eq!(
            sanitize_entry_name("dir\\b.txt").unwrap(),
            Path::new("dir/b.txt")
        );
        assert_eq!(sanitize_entry_name("./").unwrap(), PathBuf::new());
    }

    #[test]
    fn rejects_parent_escape() {
        for name in ["../evil.txt", "../../evil.txt", "a/../../evil.txt", "..\\evil.txt"] {
            let err = sanitize_entry_name(name).unwrap_err();
            assert!(matches!(err, Error::PathTraversal { .. }), "{name}");
        }
    }

    #[test]
    fn rejects_absolute_names() {
        for name in ["/etc/passwd", "\\windows\\system32"] {
            let err = sanitize_entry_name(name).unwrap_err();
            assert!(matches!(err, Error::PathTraversal { .. }), "{name}");
        }
    }

    #[cfg(windows)]
    #[test]
    fn rejects_drive_prefixes() {
        for name in ["C:\\evil.txt", "C:evil.txt", "a:b.txt"] {
            let err = sanitize_entry_name(name).unwrap_err();
            assert!(matches!(err, Error::PathTraversal { .. }), "{name}");
        }
    }

    #[cfg(unix)]
    #[test]
    fn colons_are_ordinary_on_unix() {
        assert_eq!(sanitize_entry_name("a:b.txt").unwrap(), Path::new("a:b.txt"));
        assert_eq!(
            sanitize_entry_name("C:\\notes.txt").unwrap(),
            Path::new("C:/notes.txt")
        );
    }

    #[test]
    fn rejects_nul() {
        let err = sanitize_entry_name("a\0b").unwrap_err();
        assert!(matches!(err, Error::InvalidEntryName { .. }));
    }
}
