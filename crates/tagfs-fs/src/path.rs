//! Absolute path handling.
//!
//! Paths are `/`-separated and always absolute after normalisation: `.` and
//! empty segments are dropped, `..` pops a segment (and stops at the root).
//! `normalize("a/./b/../c")` is `/a/c`.

use crate::errors::{FsError, Result};

/// The implicit root directory
pub const ROOT: &str = "/";

/// Clean `path` and make it absolute.
pub fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }

    if parts.is_empty() {
        ROOT.to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}

/// True when `path` normalises to the root.
pub fn is_root(path: &str) -> bool {
    normalize(path) == ROOT
}

/// Ordered segments of the normalised path, root first. Empty for `/`.
pub fn segments(path: &str) -> Vec<String> {
    normalize(path)
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split into `(dirname, basename)` of the normalised path.
///
/// The root splits into `("/", "")`.
pub fn split(path: &str) -> (String, String) {
    let path = normalize(path);
    match path.rsplit_once('/') {
        Some(("", name)) => (ROOT.to_string(), name.to_string()),
        Some((dir, name)) => (dir.to_string(), name.to_string()),
        None => (ROOT.to_string(), String::new()),
    }
}

/// Join a normalised directory and a single name.
pub fn join(dir: &str, name: &str) -> String {
    if dir == ROOT {
        format!("/{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Check `name` is usable as a single path segment.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(FsError::invalid_argument("missing filename"));
    }
    if name == "." || name == ".." {
        return Err(FsError::invalid_argument(format!(
            "'{name}' is not a valid name"
        )));
    }
    if name.contains('/') {
        return Err(FsError::invalid_argument(format!(
            "name '{name}' contains a path separator"
        )));
    }
    if name.contains('\0') {
        return Err(FsError::invalid_argument("name contains a NUL byte"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("a"), "/a");
        assert_eq!(normalize("/a/b/"), "/a/b");
        assert_eq!(normalize("//a//b"), "/a/b");
        assert_eq!(normalize("a/./b/../c"), "/a/c");
        assert_eq!(normalize("/../.."), "/");
        assert_eq!(normalize("/a/../../b"), "/b");
    }

    #[test]
    fn test_split() {
        assert_eq!(split("/"), ("/".to_string(), String::new()));
        assert_eq!(split("/a"), ("/".to_string(), "a".to_string()));
        assert_eq!(split("a/b/file.txt"), ("/a/b".to_string(), "file.txt".to_string()));
        assert_eq!(split("/a/b/"), ("/a".to_string(), "b".to_string()));
    }

    #[test]
    fn test_segments_and_join() {
        assert_eq!(segments("/a/b/c"), vec!["a", "b", "c"]);
        assert!(segments("/").is_empty());
        assert_eq!(join("/", "a"), "/a");
        assert_eq!(join("/a", "b"), "/a/b");
        assert!(is_root("/x/.."));
        assert!(!is_root("/x"));
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("file.txt").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name(".").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("a\0b").is_err());
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(path in "[a-z./]{0,24}") {
            let once = normalize(&path);
            prop_assert_eq!(normalize(&once), once.clone());
            prop_assert!(once.starts_with('/'));
            prop_assert!(once == "/" || !once.ends_with('/'));
            prop_assert!(!once.contains("//"));
        }

        #[test]
        fn split_then_join_roundtrips(segs in proptest::collection::vec("[a-z]{1,6}", 1..5)) {
            let path = format!("/{}", segs.join("/"));
            let (dir, name) = split(&path);
            prop_assert_eq!(join(&dir, &name), path);
            prop_assert_eq!(segments(&dir).len(), segs.len() - 1);
        }
    }
}
