//! Path sanitation shared by every facade operation.

/// Clean a path so it uses forward slashes, even when it was written with
/// Windows separators or a drive prefix.
///
/// Blank input is returned unchanged. Otherwise a leading `X:` volume is
/// stripped, backslashes become slashes, the path is reduced to its shortest
/// lexical form and a trailing `/` on the input survives as exactly one
/// trailing `/` on the output.
///
/// ```
/// use bucketfs::sanitize;
///
/// assert_eq!(sanitize(r"C:\photos\2024\"), "/photos/2024/");
/// assert_eq!(sanitize("/a/../b/./c"), "/b/c");
/// ```
pub fn sanitize(name: &str) -> String {
    if name.trim().is_empty() {
        return name.to_string();
    }

    let name = strip_volume(name).replace('\\', "/");
    let has_trailing_slash = name.ends_with('/');
    let mut cleaned = clean(&name);
    if has_trailing_slash && !cleaned.ends_with('/') {
        cleaned.push('/');
    }
    cleaned
}

fn strip_volume(name: &str) -> &str {
    let bytes = name.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        &name[2..]
    } else {
        name
    }
}

/// Lexical cleanup: collapse repeated separators, drop `.` segments and
/// resolve `..` against the preceding segment. `..` cannot climb above the
/// root of an absolute path; relative paths keep leading `..` segments.
/// An empty result becomes `.` (or `/` for absolute input).
pub(crate) fn clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            _ => parts.push(segment),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Last element of a path, ignoring trailing slashes.
pub(crate) fn base(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return if path.is_empty() { "." } else { "/" };
    }
    match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Object key for a sanitized path: the store has no leading separator.
pub(crate) fn key_of(path: &str) -> &str {
    path.trim_start_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("   "), "   ");
        assert_eq!(sanitize(r"C:\a\b"), "/a/b");
        assert_eq!(sanitize("/a/../b/"), "/b/");
        assert_eq!(sanitize(r"a\\b\\"), "a/b/");
        assert_eq!(sanitize("a//b///c"), "a/b/c");
        assert_eq!(sanitize("./a/./b"), "a/b");
        assert_eq!(sanitize("/"), "/");
        assert_eq!(sanitize("dir/"), "dir/");
        assert_eq!(sanitize("dir"), "dir");
    }

    #[test]
    fn test_sanitize_idempotent() {
        let inputs = [
            "",
            " ",
            "\t",
            r"C:\a\b",
            "/a/../b/",
            r"a\\b\\",
            "../../x/",
            "/..",
            "./",
            "d:relative\\path",
            "a/b/../../..",
            "//double//slash//",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_trailing_separator() {
        assert!(sanitize("dir/").ends_with('/'));
        assert!(!sanitize("dir").ends_with('/'));
        assert!(sanitize(r"dir\").ends_with('/'));
    }

    #[test]
    fn test_clean() {
        assert_eq!(clean(""), ".");
        assert_eq!(clean("/../a"), "/a");
        assert_eq!(clean("../a"), "../a");
        assert_eq!(clean("a/../.."), "..");
    }

    #[test]
    fn test_base() {
        assert_eq!(base("/a/b.txt"), "b.txt");
        assert_eq!(base("a/dir/"), "dir");
        assert_eq!(base("/"), "/");
        assert_eq!(base(""), ".");
    }

    #[test]
    fn test_key_of() {
        assert_eq!(key_of("/a/b"), "a/b");
        assert_eq!(key_of("a/b/"), "a/b/");
        assert_eq!(key_of("/"), "");
    }
}
