//! Object identifier extraction from remote store URLs.
//!
//! Store URLs look like
//! `https://cdn.example.com/<cloud>/image/upload/v1700000000/<folder>/<name>.<ext>`.
//! The segment directly after `upload/` is a version/transform marker; the
//! deletable object path is everything after that marker with the file
//! extension stripped.

/// Extract the first path segment after the literal `upload/`: the content
/// between `upload/` and the next `/` or `?`.
pub fn extract_public_id(url: &str) -> Option<&str> {
    let start = url.find("upload/")? + "upload/".len();
    let rest = &url[start..];
    let end = rest.find(['/', '?']).unwrap_or(rest.len());
    let id = &rest[..end];
    (!id.is_empty()).then_some(id)
}

/// Resolve the deletable object path from a store URL.
///
/// Locates the marker segment found by [`extract_public_id`], takes the
/// remainder past it (dropping the separator), and strips everything from
/// the first `.` on. Returns `None` for URLs that do not match the store's
/// shape — callers treat that as "nothing to delete".
pub fn object_path_from_url(url: &str) -> Option<String> {
    let marker = extract_public_id(url)?;
    let (_, after) = url.split_once(marker)?;
    if after.len() < 2 {
        return None;
    }
    let path = after[1..].split(['.', '?']).next().unwrap_or("");
    (!path.is_empty()).then(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_the_segment_after_upload() {
        assert_eq!(
            extract_public_id("https://cdn.example.com/demo/image/upload/v17/categories/a.png"),
            Some("v17")
        );
        assert_eq!(
            extract_public_id("https://cdn.example.com/demo/image/upload/v17?sig=x"),
            Some("v17")
        );
    }

    #[test]
    fn urls_without_upload_segment_do_not_match() {
        assert_eq!(extract_public_id("https://cdn.example.com/demo/a.png"), None);
        assert_eq!(extract_public_id(""), None);
        assert_eq!(extract_public_id("https://cdn.example.com/upload/"), None);
    }

    #[test]
    fn object_path_strips_version_and_extension() {
        assert_eq!(
            object_path_from_url(
                "https://cdn.example.com/demo/image/upload/v1700000000/categories/abc123.png"
            ),
            Some("categories/abc123".to_string())
        );
    }

    #[test]
    fn object_path_ignores_query_strings() {
        assert_eq!(
            object_path_from_url(
                "https://cdn.example.com/demo/image/upload/v17/banners/hero.webp?sig=zzz"
            ),
            Some("banners/hero".to_string())
        );
    }

    #[test]
    fn object_path_requires_something_past_the_marker() {
        // The marker segment is the final one: nothing deletable remains.
        assert_eq!(
            object_path_from_url("https://cdn.example.com/demo/image/upload/abc.png"),
            None
        );
        assert_eq!(object_path_from_url("not a url"), None);
    }
}
