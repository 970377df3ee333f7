//! Path normalization and segment splitting.
//!
//! Canonical form: a single leading `/`, no trailing `/` except for the
//! root itself. Empty segments (`//`) are ignored when splitting, so the
//! normalized and raw forms of a path always yield the same segments.

use smallvec::SmallVec;
use std::borrow::Cow;

/// Segments kept on the stack before spilling. Deeper paths still work,
/// they just allocate.
pub const INLINE_SEGMENTS: usize = 16;

/// Stack-allocated segment list for the hot path
pub type SegmentVec<'a> = SmallVec<[&'a str; INLINE_SEGMENTS]>;

/// Canonicalize a raw path.
///
/// Borrows when the input is already canonical.
///
/// ```
/// use brisk_router::path::normalize;
///
/// assert_eq!(normalize("users/"), "/users");
/// assert_eq!(normalize("/a/b//"), "/a/b");
/// assert_eq!(normalize(""), "/");
/// assert_eq!(normalize("/"), "/");
/// ```
pub fn normalize(path: &str) -> Cow<'_, str> {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return Cow::Borrowed("/");
    }
    if trimmed.starts_with('/') {
        Cow::Borrowed(trimmed)
    } else {
        let mut owned = String::with_capacity(trimmed.len() + 1);
        owned.push('/');
        owned.push_str(trimmed);
        Cow::Owned(owned)
    }
}

/// Iterate the non-empty segments of `path`.
#[inline]
pub fn segments(path: &str) -> impl Iterator<Item = &str> + '_ {
    path.split('/').filter(|s| !s.is_empty())
}

/// Collect the segments of `path` without normalizing first.
///
/// Leading and trailing slashes never produce segments, so this gives the
/// same result as `segments(&normalize(path))` without the possible
/// allocation.
#[inline]
pub fn split(path: &str) -> SegmentVec<'_> {
    segments(path).collect()
}
