//! Datastream identifier generation
//!
//! Generated ids follow `PREFIX<integer>`: the next id for a prefix is
//! `prefix{count + 1}` where `count` is the number of existing ids
//! matching the pattern. If ids were deleted out of sequence the result
//! can collide with a surviving id; callers must not rely on strict
//! non-collision under deletion.

/// Check whether an id is `prefix` followed only by ASCII digits
/// (including zero digits).
pub fn matches_prefix(dsid: &str, prefix: &str) -> bool {
    match dsid.strip_prefix(prefix) {
        Some(rest) => rest.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}

/// Generate the next id for a prefix over a set of existing ids
pub fn next_dsid<'a>(existing: impl IntoIterator<Item = &'a str>, prefix: &str) -> String {
    let count = existing
        .into_iter()
        .filter(|id| matches_prefix(id, prefix))
        .count();
    format!("{prefix}{}", count + 1)
}
