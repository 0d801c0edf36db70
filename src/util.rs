//! Utility functions shared across tutor modules.

/// Union two string lists, preserving order and dropping duplicates.
///
/// The first occurrence of each element wins, so the prior list's ordering
/// survives and new elements are appended in their own order. Unlock and
/// known-lesson sets are always updated through this function — they are
/// unioned with additions, never replaced.
pub fn add_array_unique(lhs: &[String], rhs: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(lhs.len() + rhs.len());
    for item in lhs.iter().chain(rhs.iter()) {
        if !merged.contains(item) {
            merged.push(item.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_union_appends_new_elements() {
        let merged = add_array_unique(&strings(&["a", "b"]), &strings(&["c"]));
        assert_eq!(merged, strings(&["a", "b", "c"]));
    }

    #[test]
    fn test_union_drops_duplicates() {
        let merged = add_array_unique(&strings(&["a", "b"]), &strings(&["b", "a", "c"]));
        assert_eq!(merged, strings(&["a", "b", "c"]));
    }

    #[test]
    fn test_first_seen_wins_within_rhs() {
        let merged = add_array_unique(&[], &strings(&["x", "y", "x"]));
        assert_eq!(merged, strings(&["x", "y"]));
    }

    #[test]
    fn test_union_is_idempotent() {
        let prior = strings(&["a", "b"]);
        let addition = strings(&["b", "c"]);
        let once = add_array_unique(&prior, &addition);
        let twice = add_array_unique(&once, &addition);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(add_array_unique(&[], &[]).is_empty());
        assert_eq!(add_array_unique(&strings(&["a"]), &[]), strings(&["a"]));
    }
}
