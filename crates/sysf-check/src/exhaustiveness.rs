//! Lenient exhaustiveness checking for `case` (spec's "open question —
//! exhaustiveness": only fire when the scrutinee's full constructor set is
//! statically known).
//!
//! Deliberately not a full usefulness/coverage algorithm: no nested
//! patterns exist in this calculus (a branch is one constructor applied to
//! bare variables), so the only question worth asking is "did the branch
//! list name every constructor of this data type at least once". Overlap
//! and redundancy (the same constructor named twice) are not reported.

use std::collections::HashSet;

/// Given the full, ordered constructor list of a data type and the
/// constructor names actually covered by a `case`'s branches, return the
/// constructors missing from the branch list, in declaration order. An
/// empty result means the case is exhaustive (or the covered set already
/// names every constructor, possibly with repeats).
pub fn missing_constructors(all_ctors: &[String], covered: &[String]) -> Vec<String> {
    let covered: HashSet<&str> = covered.iter().map(String::as_str).collect();
    all_ctors
        .iter()
        .filter(|c| !covered.contains(c.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_missing_when_every_constructor_covered() {
        let all = vec!["True".to_string(), "False".to_string()];
        let covered = vec!["True".to_string(), "False".to_string()];
        assert!(missing_constructors(&all, &covered).is_empty());
    }

    #[test]
    fn reports_missing_constructor_in_declaration_order() {
        let all = vec!["Nothing".to_string(), "Just".to_string()];
        let covered = vec!["Nothing".to_string()];
        assert_eq!(missing_constructors(&all, &covered), vec!["Just".to_string()]);
    }

    #[test]
    fn empty_data_type_with_no_branches_is_exhaustive() {
        let all: Vec<String> = Vec::new();
        let covered: Vec<String> = Vec::new();
        assert!(missing_constructors(&all, &covered).is_empty());
    }

    #[test]
    fn repeated_branch_for_same_constructor_does_not_mask_a_missing_one() {
        let all = vec!["A".to_string(), "B".to_string()];
        let covered = vec!["A".to_string(), "A".to_string()];
        assert_eq!(missing_constructors(&all, &covered), vec!["B".to_string()]);
    }
}
