//! Shared persona choices for the persona forms
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Extracted from duplicated option lists in the TUI and REPL forms

use super::Relationship;

/// Relationship choices offered by the forms (display_name, id)
pub const RELATIONSHIP_CHOICES: &[(&str, &str)] = &[
    ("Father", "father"),
    ("Mother", "mother"),
    ("Spouse", "spouse"),
    ("Best friend", "friend"),
    ("Child", "child"),
    ("Sibling", "sibling"),
];

/// Trait choices offered by the forms
pub const TRAIT_CHOICES: &[&str] = &["wise", "humorous", "firm", "gentle", "caring", "sarcastic"];

/// Traits preselected in the forms
pub const DEFAULT_TRAIT_CHOICES: &[&str] = &["wise", "caring"];

/// Position of a relationship in [`RELATIONSHIP_CHOICES`], if it is one of them
pub fn relationship_index(relationship: &Relationship) -> Option<usize> {
    RELATIONSHIP_CHOICES
        .iter()
        .position(|(_, id)| *id == relationship.label())
}

/// Relationship at `index`, wrapping around in both directions
pub fn cycle_relationship(index: usize, step: isize) -> (usize, Relationship) {
    let len = RELATIONSHIP_CHOICES.len() as isize;
    let next = (index as isize + step).rem_euclid(len) as usize;
    (next, Relationship::parse(RELATIONSHIP_CHOICES[next].1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_relationship_ids_parse_to_known_variants() {
        for (_, id) in RELATIONSHIP_CHOICES {
            assert!(!matches!(Relationship::parse(id), Relationship::Other(_)), "{id} parsed as Other");
        }
    }

    #[test]
    fn test_default_traits_are_offered() {
        for t in DEFAULT_TRAIT_CHOICES {
            assert!(TRAIT_CHOICES.contains(t));
        }
    }

    #[test]
    fn test_cycle_relationship_wraps() {
        let last = RELATIONSHIP_CHOICES.len() - 1;
        let (idx, rel) = cycle_relationship(last, 1);
        assert_eq!(idx, 0);
        assert_eq!(rel, Relationship::Father);

        let (idx, rel) = cycle_relationship(0, -1);
        assert_eq!(idx, last);
        assert_eq!(rel, Relationship::Sibling);
    }

    #[test]
    fn test_relationship_index() {
        assert_eq!(relationship_index(&Relationship::Mother), Some(1));
        assert_eq!(relationship_index(&Relationship::Parent), None);
    }
}
