//! Word resolution: concatenates a word's parts into one string.

use crate::env::{self, UnsetVars};
use crate::parse::{Part, Word};

/// Resolve a word to a single string. Never fails: unset variables read as
/// empty.
pub fn resolve(word: &Word, unset: UnsetVars) -> String {
    resolve_parts(word.parts(), unset)
}

pub fn resolve_parts(parts: &[Part], unset: UnsetVars) -> String {
    parts.iter().fold(String::new(), |mut out, part| {
        match part {
            Part::Literal(text) => out.push_str(text),
            Part::Variable(name) => out.push_str(&env::lookup(name, unset)),
        }
        out
    })
}

impl Word {
    /// Resolve with the default unset-variable policy.
    pub fn resolve(&self) -> String {
        resolve(self, UnsetVars::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_unchanged() {
        for text in ["ls", "", "with space", "$not-a-var", "ünïcode"] {
            assert_eq!(Word::literal(text).resolve(), text);
        }
    }

    #[test]
    fn variable_substituted() {
        env::set("TREESH_EXPAND_SET", "abc").unwrap();
        assert_eq!(Word::variable("TREESH_EXPAND_SET").resolve(), "abc");
    }

    #[test]
    fn unset_variable_resolves_empty_and_is_defined() {
        assert_eq!(Word::variable("TREESH_EXPAND_UNSET").resolve(), "");
        assert_eq!(env::get("TREESH_EXPAND_UNSET").as_deref(), Some(""));
    }

    #[test]
    fn concatenation_is_one_string() {
        env::set("TREESH_EXPAND_DIR", "/opt").unwrap();
        let word = Word::new(vec![
            Part::Variable("TREESH_EXPAND_DIR".into()),
            Part::Literal("/bin:".into()),
            Part::Variable("TREESH_EXPAND_MISSING".into()),
            Part::Literal("!".into()),
        ]);
        assert_eq!(resolve(&word, UnsetVars::Leave), "/opt/bin:!");
        assert_eq!(env::get("TREESH_EXPAND_MISSING"), None);
    }

    #[test]
    fn no_parts_is_empty_string() {
        assert_eq!(Word::default().resolve(), "");
    }
}
