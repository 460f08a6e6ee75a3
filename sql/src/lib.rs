//! Patterns for SQL expressions as they appear in `WHERE`, `ON` and
//! `HAVING` clauses.
//!
//! Token kinds follow the SQL tokenizer: `identifier`, `literal`,
//! `parameter`, `keyword`, `operator`, `paren` and `punctuation`. Keywords
//! are expected upper-cased.

use std::sync::Arc;

use derive::Patterns;
use matcher::{Matcher, Recognizer, Trie};
use patterns::PatternSource;

#[derive(Patterns)]
#[patterns_file = "expressions.patterns"]
pub struct ExpressionPatterns;

/// Trie of [`ExpressionPatterns`], to be shared by one matcher per clause.
pub fn expression_trie() -> anyhow::Result<Arc<Trie>> {
    let library = ExpressionPatterns::patterns();
    Ok(Arc::new(Trie::build(library.patterns())?))
}

pub fn expression_matcher() -> anyhow::Result<Matcher> {
    ExpressionPatterns::matcher()
}

#[cfg(test)]
mod tests {
    use super::*;
    use patterns::{PatternLibrary, TokenTemplate};

    #[test]
    fn derived_library_matches_notation() {
        let notation: PatternLibrary = include_str!("../expressions.patterns").parse().unwrap();
        assert_eq!(ExpressionPatterns::patterns(), notation);
    }

    #[test]
    fn operator_chains_start_with_recursion() {
        let library = ExpressionPatterns::patterns();
        let chains = library
            .patterns()
            .iter()
            .filter(|p| p.templates().first() == Some(&TokenTemplate::RecursionPoint))
            .count();
        assert_eq!(chains, 5);

        let trie = expression_trie().unwrap();
        assert!(trie.recursion_root().is_some());
    }

    #[test]
    fn shared_trie() {
        let trie = expression_trie().unwrap();
        let a = Matcher::with_trie(Arc::clone(&trie));
        let b = Matcher::with_trie(Arc::clone(&trie));
        assert!(Arc::ptr_eq(a.trie(), b.trie()));
        assert_eq!(a.root().children().count(), b.root().children().count());
        assert!(expression_matcher().is_ok());
    }
}
