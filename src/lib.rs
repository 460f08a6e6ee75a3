//! Incremental, trie-based matching of token streams against pattern
//! libraries that may recurse into themselves.
//!
//! - [`patterns`]: tokens, templates and the pattern notation.
//! - [`matcher`]: the trie, the frame stack and the incremental matcher.
//! - [`Patterns`]: derive a pattern library from notation at compile time.

pub use derive::Patterns;
pub use matcher::{
    self, MatchError, MatchMark, MatchResult, Matcher, Matches, Recognizer, Trie,
};
pub use patterns::{self, Pattern, PatternLibrary, PatternSource, Token, TokenTemplate};

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Patterns)]
    #[patterns_inline = "
        identifier ;
        literal ;
        paren \"(\" , ROOT , paren \")\" ;
        ROOT , operator \"=\" , ROOT ;
    "]
    struct Assignments;

    #[test]
    fn derived_recognizer() {
        let mut m = Assignments::matcher().unwrap();
        let toks = patterns::parse_tokens(
            "identifier , operator \"=\" , paren \"(\" , literal , paren \")\"",
        )
        .unwrap();
        let results: Vec<MatchResult> = m.matches(&toks).map(|r| r.unwrap()).collect();
        assert!(results.iter().all(MatchResult::is_match));
        assert!(results[4].is_complete());
    }
}
