//! Incremental matching of token streams against a library of patterns.
//!
//! Patterns are merged into a [`Trie`]. A [`Matcher`] consumes one token at a
//! time and reports after each whether the tokens so far still follow some
//! pattern, and whether everything opened so far is complete. Patterns may
//! contain recursion points, so nested constructs such as parenthesised
//! groups or operator chains are matched to any depth without rescanning.
//!
//! ```
//! use matcher::Matcher;
//! use patterns::parse_tokens;
//!
//! let mut m = Matcher::from_notation(
//!     "literal ;
//!      paren \"(\" , ROOT , paren \")\" ;
//!      ROOT , operator \"=\" , ROOT ;",
//! )
//! .unwrap();
//!
//! let tokens = parse_tokens("paren \"(\" , literal , paren \")\"").unwrap();
//! let results: Vec<_> = m.matches(&tokens).map(|r| r.unwrap()).collect();
//! assert!(results.iter().all(|r| r.is_match()));
//! assert!(results[2].finished);
//! ```

use patterns::PatternSource;

mod error;
mod frame;
mod matcher;
mod trie;

pub use error::{MatchError, Result};
pub use frame::{Frame, FrameStack};
pub use matcher::{MatchMark, MatchResult, Matcher, Matches};
pub use trie::{NodeId, NodeKey, NodeRef, Trie};

/// Types that can produce a ready matcher.
pub trait Recognizer {
    fn matcher() -> anyhow::Result<Matcher>;
}

impl<T: PatternSource> Recognizer for T {
    fn matcher() -> anyhow::Result<Matcher> {
        Ok(Matcher::from_library(&T::patterns())?)
    }
}
