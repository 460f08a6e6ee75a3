//! Token and pattern model shared by the trie matcher and the derive macro.
//!
//! Patterns can be written in a small notation, one pattern per `;`:
//!
//! ```text
//! identifier , punctuation "." , identifier ;
//! paren "(" , ROOT , paren ")" ;
//! ROOT , operator "=" , ROOT ;
//! ```
//!
//! A bare `ROOT` is the recursion point: the whole library may recur there.

use std::fmt::{self, Display};
use std::str::FromStr;

mod error;
pub use error::Error;
mod parser;

/// Keyword used by the notation for [`TokenTemplate::RecursionPoint`].
pub const RECURSION_KEYWORD: &str = "ROOT";

/// A lexical unit as produced by a tokenizer.
#[derive(PartialEq, Eq, Debug, Clone, Hash)]
pub struct Token {
    pub kind: String,
    pub value: Option<String>,
}

impl Token {
    /// A token carrying only a kind.
    pub fn new(kind: impl Into<String>) -> Self {
        Token {
            kind: kind.into(),
            value: None,
        }
    }

    /// A token carrying a kind and a literal value. An empty value is
    /// stored as no value.
    pub fn with_value(kind: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Token {
            kind: kind.into(),
            value: if value.is_empty() { None } else { Some(value) },
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The literal value. An empty value counts as no value.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref().filter(|v| !v.is_empty())
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.value() {
            Some(v) if v.contains('"') => write!(f, "{} '{}'", self.kind, v),
            Some(v) => write!(f, "{} \"{}\"", self.kind, v),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl FromStr for Token {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, token) = parser::complete(parser::token)(s)?;
        Ok(token)
    }
}

/// One element of a pattern.
#[derive(PartialEq, Eq, Debug, Clone, Hash)]
pub enum TokenTemplate {
    /// Matches a token of the same kind. When the template carries a value
    /// the token must carry the same value for an exact match, otherwise any
    /// value is accepted.
    Literal(Token),
    /// The entire pattern library may recur here.
    RecursionPoint,
}

impl TokenTemplate {
    pub fn literal(kind: impl Into<String>) -> Self {
        TokenTemplate::Literal(Token::new(kind))
    }

    pub fn exact(kind: impl Into<String>, value: impl Into<String>) -> Self {
        TokenTemplate::Literal(Token::with_value(kind, value))
    }

    pub fn is_recursion_point(&self) -> bool {
        matches!(self, TokenTemplate::RecursionPoint)
    }
}

impl Display for TokenTemplate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenTemplate::Literal(tok) => write!(f, "{}", tok),
            TokenTemplate::RecursionPoint => write!(f, "{}", RECURSION_KEYWORD),
        }
    }
}

impl FromStr for TokenTemplate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, template) = parser::complete(parser::template)(s)?;
        Ok(template)
    }
}

impl From<Token> for TokenTemplate {
    fn from(tok: Token) -> Self {
        TokenTemplate::Literal(tok)
    }
}

/// An ordered sequence of templates registered with a matcher.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct Pattern(pub Vec<TokenTemplate>);

impl Pattern {
    pub fn new(templates: Vec<TokenTemplate>) -> Self {
        Pattern(templates)
    }

    pub fn templates(&self) -> &[TokenTemplate] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_recursive(&self) -> bool {
        self.0.iter().any(TokenTemplate::is_recursion_point)
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (idx, template) in self.0.iter().enumerate() {
            if idx > 0 {
                write!(f, " , ")?;
            }
            write!(f, "{}", template)?;
        }
        write!(f, " ;")
    }
}

impl FromStr for Pattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, pattern) = parser::complete(parser::pattern)(s)?;
        Ok(pattern)
    }
}

impl From<Vec<TokenTemplate>> for Pattern {
    fn from(templates: Vec<TokenTemplate>) -> Self {
        Pattern(templates)
    }
}

/// A set of patterns.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct PatternLibrary {
    pub patterns: Vec<Pattern>,
}

impl PatternLibrary {
    pub fn new(patterns: Vec<Pattern>) -> Self {
        PatternLibrary { patterns }
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }
}

impl Display for PatternLibrary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for pattern in &self.patterns {
            writeln!(f, "{}", pattern)?;
        }
        Ok(())
    }
}

impl FromStr for PatternLibrary {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, library) = parser::complete(parser::library)(s)?;
        Ok(library)
    }
}

/// Parse a comma separated token stream, e.g. `paren "(" , literal "1"`.
pub fn parse_tokens(s: &str) -> Result<Vec<Token>, Error> {
    let (_, tokens) = parser::complete(parser::tokens)(s)?;
    Ok(tokens)
}

/// Types that carry a pattern library, usually through `#[derive(Patterns)]`.
pub trait PatternSource {
    fn patterns() -> PatternLibrary;
}
