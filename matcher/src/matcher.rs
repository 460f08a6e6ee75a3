use anyhow::Context;
use log::{debug, trace};
use std::borrow::Borrow;
use std::sync::Arc;

use patterns::{Pattern, PatternLibrary, Token};

use crate::error::{MatchError, Result};
use crate::frame::FrameStack;
use crate::trie::{NodeId, NodeKey, NodeRef, Trie};

/// What was matched for a single token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchMark {
    /// Key of the trie edge taken, exact (`kind-value`) or type-only
    /// (`kind`).
    pub match_key: String,
    pub token: Token,
}

/// Outcome of feeding one token.
///
/// `finished` with a value: everything opened so far is fully consumed.
/// `finished` without a value: the token has no continuation anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub finished: bool,
    pub value: Option<MatchMark>,
}

impl MatchResult {
    fn matched(finished: bool, mark: MatchMark) -> Self {
        MatchResult {
            finished,
            value: Some(mark),
        }
    }

    fn no_match() -> Self {
        MatchResult {
            finished: true,
            value: None,
        }
    }

    pub fn is_match(&self) -> bool {
        self.value.is_some()
    }

    /// The token was accepted and nothing is left open.
    pub fn is_complete(&self) -> bool {
        self.finished && self.value.is_some()
    }
}

enum Step {
    Matched(MatchResult),
    Retry,
    NoMatch,
}

/// Incremental matcher over a shared trie.
///
/// Owns the walk pointer and the frame stack for exactly one token stream;
/// create one matcher per stream and share the trie with
/// [`Matcher::with_trie`].
#[derive(Debug, Clone)]
pub struct Matcher {
    trie: Arc<Trie>,
    walk: NodeId,
    frames: FrameStack,
}

impl Matcher {
    pub fn new(patterns: &[Pattern]) -> Result<Self> {
        Ok(Matcher::with_trie(Arc::new(Trie::build(patterns)?)))
    }

    pub fn from_library(library: &PatternLibrary) -> Result<Self> {
        Matcher::new(library.patterns())
    }

    /// Build a matcher from pattern notation.
    pub fn from_notation(src: &str) -> anyhow::Result<Self> {
        let library = src
            .parse::<PatternLibrary>()
            .context("parse pattern library")?;
        let matcher = Matcher::from_library(&library).context("build pattern trie")?;
        Ok(matcher)
    }

    pub fn with_trie(trie: Arc<Trie>) -> Self {
        Matcher {
            trie,
            walk: Trie::ROOT,
            frames: FrameStack::new(),
        }
    }

    /// Forget the current stream. Must be called between independent streams.
    pub fn reset(&mut self) {
        self.walk = Trie::ROOT;
        self.frames.reset();
    }

    pub fn root(&self) -> NodeRef<'_> {
        self.trie.root()
    }

    pub fn trie(&self) -> &Arc<Trie> {
        &self.trie
    }

    pub fn frames(&self) -> &FrameStack {
        &self.frames
    }

    /// Node the walk pointer currently sits on.
    pub fn walk(&self) -> NodeRef<'_> {
        self.trie.node(self.walk)
    }

    /// Feed the next token of the stream.
    ///
    /// A token may be retried internally after entering recursion or
    /// restarting from the recursion root; every retry is followed by a
    /// successful step, so the loop bound only trips on a broken trie.
    pub fn match_token(&mut self, token: &Token) -> Result<MatchResult> {
        let trie = Arc::clone(&self.trie);
        let limit = trie.depth() + 2;
        for _ in 0..limit {
            match self.step(&trie, token)? {
                Step::Matched(result) => return Ok(result),
                Step::Retry => continue,
                Step::NoMatch => {
                    trace!(
                        "no continuation for {} at {}, depth {}",
                        token,
                        trie.node(self.walk).key(),
                        self.frames.depth()
                    );
                    return Ok(MatchResult::no_match());
                }
            }
        }
        Err(MatchError::violation(format!(
            "token {} retried {} times without progress",
            token, limit
        )))
    }

    /// Feed every token, yielding one result per token.
    pub fn matches<I>(&mut self, tokens: I) -> Matches<'_, I::IntoIter>
    where
        I: IntoIterator,
        I::Item: Borrow<Token>,
    {
        Matches {
            matcher: self,
            tokens: tokens.into_iter(),
        }
    }

    fn step(&mut self, trie: &Trie, token: &Token) -> Result<Step> {
        if let Some((key, next)) = trie.resolve(self.walk, token) {
            trace!(
                "match {} at {}, available: {}",
                token,
                trie.node(self.walk).key(),
                available(trie.node(self.walk))
            );
            self.frames.append_to_active_frame(next)?;
            self.walk = next;
            return self.settle(trie, key, token).map(Step::Matched);
        }

        if self.walk != Trie::ROOT {
            if let Some(marker) = trie.recursion_child(self.walk) {
                if trie.resolve(Trie::ROOT, token).is_some() {
                    debug!(
                        "enter recursion at {} for {}, depth {}",
                        trie.node(self.walk).key(),
                        token,
                        self.frames.depth() + 1
                    );
                    self.frames.append_to_active_frame(marker)?;
                    self.frames.push_frame();
                    self.walk = Trie::ROOT;
                    return Ok(Step::Retry);
                }
            }
        }

        let completed = self
            .frames
            .active_last()
            .map_or(false, |node| trie.is_terminal(node));
        if !completed {
            return Ok(Step::NoMatch);
        }

        if let Some((level, key, next)) = self.find_closing(trie, token) {
            debug!(
                "close recursion into level {} with {}, depth {}",
                level,
                token,
                self.frames.depth()
            );
            self.frames.close_into(level, next)?;
            self.walk = next;
            return self.settle(trie, key, token).map(Step::Matched);
        }

        if let Some(recursion_root) = trie.recursion_root() {
            if self.walk != recursion_root && trie.resolve(recursion_root, token).is_some() {
                trace!(
                    "restart at recursion root for {}, available: {}",
                    token,
                    available(trie.node(recursion_root))
                );
                self.walk = recursion_root;
                return Ok(Step::Retry);
            }
        }

        Ok(Step::NoMatch)
    }

    /// First enclosing recursion point whose continuation accepts `token`.
    /// A recursion point that ends its pattern lets the search continue
    /// outward; any other stops it.
    fn find_closing(&self, trie: &Trie, token: &Token) -> Option<(usize, NodeKey, NodeId)> {
        for (level, marker) in self.frames.enclosing_markers() {
            if let Some((key, next)) = trie.resolve(marker, token) {
                return Some((level, key, next));
            }
            if !trie.is_terminal(marker) {
                return None;
            }
        }
        None
    }

    /// Collapse finished levels after a step and report the result.
    fn settle(&mut self, trie: &Trie, key: NodeKey, token: &Token) -> Result<MatchResult> {
        let collapsed = self.frames.squash(trie)?;
        if collapsed > 0 {
            debug!(
                "squashed {} completed levels, depth {}",
                collapsed,
                self.frames.depth()
            );
        }
        let finished = self.frames.deepest_walkable(trie).is_none();
        Ok(MatchResult::matched(
            finished,
            MatchMark {
                match_key: key.to_string(),
                token: token.clone(),
            },
        ))
    }
}

fn available(node: NodeRef<'_>) -> String {
    node.child_keys()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Iterator returned by [`Matcher::matches`].
pub struct Matches<'m, I> {
    matcher: &'m mut Matcher,
    tokens: I,
}

impl<'m, I> Iterator for Matches<'m, I>
where
    I: Iterator,
    I::Item: Borrow<Token>,
{
    type Item = Result<MatchResult>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.tokens.next()?;
        Some(self.matcher.match_token(token.borrow()))
    }
}
