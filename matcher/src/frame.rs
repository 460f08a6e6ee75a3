use crate::error::{MatchError, Result};
use crate::trie::{NodeId, Trie};

/// The path of trie nodes walked within one nesting level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    nodes: Vec<NodeId>,
}

impl Frame {
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn last(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// One frame per open recursion level, outermost first.
///
/// Every frame below the active one ends on the recursion point it is
/// waiting on. The active frame ends on the node the walk pointer sits on,
/// or is empty right after recursion was entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameStack {
    frames: Vec<Frame>,
}

impl Default for FrameStack {
    fn default() -> Self {
        FrameStack::new()
    }
}

impl FrameStack {
    /// A stack holding a single empty frame.
    pub fn new() -> Self {
        FrameStack {
            frames: vec![Frame::default()],
        }
    }

    pub fn reset(&mut self) {
        self.frames.clear();
        self.frames.push(Frame::default());
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn active(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Last node of the active frame.
    pub fn active_last(&self) -> Option<NodeId> {
        self.active().and_then(FrameStack::last_of)
    }

    pub fn last_of(frame: &Frame) -> Option<NodeId> {
        frame.last()
    }

    /// Open a new nesting level.
    pub fn push_frame(&mut self) {
        self.frames.push(Frame::default());
    }

    pub fn append_to_active_frame(&mut self, node: NodeId) -> Result<()> {
        match self.frames.last_mut() {
            Some(frame) => {
                frame.nodes.push(node);
                Ok(())
            }
            None => Err(MatchError::violation("append to an empty frame stack")),
        }
    }

    /// Collapse completed recursion levels.
    ///
    /// Working outward from the active frame: while the active frame ends on
    /// a leaf and the frame below ends on a recursion point that is itself a
    /// leaf, the recursion point is consumed and both frames merge. Returns
    /// the number of merged levels.
    pub fn squash(&mut self, trie: &Trie) -> Result<usize> {
        if self.frames.is_empty() {
            return Err(MatchError::violation("squash on an empty frame stack"));
        }

        let mut collapsed = 0;
        while self.frames.len() > 1 {
            let n = self.frames.len();
            let inner = FrameStack::last_of(&self.frames[n - 1]);
            let outer = FrameStack::last_of(&self.frames[n - 2]);
            match (inner, outer) {
                (Some(inner), Some(outer)) if trie.is_leaf(inner) && trie.is_leaf(outer) => {
                    let completed = self.frames.pop().unwrap_or_default();
                    let enclosing = &mut self.frames[n - 2];
                    if trie.is_recursion_point(outer) {
                        enclosing.nodes.pop();
                    }
                    enclosing.nodes.extend(completed.nodes);
                    collapsed += 1;
                }
                _ => break,
            }
        }
        Ok(collapsed)
    }

    /// Fold every frame above `level` into it and append `node`, the
    /// continuation that followed the completed recursion at `level`.
    pub fn close_into(&mut self, level: usize, node: NodeId) -> Result<()> {
        if level >= self.frames.len() {
            return Err(MatchError::violation(format!(
                "close into level {} of a {} frame stack",
                level,
                self.frames.len()
            )));
        }
        let folded: Vec<NodeId> = self
            .frames
            .drain(level + 1..)
            .flat_map(|frame| frame.nodes)
            .collect();
        let target = &mut self.frames[level];
        target.nodes.extend(folded);
        target.nodes.push(node);
        Ok(())
    }

    /// The innermost frame end that can still be walked from, `None` once the
    /// whole nested structure is consumed.
    pub fn deepest_walkable(&self, trie: &Trie) -> Option<NodeId> {
        self.frames
            .iter()
            .rev()
            .filter_map(FrameStack::last_of)
            .find(|&node| !trie.is_leaf(node))
    }

    /// Pending recursion points below the active frame, innermost first,
    /// paired with their level.
    pub fn enclosing_markers(&self) -> impl Iterator<Item = (usize, NodeId)> + '_ {
        let active = self.frames.len().saturating_sub(1);
        self.frames[..active]
            .iter()
            .enumerate()
            .rev()
            .filter_map(|(level, frame)| frame.last().map(|node| (level, node)))
    }
}
