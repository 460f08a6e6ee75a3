use log::debug;
use std::collections::BTreeMap;
use std::fmt::{self, Debug, Display};

use patterns::{Pattern, Token, TokenTemplate};

use crate::error::{MatchError, Result};

/// Key of an edge in the trie.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeKey {
    /// Reserved for the root node, never the key of an edge.
    Root,
    /// Token kind plus literal value.
    Exact { kind: String, value: String },
    /// Token kind alone, matching any value.
    Kind(String),
    /// The recursion point.
    Recursion,
}

impl NodeKey {
    /// Exact key of a token, if it carries a value.
    pub fn exact(token: &Token) -> Option<NodeKey> {
        token.value().map(|value| NodeKey::Exact {
            kind: token.kind.clone(),
            value: value.to_owned(),
        })
    }

    /// Type-only key of a token.
    pub fn kind(token: &Token) -> NodeKey {
        NodeKey::Kind(token.kind.clone())
    }

    pub fn for_template(template: &TokenTemplate) -> NodeKey {
        match template {
            TokenTemplate::Literal(tok) => NodeKey::exact(tok).unwrap_or_else(|| NodeKey::kind(tok)),
            TokenTemplate::RecursionPoint => NodeKey::Recursion,
        }
    }
}

impl Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NodeKey::Root => write!(f, "<root>"),
            NodeKey::Exact { kind, value } => write!(f, "{}-{}", kind, value),
            NodeKey::Kind(kind) => write!(f, "{}", kind),
            NodeKey::Recursion => write!(f, "{}", patterns::RECURSION_KEYWORD),
        }
    }
}

/// Index of a node inside the trie that produced it. Lookups with an id
/// from another trie find nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct TrieNode {
    key: NodeKey,
    template: Option<TokenTemplate>,
    children: BTreeMap<NodeKey, NodeId>,
    /// Some pattern ends exactly at this node.
    terminal: bool,
    depth: usize,
}

/// Prefix tree of every registered pattern. Immutable once built.
#[derive(Debug, Clone)]
pub struct Trie {
    nodes: Vec<TrieNode>,
    depth: usize,
}

impl Trie {
    pub const ROOT: NodeId = NodeId(0);

    /// Build the trie from a pattern library, merging common prefixes.
    pub fn build(patterns: &[Pattern]) -> Result<Trie> {
        let mut trie = Trie {
            nodes: vec![TrieNode {
                key: NodeKey::Root,
                template: None,
                children: BTreeMap::new(),
                terminal: false,
                depth: 0,
            }],
            depth: 0,
        };

        for (idx, pattern) in patterns.iter().enumerate() {
            if pattern.is_empty() {
                return Err(MatchError::violation(format!("pattern {} is empty", idx)));
            }
            if pattern.len() == 1 && pattern.is_recursive() {
                return Err(MatchError::violation(format!(
                    "pattern {} only recurses into itself",
                    idx
                )));
            }
            trie.insert(pattern);
        }

        trie.validate()?;
        debug!(
            "built trie with {} nodes from {} patterns, depth {}",
            trie.nodes.len(),
            patterns.len(),
            trie.depth
        );
        Ok(trie)
    }

    fn insert(&mut self, pattern: &Pattern) {
        let mut current = Trie::ROOT;
        for template in pattern.templates() {
            let key = NodeKey::for_template(template);
            current = match self.nodes[current.0].children.get(&key) {
                Some(&next) => next,
                None => {
                    let next = NodeId(self.nodes.len());
                    let depth = self.nodes[current.0].depth + 1;
                    self.nodes.push(TrieNode {
                        key: key.clone(),
                        template: Some(template.clone()),
                        children: BTreeMap::new(),
                        terminal: false,
                        depth,
                    });
                    self.nodes[current.0].children.insert(key, next);
                    self.depth = self.depth.max(depth);
                    next
                }
            };
        }
        self.nodes[current.0].terminal = true;
    }

    /// A recursion point can only be resolved if some pattern starts with a
    /// real token.
    fn validate(&self) -> Result<()> {
        let recursive = self.nodes.iter().any(|n| n.key == NodeKey::Recursion);
        let literal_start = self.nodes[Trie::ROOT.0]
            .children
            .keys()
            .any(|k| *k != NodeKey::Recursion);
        if recursive && !literal_start {
            return Err(MatchError::violation(
                "recursion point with no pattern starting on a token",
            ));
        }
        Ok(())
    }

    /// Follow the edge accepting `token` out of `node`. The exact key is
    /// tried before the type-only key.
    pub fn resolve(&self, node: NodeId, token: &Token) -> Option<(NodeKey, NodeId)> {
        let children = &self.entry(node)?.children;
        NodeKey::exact(token)
            .into_iter()
            .chain(std::iter::once(NodeKey::kind(token)))
            .find_map(|key| children.get(&key).map(|&next| (key, next)))
    }

    /// The recursion child of `node`, if any.
    pub fn recursion_child(&self, node: NodeId) -> Option<NodeId> {
        self.entry(node)?.children.get(&NodeKey::Recursion).copied()
    }

    /// The root's recursion child: the start of patterns that open with a
    /// recursion point.
    pub fn recursion_root(&self) -> Option<NodeId> {
        self.recursion_child(Trie::ROOT)
    }

    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.entry(node).map_or(false, |n| n.children.is_empty())
    }

    pub fn is_terminal(&self, node: NodeId) -> bool {
        self.entry(node).map_or(false, |n| n.terminal)
    }

    pub fn is_recursion_point(&self, node: NodeId) -> bool {
        self.entry(node).map_or(false, |n| n.key == NodeKey::Recursion)
    }

    /// Length of the longest pattern.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn root(&self) -> NodeRef<'_> {
        self.node(Trie::ROOT)
    }

    /// View of the node behind `id`, `None` if it is not part of this trie.
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.entry(id).map(|_| NodeRef { trie: self, id })
    }

    /// Ids handed out by this trie are always in range.
    pub(crate) fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { trie: self, id }
    }

    fn entry(&self, id: NodeId) -> Option<&TrieNode> {
        self.nodes.get(id.0)
    }

    fn fmt_node(&self, f: &mut fmt::Formatter, id: NodeId) -> fmt::Result {
        let node = &self.nodes[id.0];
        let indent = node.depth * 2;
        write!(f, "{:indent$}{}", "", node.key, indent = indent)?;
        if node.terminal {
            write!(f, " *")?;
        }
        writeln!(f)?;
        for &child in node.children.values() {
            self.fmt_node(f, child)?;
        }
        Ok(())
    }
}

/// Indented dump of the trie, terminal nodes marked with `*`.
impl Display for Trie {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_node(f, Trie::ROOT)
    }
}

/// Read-only view of a single trie node.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    trie: &'a Trie,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    fn inner(&self) -> &'a TrieNode {
        &self.trie.nodes[self.id.0]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn key(&self) -> &'a NodeKey {
        &self.inner().key
    }

    /// The template this node was inserted for, `None` at the root.
    pub fn template(&self) -> Option<&'a TokenTemplate> {
        self.inner().template.as_ref()
    }

    pub fn depth(&self) -> usize {
        self.inner().depth
    }

    pub fn is_leaf(&self) -> bool {
        self.trie.is_leaf(self.id)
    }

    pub fn is_terminal(&self) -> bool {
        self.trie.is_terminal(self.id)
    }

    pub fn child(&self, key: &NodeKey) -> Option<NodeRef<'a>> {
        let trie = self.trie;
        self.inner()
            .children
            .get(key)
            .map(|&id| NodeRef { trie, id })
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let trie = self.trie;
        self.inner()
            .children
            .values()
            .map(move |&id| NodeRef { trie, id })
    }

    pub fn child_keys(&self) -> impl Iterator<Item = &'a NodeKey> + 'a {
        self.inner().children.keys()
    }
}

impl<'a> Debug for NodeRef<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("key", self.key())
            .field("terminal", &self.is_terminal())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patterns::PatternLibrary;

    fn build(src: &str) -> Trie {
        let library: PatternLibrary = src.parse().unwrap();
        Trie::build(library.patterns()).unwrap()
    }

    #[test]
    fn merges_common_prefixes() {
        let trie = build(
            "identifier , punctuation \".\" , identifier ;
             identifier , identifier ;
             literal ;",
        );

        let root = trie.root();
        assert_eq!(root.key(), &NodeKey::Root);
        assert!(root.template().is_none());
        assert_eq!(root.children().count(), 2);

        let ident = root.child(&NodeKey::Kind("identifier".into())).unwrap();
        assert_eq!(ident.template(), Some(&TokenTemplate::literal("identifier")));
        assert_eq!(ident.children().count(), 2);
        assert!(!ident.is_terminal());

        let dot = ident
            .child(&NodeKey::Exact {
                kind: "punctuation".into(),
                value: ".".into(),
            })
            .unwrap();
        let tail = dot.child(&NodeKey::Kind("identifier".into())).unwrap();
        assert!(tail.is_leaf());
        assert!(tail.is_terminal());
        assert_eq!(tail.depth(), 3);

        let literal = root.child(&NodeKey::Kind("literal".into())).unwrap();
        assert!(literal.is_leaf());
        assert_eq!(trie.depth(), 3);
        assert_eq!(trie.len(), 6);
    }

    #[test]
    fn dump() {
        let trie = build("identifier ; identifier , punctuation \".\" , identifier ;");
        let expected = "<root>\n  identifier *\n    punctuation-.\n      identifier *\n";
        assert_eq!(trie.to_string(), expected);
    }

    #[test]
    fn resolve_prefers_exact_key() {
        let trie = build("operator \"=\" , literal ; operator , identifier ;");
        let (key, exact) = trie
            .resolve(Trie::ROOT, &Token::with_value("operator", "="))
            .unwrap();
        assert_eq!(
            key,
            NodeKey::Exact {
                kind: "operator".into(),
                value: "=".into()
            }
        );
        assert_eq!(key.to_string(), "operator-=");

        let (key, fallback) = trie
            .resolve(Trie::ROOT, &Token::with_value("operator", "<"))
            .unwrap();
        assert_eq!(key, NodeKey::Kind("operator".into()));
        assert_ne!(exact, fallback);

        assert!(trie.resolve(Trie::ROOT, &Token::new("literal")).is_none());
    }

    #[test]
    fn recursion_points() {
        let trie = build(
            "literal ;
             paren \"(\" , ROOT , paren \")\" ;
             ROOT , operator \"=\" , ROOT ;",
        );
        let recursion_root = trie.recursion_root().unwrap();
        assert_eq!(trie.node(recursion_root).key(), &NodeKey::Recursion);
        assert_eq!(trie.node(recursion_root).depth(), 1);

        let (_, open) = trie
            .resolve(Trie::ROOT, &Token::with_value("paren", "("))
            .unwrap();
        let marker = trie.recursion_child(open).unwrap();
        assert!(!trie.is_leaf(marker));
        assert!(!trie.is_terminal(marker));

        let (_, eq) = trie
            .resolve(recursion_root, &Token::with_value("operator", "="))
            .unwrap();
        let tail = trie.recursion_child(eq).unwrap();
        assert!(trie.is_leaf(tail));
        assert!(trie.is_terminal(tail));
    }

    #[test]
    fn foreign_ids_find_nothing() {
        let small = build("literal ;");
        let large = build("identifier , punctuation \".\" , identifier ; literal ;");
        let (_, tail) = large
            .resolve(Trie::ROOT, &Token::new("identifier"))
            .and_then(|(_, ident)| large.resolve(ident, &Token::with_value("punctuation", ".")))
            .and_then(|(_, dot)| large.resolve(dot, &Token::new("identifier")))
            .unwrap();

        assert!(small.get(tail).is_none());
        assert!(small.resolve(tail, &Token::new("literal")).is_none());
        assert_eq!(small.recursion_child(tail), None);
        assert!(!small.is_leaf(tail));
        assert!(!small.is_terminal(tail));
        assert!(!small.is_recursion_point(tail));
        assert_eq!(large.get(tail).map(|n| n.is_terminal()), Some(true));
    }

    #[test]
    fn malformed_libraries() {
        let tests = vec![
            vec![patterns::Pattern::default()],
            vec![patterns::Pattern::new(vec![TokenTemplate::RecursionPoint])],
            vec![patterns::Pattern::new(vec![
                TokenTemplate::RecursionPoint,
                TokenTemplate::exact("operator", "+"),
                TokenTemplate::RecursionPoint,
            ])],
        ];
        for test in tests {
            let err = Trie::build(&test).unwrap_err();
            assert!(
                matches!(err, MatchError::InvariantViolation(_)),
                "test case: {:?}",
                test
            );
        }
    }
}
