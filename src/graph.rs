//! The build graph: interned files, nodes, rules and edges, plus the
//! propagation of dirtiness from changed inputs to downstream outputs.
//!
//! All cross-references are typed indices into arenas owned by `State`,
//! which keeps the node<->file and node<->edge back-references cycle-free.

use crate::densemap::{self, DenseMap};
use crate::eval::{Env, Template};
use anyhow::{anyhow, bail};
use std::borrow::Cow;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(u32);
impl densemap::Index for FileId {
    fn index(&self) -> usize {
        self.0 as usize
    }
}
impl From<usize> for FileId {
    fn from(u: usize) -> FileId {
        FileId(u as u32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);
impl densemap::Index for NodeId {
    fn index(&self) -> usize {
        self.0 as usize
    }
}
impl From<usize> for NodeId {
    fn from(u: usize) -> NodeId {
        NodeId(u as u32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleId(u32);
impl densemap::Index for RuleId {
    fn index(&self) -> usize {
        self.0 as usize
    }
}
impl From<usize> for RuleId {
    fn from(u: usize) -> RuleId {
        RuleId(u as u32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeId(u32);
impl densemap::Index for EdgeId {
    fn index(&self) -> usize {
        self.0 as usize
    }
}
impl From<usize> for EdgeId {
    fn from(u: usize) -> EdgeId {
        EdgeId(u as u32)
    }
}

/// MTime info known for a file.  Unknown covers both "never observed" and
/// "observed absent"; the core only learns times through State::touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MTime {
    Unknown,
    Stamp(u32),
}

/// Metadata about a single path in the build universe.
#[derive(Debug)]
pub struct File {
    pub path: String,
    pub mtime: MTime,
    /// The node tracking this file's build status, once one exists.
    pub node: Option<NodeId>,
}

/// Interns paths: at most one File record exists per path.
#[derive(Debug, Default)]
pub struct StatCache {
    files: DenseMap<FileId, File>,
    by_path: HashMap<String, FileId>,
}

impl StatCache {
    pub fn get_or_create(&mut self, path: &str) -> FileId {
        if let Some(&id) = self.by_path.get(path) {
            return id;
        }
        let id = self.files.push(File {
            path: path.to_owned(),
            mtime: MTime::Unknown,
            node: None,
        });
        self.by_path.insert(path.to_owned(), id);
        id
    }

    pub fn lookup(&self, path: &str) -> Option<FileId> {
        self.by_path.get(path).copied()
    }

    pub fn file(&self, id: FileId) -> &File {
        self.files.get(id)
    }

    fn file_mut(&mut self, id: FileId) -> &mut File {
        self.files.get_mut(id)
    }
}

/// A file as a vertex in the build DAG.
#[derive(Debug)]
pub struct Node {
    pub file: FileId,
    pub dirty: bool,
    /// The unique edge that produces this node, if any.
    pub in_edge: Option<EdgeId>,
    /// Edges that consume this node as an input.
    pub out_edges: Vec<EdgeId>,
}

/// A named command template, shared by any number of edges.
#[derive(Debug)]
pub struct Rule {
    pub name: String,
    pub command: Template<String>,
}

/// A build action: one rule applied to specific inputs to produce outputs.
/// Input and output order is declaration order from the manifest.
#[derive(Debug)]
pub struct Edge {
    pub rule: RuleId,
    pub ins: Vec<NodeId>,
    pub outs: Vec<NodeId>,
}

/// Which side of an edge a path is being attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dir {
    In,
    Out,
}

/// The root aggregate: owns all files, nodes, rules and edges.
#[derive(Debug, Default)]
pub struct State {
    stat_cache: StatCache,
    nodes: DenseMap<NodeId, Node>,
    rules: DenseMap<RuleId, Rule>,
    rules_by_name: HashMap<String, RuleId>,
    edges: DenseMap<EdgeId, Edge>,
}

impl State {
    pub fn new() -> State {
        State::default()
    }

    pub fn stat_cache(&self) -> &StatCache {
        &self.stat_cache
    }
    pub fn file(&self, id: FileId) -> &File {
        self.stat_cache.file(id)
    }
    pub fn node(&self, id: NodeId) -> &Node {
        self.nodes.get(id)
    }
    pub fn rule(&self, id: RuleId) -> &Rule {
        self.rules.get(id)
    }
    pub fn edge(&self, id: EdgeId) -> &Edge {
        self.edges.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter()
    }

    /// The path of the file a node stands for.
    pub fn node_path(&self, id: NodeId) -> &str {
        &self.file(self.node(id).file).path
    }

    /// Define a named rule from raw command text.
    pub fn add_rule(&mut self, name: &str, command: &str) -> anyhow::Result<RuleId> {
        let command = Template::parse(command)
            .map_err(|err| anyhow!("rule {}: {}", name, err.msg))?
            .into_owned();
        self.add_parsed_rule(name, command)
    }

    /// Define a named rule from an already-parsed template.
    pub fn add_parsed_rule(
        &mut self,
        name: &str,
        command: Template<String>,
    ) -> anyhow::Result<RuleId> {
        if self.rules_by_name.contains_key(name) {
            bail!("duplicate rule {:?}", name);
        }
        let id = self.rules.push(Rule {
            name: name.to_owned(),
            command,
        });
        self.rules_by_name.insert(name.to_owned(), id);
        Ok(id)
    }

    pub fn lookup_rule(&self, name: &str) -> Option<RuleId> {
        self.rules_by_name.get(name).copied()
    }

    pub fn add_edge(&mut self, rule: RuleId) -> EdgeId {
        self.edges.push(Edge {
            rule,
            ins: Vec::new(),
            outs: Vec::new(),
        })
    }

    pub fn add_edge_named(&mut self, rule_name: &str) -> anyhow::Result<EdgeId> {
        let rule = self
            .lookup_rule(rule_name)
            .ok_or_else(|| anyhow!("unknown rule {:?}", rule_name))?;
        Ok(self.add_edge(rule))
    }

    /// Intern the file at `path` and ensure it has a node.
    pub fn get_node(&mut self, path: &str) -> NodeId {
        let file = self.stat_cache.get_or_create(path);
        if let Some(node) = self.stat_cache.file(file).node {
            return node;
        }
        let node = self.nodes.push(Node {
            file,
            dirty: false,
            in_edge: None,
            out_edges: Vec::new(),
        });
        self.stat_cache.file_mut(file).node = Some(node);
        node
    }

    /// Look up an existing node by path without creating one.
    pub fn lookup_node(&self, path: &str) -> Option<NodeId> {
        self.stat_cache.lookup(path).and_then(|id| self.file(id).node)
    }

    /// Attach `path` to an edge as an input or an output, maintaining the
    /// node-side back-references.  A node may be the output of at most one
    /// edge; a second producer is a graph-construction error.
    pub fn add_in_out(&mut self, edge: EdgeId, dir: Dir, path: &str) -> anyhow::Result<()> {
        let node = self.get_node(path);
        match dir {
            Dir::In => {
                self.edges.get_mut(edge).ins.push(node);
                self.nodes.get_mut(node).out_edges.push(edge);
            }
            Dir::Out => {
                if self.nodes.get(node).in_edge.is_some() {
                    bail!("multiple rules produce {:?}", path);
                }
                self.edges.get_mut(edge).outs.push(node);
                self.nodes.get_mut(node).in_edge = Some(edge);
            }
        }
        Ok(())
    }

    /// The filesystem oracle's entry point: a file's mtime was observed.
    /// An unchanged mtime is a no-op; a new one dirties the file's node and
    /// everything downstream of it.
    pub fn touch(&mut self, path: &str, mtime: u32) {
        let file = self.stat_cache.get_or_create(path);
        if self.stat_cache.file(file).mtime == MTime::Stamp(mtime) {
            return;
        }
        self.stat_cache.file_mut(file).mtime = MTime::Stamp(mtime);
        if let Some(node) = self.stat_cache.file(file).node {
            self.mark_dirty(node);
        }
    }

    /// Mark a node dirty and propagate through its out-edges.  Each node is
    /// visited at most once; a dirty node never goes clean within a build.
    pub fn mark_dirty(&mut self, node: NodeId) {
        if self.nodes.get(node).dirty {
            return; // We already know.
        }
        self.nodes.get_mut(node).dirty = true;
        let out_edges = self.nodes.get(node).out_edges.clone();
        for edge in out_edges {
            self.mark_dirty_from(edge, node);
        }
    }

    /// A dirty input reached `edge`; dirty all of the edge's outputs.
    /// The membership check guards against mis-wired graphs.
    fn mark_dirty_from(&mut self, edge: EdgeId, input: NodeId) {
        if !self.edges.get(edge).ins.contains(&input) {
            return;
        }
        let outs = self.edges.get(edge).outs.clone();
        for node in outs {
            self.mark_dirty(node);
        }
    }

    /// Expand an edge's command template against its edge environment.
    pub fn evaluate_command(&self, edge: EdgeId) -> String {
        let env = EdgeEnv { state: self, edge };
        self.rule(self.edge(edge).rule).command.evaluate(&env)
    }
}

/// Resolves the built-in variables for one edge's command:
/// `@in` is the space-joined input paths in edge order, `$out` the first
/// output's path.
pub struct EdgeEnv<'a> {
    state: &'a State,
    edge: EdgeId,
}

impl<'a> EdgeEnv<'a> {
    pub fn new(state: &'a State, edge: EdgeId) -> Self {
        EdgeEnv { state, edge }
    }
}

impl Env for EdgeEnv<'_> {
    fn get_var(&self, var: &str) -> Option<Cow<str>> {
        let edge = self.state.edge(self.edge);
        match var {
            "@in" => {
                let mut result = String::new();
                for &id in &edge.ins {
                    if !result.is_empty() {
                        result.push(' ');
                    }
                    result.push_str(self.state.node_path(id));
                }
                Some(Cow::Owned(result))
            }
            "$out" => edge
                .outs
                .first()
                .map(|&id| Cow::Borrowed(self.state.node_path(id))),
            _ => None,
        }
    }
}
