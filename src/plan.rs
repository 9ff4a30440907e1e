//! Planning: given requested targets, pick the edges whose inputs are
//! already satisfied and dispense them in schedule order.

use crate::graph::{EdgeId, MTime, NodeId, State};
use anyhow::bail;
use std::collections::{HashSet, VecDeque};

/// Transient per-build object tracking what we want to produce and which
/// edges may run now.  Edges whose inputs must themselves be built are held
/// back; promoting them on completion is the next layer's job.
#[derive(Default)]
pub struct Plan {
    /// Nodes we want to ensure are brought up to date.
    want: HashSet<NodeId>,
    /// Edges whose inputs are all clean or not wanted, in FIFO order.
    ready: VecDeque<EdgeId>,
}

impl Plan {
    pub fn new() -> Plan {
        Plan::default()
    }

    /// Seed the plan with a desired output by path, interning it if needed.
    pub fn add_target_path(&mut self, state: &mut State, path: &str) -> anyhow::Result<bool> {
        let node = state.get_node(path);
        self.add_target(state, node)
    }

    /// Seed the plan with a desired output.  Returns whether the node needs
    /// to be built: clean nodes and up-to-date source files report false.
    ///
    /// Walks the input-side subgraph post-order: an edge becomes ready only
    /// once none of its inputs are themselves awaiting a build.
    pub fn add_target(&mut self, state: &State, node: NodeId) -> anyhow::Result<bool> {
        if !state.node(node).dirty {
            return Ok(false);
        }
        if self.want.contains(&node) {
            return Ok(true);
        }
        let edge = match state.node(node).in_edge {
            Some(edge) => edge,
            None => {
                let file = state.file(state.node(node).file);
                if file.mtime == MTime::Unknown {
                    bail!("input {} missing", file.path);
                }
                // A changed source file; there is nothing to run for it.
                return Ok(false);
            }
        };

        self.want.insert(node);

        let mut awaiting_inputs = false;
        for i in 0..state.edge(edge).ins.len() {
            let input = state.edge(edge).ins[i];
            if self.add_target(state, input)? {
                awaiting_inputs = true;
            }
        }

        if !awaiting_inputs && !self.ready.contains(&edge) {
            self.ready.push_back(edge);
        }

        Ok(true)
    }

    /// Dispense the next ready edge, FIFO.
    pub fn find_work(&mut self) -> Option<EdgeId> {
        self.ready.pop_front()
    }

    pub fn wants(&self, node: NodeId) -> bool {
        self.want.contains(&node)
    }
}
