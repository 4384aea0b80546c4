//! Depth-first traversal over `connects_as_source` edges.

use super::{EdgeIx, HierarchyModel, NodeIx};
use rustc_hash::FxHashSet as HashSet;

/// One step of a traversal: arriving at `node`, from `parent` over `edge` (both `None` for a
/// start node).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub parent: Option<NodeIx>,
    pub node: NodeIx,
    pub edge: Option<EdgeIx>,
    /// `node` had not been seen before this step; it will be expanded next.
    pub first_visit: bool,
    /// `node` is an ancestor of `parent` on the current search path.
    pub on_path: bool,
}

struct Frame {
    node: NodeIx,
    // Snapshot taken on entry so visitors may rewire adjacency lists mid-walk.
    out: Vec<EdgeIx>,
    next: usize,
}

impl HierarchyModel {
    /// Runs a DFS from each of `starts` in order, calling `visitor` for every step, including
    /// steps that reach an already seen node. `seen` carries over between calls so a second
    /// walk can skip what a first walk covered.
    ///
    /// The walk is iterative; the active path is kept as an explicit stack plus a set.
    pub fn visit<F>(&mut self, starts: &[NodeIx], seen: &mut HashSet<NodeIx>, mut visitor: F)
    where
        F: FnMut(&mut HierarchyModel, Step),
    {
        let mut active: HashSet<NodeIx> = HashSet::default();
        let mut stack: Vec<Frame> = Vec::new();

        for &start in starts {
            let first_visit = seen.insert(start);
            visitor(
                self,
                Step {
                    parent: None,
                    node: start,
                    edge: None,
                    first_visit,
                    on_path: false,
                },
            );
            if !first_visit {
                continue;
            }
            active.insert(start);
            stack.push(Frame {
                node: start,
                out: self.node(start).connects_as_source.clone(),
                next: 0,
            });

            while let Some(top) = stack.len().checked_sub(1) {
                let frame = &mut stack[top];
                if frame.next >= frame.out.len() {
                    active.remove(&frame.node);
                    stack.pop();
                    continue;
                }
                let parent = frame.node;
                let edge = frame.out[frame.next];
                frame.next += 1;

                let node = self.edge(edge).target;
                let on_path = active.contains(&node);
                let first_visit = seen.insert(node);
                visitor(
                    self,
                    Step {
                        parent: Some(parent),
                        node,
                        edge: Some(edge),
                        first_visit,
                        on_path,
                    },
                );
                if first_visit {
                    active.insert(node);
                    stack.push(Frame {
                        node,
                        out: self.node(node).connects_as_source.clone(),
                        next: 0,
                    });
                }
            }
        }
    }
}
