//! Multi-hop routing queries over the network
//!
//! All walks are iterative and keep their own visited/colour arenas keyed by
//! dense node index, so cycles never loop and never overflow the stack.

use std::collections::VecDeque;

use petgraph::graph::NodeIndex;
use petgraph::Direction;

use super::network::Network;
use crate::errors::Result;
use crate::features::network::domain::{NodeId, NodeKind};
use crate::shared::Region;

const WHITE: u8 = 0;
const GRAY: u8 = 1;
const BLACK: u8 = 2;

/// Everything reachable downstream of one structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownstreamWalk {
    pub origin: NodeId,
    /// Reached structures including the origin, sorted
    pub reached: Vec<NodeId>,
    /// Reached structures without successors, sorted
    pub terminals: Vec<NodeId>,
    /// The walk closed at least one cycle
    pub has_cycle: bool,
}

impl DownstreamWalk {
    pub fn reaches(&self, id: NodeId) -> bool {
        self.reached.binary_search(&id).is_ok()
    }
}

impl Network {
    /// Depth-first walk downstream of `id` with cycle detection
    pub fn downstream_walk(&self, id: NodeId) -> Result<DownstreamWalk> {
        let start = self.index_of(id)?;
        let mut colour = vec![WHITE; self.graph.node_count()];
        let mut reached = Vec::new();
        let mut terminals = Vec::new();
        let mut has_cycle = false;

        // (node, sorted successors, next position)
        let mut stack: Vec<(NodeIndex, Vec<NodeIndex>, usize)> = Vec::new();
        colour[start.index()] = GRAY;
        stack.push((start, self.sorted_neighbors(start, Direction::Outgoing), 0));

        while let Some((node, next, pos)) = stack.last_mut() {
            if *pos == next.len() {
                let node = *node;
                if next.is_empty() {
                    terminals.push(self.graph[node].id);
                }
                colour[node.index()] = BLACK;
                reached.push(self.graph[node].id);
                stack.pop();
                continue;
            }

            let child = next[*pos];
            *pos += 1;
            match colour[child.index()] {
                WHITE => {
                    colour[child.index()] = GRAY;
                    let successors = self.sorted_neighbors(child, Direction::Outgoing);
                    stack.push((child, successors, 0));
                }
                GRAY => has_cycle = true,
                _ => {}
            }
        }

        reached.sort_unstable();
        terminals.sort_unstable();
        Ok(DownstreamWalk {
            origin: id,
            reached,
            terminals,
            has_cycle,
        })
    }

    /// Nearest outfall downstream of `id` (breadth-first, ties by id)
    ///
    /// An outfall `id` is its own answer.
    pub fn find_downstream_outfall(&self, id: NodeId) -> Result<Option<NodeId>> {
        let start = self.index_of(id)?;
        let mut seen = vec![false; self.graph.node_count()];
        let mut queue = VecDeque::from([start]);
        seen[start.index()] = true;

        while let Some(node) = queue.pop_front() {
            if self.graph[node].kind == NodeKind::Outfall {
                return Ok(Some(self.graph[node].id));
            }
            for next in self.sorted_neighbors(node, Direction::Outgoing) {
                if !seen[next.index()] {
                    seen[next.index()] = true;
                    queue.push_back(next);
                }
            }
        }
        Ok(None)
    }

    /// Terminal structures of the downstream walk from `id`, sorted
    pub fn outlets(&self, id: NodeId) -> Result<Vec<NodeId>> {
        Ok(self.downstream_walk(id)?.terminals)
    }

    /// Where flow captured inside `region` leaves it
    ///
    /// Outlets of the inlets inside `region` that lie outside it, sorted.
    pub fn outlet_nodes<R: Region + ?Sized>(&self, region: &R) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        for inlet in self.nodes_within(region).into_iter().filter(|n| n.is_inlet()) {
            for terminal in self.outlets(inlet.id)? {
                let location = self.node(terminal)?.location;
                if !region.contains_point(&location) {
                    out.push(terminal);
                }
            }
        }
        out.sort_unstable();
        out.dedup();
        Ok(out)
    }

    /// Where flow discharged inside `region` comes from
    ///
    /// Structures outside `region` upstream of the outfalls inside it, sorted.
    /// Implicit structures are skipped.
    pub fn inlet_nodes<R: Region + ?Sized>(&self, region: &R) -> Result<Vec<NodeId>> {
        let mut seen = vec![false; self.graph.node_count()];
        let mut out = Vec::new();

        for outfall in self.nodes_within(region).into_iter().filter(|n| n.is_outfall()) {
            let start = self.index_of(outfall.id)?;
            if seen[start.index()] {
                continue;
            }
            seen[start.index()] = true;
            let mut queue = VecDeque::from([start]);

            while let Some(node) = queue.pop_front() {
                let weight = &self.graph[node];
                if !weight.implicit && !region.contains_point(&weight.location) {
                    out.push(weight.id);
                }
                for prev in self.sorted_neighbors(node, Direction::Incoming) {
                    if !seen[prev.index()] {
                        seen[prev.index()] = true;
                        queue.push_back(prev);
                    }
                }
            }
        }

        out.sort_unstable();
        Ok(out)
    }

    fn sorted_neighbors(&self, idx: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut next: Vec<NodeIndex> = self.graph.neighbors_directed(idx, direction).collect();
        next.sort_unstable_by_key(|n| self.graph[*n].id);
        next.dedup();
        next
    }
}
