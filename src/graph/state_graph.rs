use std::collections::VecDeque;
use std::collections::hash_map::Entry;
use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::Path;

use itertools::Itertools;
use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use rustc_hash::FxHashMap;
use serde::Serialize;
use thiserror::Error;

use crate::net::core::escape_label;
use crate::net::ids::{PlaceId, TransitionId};
use crate::net::index_vec::IndexVec;
use crate::net::structure::{Marking, Weight};
use crate::net::Net;

pub const DEFAULT_STATE_LIMIT: usize = 10_000;

/// 可达状态数超过上限时返回，绝不截断图。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("reachability graph exceeds the limit of {limit} markings")]
pub struct StateSpaceOverflow {
    pub limit: usize,
}

#[derive(Debug, Clone)]
pub struct StateGraphConfig {
    /// 最多保存的标识数量，初始标识也计算在内。
    pub state_limit: usize,
}

impl Default for StateGraphConfig {
    fn default() -> Self {
        Self {
            state_limit: DEFAULT_STATE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StateGraphStats {
    pub state_count: usize,
    pub edge_count: usize,
    pub deadlock_count: usize,
}

/// Reachability graph: vertices are the markings reachable from the initial
/// marking, edges are labelled with the transition fired.
///
/// Place and transition names are copied from the source net so two graphs
/// built from different nets can be compared by name.
#[derive(Debug, Clone)]
pub struct ReachabilityGraph {
    graph: StableGraph<Marking, TransitionId>,
    initial: NodeIndex,
    places: IndexVec<PlaceId, String>,
    transitions: IndexVec<TransitionId, String>,
}

impl ReachabilityGraph {
    pub fn from_net(net: &Net) -> Result<Self, StateSpaceOverflow> {
        Self::build(net, &StateGraphConfig::default())
    }

    /// 广度优先构造可达图。
    ///
    /// 每个已访问标识上的每个可发生迁移都贡献一条边，即使目标标识此前已被发现；
    /// 标识只在首次发现时入队。
    pub fn build(net: &Net, config: &StateGraphConfig) -> Result<Self, StateSpaceOverflow> {
        let overflow = StateSpaceOverflow {
            limit: config.state_limit,
        };
        if config.state_limit == 0 {
            return Err(overflow);
        }

        let mut graph = StableGraph::new();
        let mut markings: FxHashMap<Marking, NodeIndex> = FxHashMap::default();
        let mut queue = VecDeque::new();

        let initial_marking = net.initial_marking();
        let initial = graph.add_node(initial_marking.clone());
        markings.insert(initial_marking, initial);
        queue.push_back(initial);

        while let Some(state) = queue.pop_front() {
            let current = graph[state].clone();
            for transition in net.enabled_transitions(&current) {
                let next = match net.fire_transition(&current, transition) {
                    Ok(next) => next,
                    Err(err) => {
                        log::debug!("aborting exploration at {:?}: {}", state, err);
                        return Err(overflow);
                    }
                };
                let target = match markings.entry(next) {
                    Entry::Occupied(entry) => *entry.get(),
                    Entry::Vacant(entry) => {
                        if graph.node_count() >= config.state_limit {
                            log::debug!(
                                "state limit {} reached with {} markings queued",
                                config.state_limit,
                                queue.len()
                            );
                            return Err(overflow);
                        }
                        let index = graph.add_node(entry.key().clone());
                        entry.insert(index);
                        queue.push_back(index);
                        index
                    }
                };
                graph.add_edge(state, target, transition);
            }
        }

        log::debug!(
            "reachability graph: {} markings, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        Ok(Self {
            graph,
            initial,
            places: net.places.iter().map(|p| p.name.clone()).collect(),
            transitions: net.transitions.clone(),
        })
    }

    pub fn initial(&self) -> NodeIndex {
        self.initial
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn marking(&self, node: NodeIndex) -> &Marking {
        &self.graph[node]
    }

    /// Outgoing edges of `node` as `(transition, target)` pairs.
    pub fn successors(
        &self,
        node: NodeIndex,
    ) -> impl Iterator<Item = (TransitionId, NodeIndex)> + '_ {
        self.graph
            .edges_directed(node, Direction::Outgoing)
            .map(|edge| (*edge.weight(), edge.target()))
    }

    /// 按迁移名称查找后继；每个 (标识, 迁移) 至多一条边。
    pub fn successor(&self, node: NodeIndex, transition: &str) -> Option<NodeIndex> {
        self.successors(node)
            .find(|(t, _)| self.transition_name(*t) == transition)
            .map(|(_, target)| target)
    }

    pub fn places(&self) -> &IndexVec<PlaceId, String> {
        &self.places
    }

    pub fn transitions(&self) -> &IndexVec<TransitionId, String> {
        &self.transitions
    }

    pub fn place_name(&self, place: PlaceId) -> &str {
        &self.places[place]
    }

    pub fn transition_name(&self, transition: TransitionId) -> &str {
        &self.transitions[transition]
    }

    pub fn place_id(&self, name: &str) -> Option<PlaceId> {
        self.places
            .iter_enumerated()
            .find(|(_, place)| place.as_str() == name)
            .map(|(id, _)| id)
    }

    /// Token count of a named place at `node`; unknown places hold nothing.
    pub fn tokens(&self, node: NodeIndex, place: &str) -> Weight {
        self.place_id(place)
            .map(|id| self.graph[node].tokens(id))
            .unwrap_or(0)
    }

    pub fn describe(&self, marking: &Marking) -> String {
        let body = marking
            .iter()
            .map(|(place, tokens)| format!("{}: {}", self.place_name(place), tokens))
            .join(", ");
        format!("{{{}}}", body)
    }

    pub fn deadlocks(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&node| {
                self.graph
                    .edges_directed(node, Direction::Outgoing)
                    .next()
                    .is_none()
            })
            .collect()
    }

    pub fn stats(&self) -> StateGraphStats {
        StateGraphStats {
            state_count: self.node_count(),
            edge_count: self.edge_count(),
            deadlock_count: self.deadlocks().len(),
        }
    }

    /// 保留全部顶点（索引不变），只删除迁移名称不满足 `keep` 的边。
    pub fn restrict<F>(&self, keep: F) -> Self
    where
        F: Fn(&str) -> bool,
    {
        let mut restricted = self.clone();
        let transitions = &self.transitions;
        restricted.graph.retain_edges(|graph, edge| {
            graph
                .edge_weight(edge)
                .is_some_and(|t| keep(transitions[*t].as_str()))
        });
        restricted
    }

    /// Every edge as `(source, transition name, target)`, sorted, for
    /// comparisons independent of node numbering.
    pub fn edge_triples(&self) -> Vec<(&Marking, &str, &Marking)> {
        self.graph
            .edge_references()
            .map(|edge| {
                (
                    &self.graph[edge.source()],
                    self.transition_name(*edge.weight()),
                    &self.graph[edge.target()],
                )
            })
            .sorted_by_key(|(source, name, target)| {
                (format!("{:?}", source), name.to_string(), format!("{:?}", target))
            })
            .collect()
    }

    pub fn to_dot(&self) -> String {
        let mut dot = String::new();
        let _ = writeln!(&mut dot, "digraph ReachabilityGraph {{");
        let _ = writeln!(&mut dot, "    node [fontname=\"Helvetica\", shape=box];");
        for node in self.graph.node_indices() {
            let peripheries = if node == self.initial { 2 } else { 1 };
            let _ = writeln!(
                &mut dot,
                "    s{} [label=\"s{}\\n{}\", peripheries={}];",
                node.index(),
                node.index(),
                escape_label(&self.describe(&self.graph[node])),
                peripheries
            );
        }
        for edge in self.graph.edge_references() {
            let _ = writeln!(
                &mut dot,
                "    s{} -> s{} [label=\"{}\"];",
                edge.source().index(),
                edge.target().index(),
                escape_label(self.transition_name(*edge.weight()))
            );
        }
        let _ = writeln!(&mut dot, "}}");
        dot
    }

    pub fn write_dot<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_dot())
    }
}
