//! 投影继承：把不属于父网的迁移（以及名为静默标记的迁移）视为 τ，
//! 在父子可达图之间检查弱互模拟。
//!
//! 弱迁移 `M =a=> M'` 定义为 `τ* a τ*`。从 (父初始, 子初始) 出发维护标识对的
//! 工作队列：一侧的每个弱迁移都必须在另一侧找到同名弱迁移，所有匹配得到的
//! 新标识对入队，直到队列耗尽或出现无法匹配的迁移。
use std::collections::{BTreeSet, VecDeque};
use std::rc::Rc;

use indexmap::IndexSet;
use petgraph::stable_graph::NodeIndex;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::analysis::{IdSet, Mismatch, Side};
use crate::graph::ReachabilityGraph;
use crate::net::ids::{LabelId, TransitionId};
use crate::net::index_vec::{Idx, IndexVec};

pub const DEFAULT_SILENT_LABEL: &str = "tau";

/// Visible/silent partition of transition names.
#[derive(Debug, Clone, Copy)]
pub struct Visibility<'a> {
    parent_transition_ids: &'a IdSet,
    silent_labels: &'a [String],
}

impl<'a> Visibility<'a> {
    pub fn new(parent_transition_ids: &'a IdSet, silent_labels: &'a [String]) -> Self {
        Self {
            parent_transition_ids,
            silent_labels,
        }
    }

    pub fn is_visible(&self, transition: &str) -> bool {
        self.parent_transition_ids.contains(transition)
            && !self.silent_labels.iter().any(|s| s == transition)
    }
}

type Moves = Rc<[(LabelId, NodeIndex)]>;

/// One graph seen through a visibility partition, with memoised τ-closures
/// and weak moves.
struct WeakView<'g> {
    graph: &'g ReachabilityGraph,
    labels: IndexVec<TransitionId, Option<LabelId>>,
    closures: FxHashMap<NodeIndex, Rc<[NodeIndex]>>,
    moves: FxHashMap<NodeIndex, Moves>,
}

impl<'g> WeakView<'g> {
    fn new(
        graph: &'g ReachabilityGraph,
        visibility: &Visibility<'_>,
        alphabet: &mut IndexSet<String>,
    ) -> Self {
        let labels = graph
            .transitions()
            .iter()
            .map(|name| {
                visibility
                    .is_visible(name)
                    .then(|| LabelId::from_usize(alphabet.insert_full(name.clone()).0))
            })
            .collect();
        Self {
            graph,
            labels,
            closures: FxHashMap::default(),
            moves: FxHashMap::default(),
        }
    }

    fn tau_closure(&mut self, node: NodeIndex) -> Rc<[NodeIndex]> {
        let graph = self.graph;
        let labels = &self.labels;
        self.closures
            .entry(node)
            .or_insert_with(|| silent_reach(graph, labels, node).into_iter().collect())
            .clone()
    }

    fn visible_moves(&mut self, node: NodeIndex) -> Moves {
        if let Some(moves) = self.moves.get(&node) {
            return moves.clone();
        }
        let mut moves = BTreeSet::new();
        for &before in self.tau_closure(node).iter() {
            let visible: Vec<(LabelId, NodeIndex)> = self
                .graph
                .successors(before)
                .filter_map(|(t, target)| self.labels[t].map(|label| (label, target)))
                .collect();
            for (label, after) in visible {
                for &settled in self.tau_closure(after).iter() {
                    moves.insert((label, settled));
                }
            }
        }
        let moves: Moves = moves.into_iter().collect();
        self.moves.insert(node, moves.clone());
        moves
    }
}

fn silent_reach(
    graph: &ReachabilityGraph,
    labels: &IndexVec<TransitionId, Option<LabelId>>,
    start: NodeIndex,
) -> BTreeSet<NodeIndex> {
    let mut closure = BTreeSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(node) = queue.pop_front() {
        for (transition, target) in graph.successors(node) {
            if labels[transition].is_none() && closure.insert(target) {
                queue.push_back(target);
            }
        }
    }
    closure
}

/// Markings reachable from `node` using only silent edges, `node` included.
pub fn tau_closure(
    graph: &ReachabilityGraph,
    node: NodeIndex,
    visibility: &Visibility<'_>,
) -> BTreeSet<NodeIndex> {
    let labels = graph
        .transitions()
        .iter()
        .map(|name| visibility.is_visible(name).then_some(LabelId::new(0)))
        .collect();
    silent_reach(graph, &labels, node)
}

/// Weak moves `(label, target)` of `node`: τ* followed by one visible edge
/// followed by τ*.
pub fn visible_moves(
    graph: &ReachabilityGraph,
    node: NodeIndex,
    visibility: &Visibility<'_>,
) -> BTreeSet<(String, NodeIndex)> {
    let mut alphabet = IndexSet::new();
    let mut view = WeakView::new(graph, visibility, &mut alphabet);
    view.visible_moves(node)
        .iter()
        .filter_map(|&(label, target)| {
            alphabet
                .get_index(label.index())
                .map(|name| (name.clone(), target))
        })
        .collect()
}

/// Weak-bisimulation style check of `child` against `parent`, seeded with the
/// pair of initial markings.
pub fn check_projection(
    parent: &ReachabilityGraph,
    child: &ReachabilityGraph,
    parent_transition_ids: &IdSet,
    silent_labels: &[String],
) -> Result<(), Mismatch> {
    let visibility = Visibility::new(parent_transition_ids, silent_labels);
    let mut alphabet = IndexSet::new();
    let mut parent_view = WeakView::new(parent, &visibility, &mut alphabet);
    let mut child_view = WeakView::new(child, &visibility, &mut alphabet);

    let start = (parent.initial(), child.initial());
    let mut visited: FxHashSet<(NodeIndex, NodeIndex)> = FxHashSet::default();
    visited.insert(start);
    let mut worklist = VecDeque::from([start]);

    while let Some((p, c)) = worklist.pop_front() {
        let parent_moves = parent_view.visible_moves(p);
        let child_moves = child_view.visible_moves(c);

        for (side, own, other) in [
            (Side::Parent, &parent_moves, &child_moves),
            (Side::Child, &child_moves, &parent_moves),
        ] {
            for &(label, own_next) in own.iter() {
                let mut matched = false;
                for &(_, other_next) in other.iter().filter(|(l, _)| *l == label) {
                    matched = true;
                    let pair = match side {
                        Side::Parent => (own_next, other_next),
                        Side::Child => (other_next, own_next),
                    };
                    if visited.insert(pair) {
                        worklist.push_back(pair);
                    }
                }
                if !matched {
                    let mismatch = Mismatch::UnmatchedMove {
                        side,
                        transition: alphabet
                            .get_index(label.index())
                            .cloned()
                            .unwrap_or_default(),
                        parent_marking: parent.describe(parent.marking(p)),
                        child_marking: child.describe(child.marking(c)),
                    };
                    log::debug!("projection check failed: {}", mismatch);
                    return Err(mismatch);
                }
            }
        }
    }

    log::debug!("projection check explored {} marking pairs", visited.len());
    Ok(())
}

pub fn is_projection_inheritance(
    parent: &ReachabilityGraph,
    child: &ReachabilityGraph,
    parent_transition_ids: &IdSet,
    silent_labels: &[String],
) -> bool {
    check_projection(parent, child, parent_transition_ids, silent_labels).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{ArcPolicy, Net, PetriNet};

    fn graph(model: &PetriNet) -> ReachabilityGraph {
        ReachabilityGraph::from_net(&Net::from_model(model, ArcPolicy::Lenient).unwrap()).unwrap()
    }

    fn ids(model: &PetriNet) -> IdSet {
        model.transitions.iter().map(|t| t.id.clone()).collect()
    }

    fn tau() -> Vec<String> {
        vec![DEFAULT_SILENT_LABEL.to_string()]
    }

    fn loop_net() -> PetriNet {
        PetriNet::new()
            .with_place("P1", 1)
            .with_transition("T1")
            .with_arc("P1", "T1", 1)
            .with_arc("T1", "P1", 1)
    }

    fn detour_net() -> PetriNet {
        PetriNet::new()
            .with_place("P1", 1)
            .with_place("P3", 0)
            .with_transition("T1")
            .with_transition("T2")
            .with_arc("P1", "T2", 1)
            .with_arc("T2", "P3", 1)
            .with_arc("P3", "T1", 1)
            .with_arc("T1", "P1", 1)
    }

    #[test]
    fn graph_is_bisimilar_to_itself() {
        let net = detour_net();
        let g = graph(&net);
        assert_eq!(check_projection(&g, &g, &ids(&net), &[]), Ok(()));
    }

    #[test]
    fn silent_detour_is_projection_related() {
        let parent = loop_net();
        assert!(is_projection_inheritance(
            &graph(&parent),
            &graph(&detour_net()),
            &ids(&parent),
            &tau()
        ));
    }

    #[test]
    fn tau_closure_follows_only_silent_edges() {
        let parent_ids = ids(&loop_net());
        let silent = tau();
        let visibility = Visibility::new(&parent_ids, &silent);
        let child = graph(&detour_net());

        let closure = tau_closure(&child, child.initial(), &visibility);
        assert_eq!(closure.len(), 2);

        let after_t2 = child.successor(child.initial(), "T2").unwrap();
        let closure = tau_closure(&child, after_t2, &visibility);
        assert_eq!(closure, BTreeSet::from([after_t2]));

        let moves = visible_moves(&child, child.initial(), &visibility);
        assert_eq!(
            moves,
            BTreeSet::from([
                ("T1".to_string(), child.initial()),
                ("T1".to_string(), after_t2),
            ])
        );
    }

    #[test]
    fn named_silent_label_is_never_visible() {
        let parent_ids: IdSet = ["T1", "tau"].iter().map(|s| s.to_string()).collect();
        let silent = tau();
        let visibility = Visibility::new(&parent_ids, &silent);
        assert!(visibility.is_visible("T1"));
        assert!(!visibility.is_visible("tau"));
        assert!(!visibility.is_visible("T9"));
    }

    #[test]
    fn disabled_parent_action_is_unmatched() {
        let parent = loop_net();
        let child = PetriNet::new()
            .with_place("P1", 1)
            .with_transition("T1")
            .with_arc("P1", "T1", 2)
            .with_arc("T1", "P1", 2);
        let err = check_projection(&graph(&parent), &graph(&child), &ids(&parent), &tau())
            .unwrap_err();
        assert!(matches!(
            err,
            Mismatch::UnmatchedMove { side: Side::Parent, ref transition, .. } if transition == "T1"
        ));
    }

    #[test]
    fn extra_visible_child_behaviour_is_rejected() {
        // 子网可以在 T1 之后再做一次父网没有的 T1
        let parent = PetriNet::new()
            .with_place("P1", 1)
            .with_place("P2", 0)
            .with_transition("T1")
            .with_arc("P1", "T1", 1)
            .with_arc("T1", "P2", 1);
        let child = PetriNet::new()
            .with_place("P1", 2)
            .with_place("P2", 0)
            .with_transition("T1")
            .with_arc("P1", "T1", 1)
            .with_arc("T1", "P2", 1);
        let err = check_projection(&graph(&parent), &graph(&child), &ids(&parent), &tau())
            .unwrap_err();
        assert!(matches!(
            err,
            Mismatch::UnmatchedMove {
                side: Side::Child,
                ..
            }
        ));
    }
}
