//! 父网标识与子网标识之间的投影相等。
//!
//! 两个标识在父网库所集合上逐一相等（缺省视为 0）即投影相等；严格模式下，
//! 子网中父网可达图里不存在的扩展库所还必须为空。
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::analysis::IdSet;
use crate::graph::ReachabilityGraph;
use crate::net::ids::PlaceId;
use crate::net::structure::{Marking, Weight};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Child places unknown to the parent must hold no tokens.
    Strict,
    /// Only the parent's places are compared.
    #[default]
    Lenient,
}

#[derive(Debug, Clone)]
pub struct Correspondence {
    /// One entry per parent place id, in id order.
    shared: Vec<(Option<PlaceId>, Option<PlaceId>)>,
    /// Child places that must be empty (strict mode only).
    extension: Vec<PlaceId>,
}

impl Correspondence {
    pub fn new(
        parent: &ReachabilityGraph,
        parent_place_ids: &IdSet,
        child: &ReachabilityGraph,
        strictness: Strictness,
    ) -> Self {
        let parent_index = name_index(parent);
        let child_index = name_index(child);

        let shared = parent_place_ids
            .iter()
            .map(|name| {
                (
                    parent_index.get(name.as_str()).copied(),
                    child_index.get(name.as_str()).copied(),
                )
            })
            .collect();

        let extension = match strictness {
            Strictness::Strict => child
                .places()
                .iter_enumerated()
                .filter(|(_, name)| {
                    !parent_place_ids.contains(name.as_str())
                        && !parent_index.contains_key(name.as_str())
                })
                .map(|(id, _)| id)
                .collect(),
            Strictness::Lenient => Vec::new(),
        };

        Self { shared, extension }
    }

    /// Tokens of a parent marking on the parent place set.
    pub fn parent_key(&self, marking: &Marking) -> Vec<Weight> {
        self.shared
            .iter()
            .map(|(place, _)| place.map_or(0, |p| marking.tokens(p)))
            .collect()
    }

    /// Tokens of a child marking on the parent place set, or `None` when the
    /// marking has leaked tokens into extension places.
    pub fn child_key(&self, marking: &Marking) -> Option<Vec<Weight>> {
        if self.extension.iter().any(|&p| marking.tokens(p) != 0) {
            return None;
        }
        Some(
            self.shared
                .iter()
                .map(|(_, place)| place.map_or(0, |p| marking.tokens(p)))
                .collect(),
        )
    }

    pub fn matches(&self, parent: &Marking, child: &Marking) -> bool {
        if self.extension.iter().any(|&p| child.tokens(p) != 0) {
            return false;
        }
        self.shared.iter().all(|&(p, c)| {
            p.map_or(0, |p| parent.tokens(p)) == c.map_or(0, |c| child.tokens(c))
        })
    }
}

fn name_index(graph: &ReachabilityGraph) -> FxHashMap<&str, PlaceId> {
    graph
        .places()
        .iter_enumerated()
        .map(|(id, name)| (name.as_str(), id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{ArcPolicy, Net, PetriNet};

    fn graph(model: &PetriNet) -> ReachabilityGraph {
        ReachabilityGraph::from_net(&Net::from_model(model, ArcPolicy::Lenient).unwrap()).unwrap()
    }

    fn ids(names: &[&str]) -> IdSet {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn places_are_matched_by_name_not_position() {
        let parent = graph(&PetriNet::new().with_place("A", 1).with_place("B", 2));
        let child = graph(&PetriNet::new().with_place("B", 2).with_place("A", 1));
        let c = Correspondence::new(&parent, &ids(&["A", "B"]), &child, Strictness::Strict);
        assert!(c.matches(
            parent.marking(parent.initial()),
            child.marking(child.initial())
        ));
        assert_eq!(
            c.parent_key(parent.marking(parent.initial())),
            c.child_key(child.marking(child.initial())).unwrap()
        );
    }

    #[test]
    fn missing_places_count_as_empty() {
        let parent = graph(&PetriNet::new().with_place("A", 0).with_place("B", 1));
        let child = graph(&PetriNet::new().with_place("B", 1));
        let c = Correspondence::new(&parent, &ids(&["A", "B"]), &child, Strictness::Strict);
        assert!(c.matches(
            parent.marking(parent.initial()),
            child.marking(child.initial())
        ));
    }

    #[test]
    fn strictness_controls_extension_places() {
        let parent = graph(&PetriNet::new().with_place("A", 1));
        let child = graph(&PetriNet::new().with_place("A", 1).with_place("X", 3));
        let pm = parent.marking(parent.initial());
        let cm = child.marking(child.initial());

        let strict = Correspondence::new(&parent, &ids(&["A"]), &child, Strictness::Strict);
        assert!(!strict.matches(pm, cm));
        assert!(strict.child_key(cm).is_none());

        let lenient = Correspondence::new(&parent, &ids(&["A"]), &child, Strictness::Lenient);
        assert!(lenient.matches(pm, cm));
        assert_eq!(Strictness::default(), Strictness::Lenient);
    }

    #[test]
    fn implicit_parent_places_are_not_extensions() {
        // Ghost 只由弧端点引入，父网声明中没有它
        let model = PetriNet::new()
            .with_place("P1", 1)
            .with_transition("T1")
            .with_arc("P1", "T1", 1)
            .with_arc("T1", "Ghost", 1);
        let g = graph(&model);
        let after = g.successor(g.initial(), "T1").unwrap();
        let c = Correspondence::new(&g, &ids(&["P1"]), &g, Strictness::Strict);
        assert!(c.child_key(g.marking(after)).is_some());
        assert!(c.matches(g.marking(after), g.marking(after)));
    }
}
