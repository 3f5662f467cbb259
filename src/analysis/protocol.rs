//! 协议继承：子网可达图限制到父网迁移后，父网的每个标识和每次发射都能被复现。
use petgraph::stable_graph::NodeIndex;
use rustc_hash::FxHashMap;

use crate::analysis::correspondence::{Correspondence, Strictness};
use crate::analysis::{IdSet, Mismatch};
use crate::graph::ReachabilityGraph;
use crate::net::structure::Weight;

/// Checks that `parent` embeds into `child` restricted to the parent's
/// transitions.
///
/// A parent marking is matched by any projection-equal child marking that
/// offers, for every parent edge `M -t-> M'`, an edge labelled `t` whose
/// target is projection-equal to `M'`. Extra child behaviour is allowed.
pub fn check_protocol(
    parent: &ReachabilityGraph,
    parent_place_ids: &IdSet,
    parent_transition_ids: &IdSet,
    child: &ReachabilityGraph,
    strictness: Strictness,
) -> Result<(), Mismatch> {
    let restricted = child.restrict(|name| parent_transition_ids.contains(name));
    let correspondence = Correspondence::new(parent, parent_place_ids, &restricted, strictness);

    let mut candidates: FxHashMap<Vec<Weight>, Vec<NodeIndex>> = FxHashMap::default();
    for node in restricted.nodes() {
        if let Some(key) = correspondence.child_key(restricted.marking(node)) {
            candidates.entry(key).or_default().push(node);
        }
    }

    for parent_node in parent.nodes() {
        let parent_marking = parent.marking(parent_node);
        let key = correspondence.parent_key(parent_marking);
        let Some(matching) = candidates.get(&key) else {
            let mismatch = Mismatch::MissingMarking {
                parent_marking: parent.describe(parent_marking),
            };
            log::debug!("protocol check failed: {}", mismatch);
            return Err(mismatch);
        };

        let mut missing: Option<&str> = None;
        let reproduced = matching.iter().any(|&child_node| {
            for (transition, parent_target) in parent.successors(parent_node) {
                let name = parent.transition_name(transition);
                let ok = restricted
                    .successor(child_node, name)
                    .is_some_and(|child_target| {
                        correspondence.matches(
                            parent.marking(parent_target),
                            restricted.marking(child_target),
                        )
                    });
                if !ok {
                    missing.get_or_insert(name);
                    return false;
                }
            }
            true
        });

        if !reproduced {
            let mismatch = Mismatch::MissingTransition {
                parent_marking: parent.describe(parent_marking),
                transition: missing.unwrap_or_default().to_string(),
            };
            log::debug!("protocol check failed: {}", mismatch);
            return Err(mismatch);
        }
        log::trace!(
            "parent marking {} matched by {} child marking(s)",
            parent.describe(parent_marking),
            matching.len()
        );
    }
    Ok(())
}

pub fn is_protocol_inheritance(
    parent: &ReachabilityGraph,
    parent_place_ids: &IdSet,
    parent_transition_ids: &IdSet,
    child: &ReachabilityGraph,
    strictness: Strictness,
) -> bool {
    check_protocol(
        parent,
        parent_place_ids,
        parent_transition_ids,
        child,
        strictness,
    )
    .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{ArcPolicy, Net, PetriNet};

    fn graph(model: &PetriNet) -> ReachabilityGraph {
        ReachabilityGraph::from_net(&Net::from_model(model, ArcPolicy::Lenient).unwrap()).unwrap()
    }

    fn loop_net() -> PetriNet {
        PetriNet::new()
            .with_place("P1", 1)
            .with_transition("T1")
            .with_arc("P1", "T1", 1)
            .with_arc("T1", "P1", 1)
    }

    fn check(parent: &PetriNet, child: &PetriNet, strictness: Strictness) -> Result<(), Mismatch> {
        let places = parent.places.iter().map(|p| p.id.clone()).collect();
        let transitions = parent.transitions.iter().map(|t| t.id.clone()).collect();
        check_protocol(
            &graph(parent),
            &places,
            &transitions,
            &graph(child),
            strictness,
        )
    }

    #[test]
    fn identical_nets_are_protocol_related() {
        assert_eq!(check(&loop_net(), &loop_net(), Strictness::Strict), Ok(()));
    }

    #[test]
    fn extra_child_transitions_are_ignored() {
        let child = loop_net().with_transition("T2");
        assert_eq!(check(&loop_net(), &child, Strictness::Strict), Ok(()));
    }

    #[test]
    fn silent_detour_breaks_protocol() {
        let child = PetriNet::new()
            .with_place("P1", 1)
            .with_place("P3", 0)
            .with_transition("T1")
            .with_transition("T2")
            .with_arc("P1", "T2", 1)
            .with_arc("T2", "P3", 1)
            .with_arc("P3", "T1", 1)
            .with_arc("T1", "P1", 1);
        let err = check(&loop_net(), &child, Strictness::Strict).unwrap_err();
        assert_eq!(
            err,
            Mismatch::MissingTransition {
                parent_marking: "{P1: 1}".into(),
                transition: "T1".into(),
            }
        );
    }

    #[test]
    fn missing_parent_marking_is_reported() {
        let child = PetriNet::new()
            .with_place("P1", 2)
            .with_transition("T1")
            .with_arc("P1", "T1", 1)
            .with_arc("T1", "P1", 1);
        assert!(matches!(
            check(&loop_net(), &child, Strictness::Strict),
            Err(Mismatch::MissingMarking { .. })
        ));
    }

    #[test]
    fn any_matching_child_marking_may_serve() {
        // 子网有两个与父网初始标识投影相等的标识，只有第二个能发射 T1
        let parent = loop_net();
        let child = PetriNet::new()
            .with_place("P1", 1)
            .with_place("Gate", 0)
            .with_place("Open", 1)
            .with_transition("T1")
            .with_transition("Unlock")
            .with_arc("Open", "Unlock", 1)
            .with_arc("Unlock", "Gate", 1)
            .with_arc("P1", "T1", 1)
            .with_arc("Gate", "T1", 1)
            .with_arc("T1", "P1", 1)
            .with_arc("T1", "Gate", 1);
        assert_eq!(check(&parent, &child, Strictness::Lenient), Ok(()));
        assert!(check(&parent, &child, Strictness::Strict).is_err());
    }
}
