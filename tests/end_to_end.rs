use std::path::PathBuf;

use pn_inherit::analysis::Mismatch;
use pn_inherit::net::io::{read_net, write_net};
use pn_inherit::options::Options;
use pn_inherit::{
    AnalysisError, AnalyzerConfig, InheritanceAnalyzer, InheritanceKind, NetRole, PetriNet,
    StateSpaceOverflow, classify,
};

fn load(name: &str) -> PetriNet {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name);
    read_net(&path).unwrap()
}

#[test]
fn extra_transition_gives_protocol_inheritance() {
    let parent = load("parent_loop.json");
    let child = load("child_extra_transition.json");
    assert_eq!(
        classify(&parent, &child),
        Ok(InheritanceKind::ProtocolInheritance)
    );
}

#[test]
fn silent_detour_gives_projection_inheritance() {
    let parent = load("parent_loop.json");
    let child = load("child_detour.json");
    let report = InheritanceAnalyzer::default()
        .analyze(&parent, &child)
        .unwrap();
    assert_eq!(report.kind, InheritanceKind::ProjectionInheritance);
    assert_eq!(
        report.protocol.mismatch,
        Some(Mismatch::MissingTransition {
            parent_marking: "{P1: 1}".into(),
            transition: "T1".into(),
        })
    );
    assert_eq!(report.child_graph.state_count, 2);
}

#[test]
fn blocked_transition_gives_no_inheritance() {
    let parent = load("parent_loop.json");
    let child = load("child_blocked.json");
    assert_eq!(classify(&parent, &child), Ok(InheritanceKind::NoInheritance));
}

#[test]
fn unbounded_child_overflows_instead_of_classifying() {
    let parent = load("parent_loop.json");
    let child = load("child_unbounded.json");
    assert_eq!(
        classify(&parent, &child),
        Err(AnalysisError::StateSpaceOverflow {
            net: NetRole::Child,
            source: StateSpaceOverflow { limit: 10_000 },
        })
    );
}

#[test]
fn every_net_inherits_from_itself() {
    for name in [
        "parent_loop.json",
        "child_extra_transition.json",
        "child_detour.json",
        "child_blocked.json",
    ] {
        let net = load(name);
        assert_eq!(
            classify(&net, &net),
            Ok(InheritanceKind::ProtocolInheritance),
            "{}",
            name
        );
    }
}

#[test]
fn ron_copy_classifies_like_json() {
    let child = load("child_detour.json");
    let path = std::env::temp_dir().join(format!("pn-inherit-{}.ron", std::process::id()));
    write_net(&path, &child).unwrap();
    let reloaded = read_net(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(reloaded, child);
    assert_eq!(
        classify(&load("parent_loop.json"), &reloaded),
        Ok(InheritanceKind::ProjectionInheritance)
    );
}

#[test]
fn command_line_flags_reach_the_analyzer() {
    let options = Options::parse_from_str("parent.json child.json --state-limit 3").unwrap();
    let mut config = AnalyzerConfig::default();
    options.apply(&mut config);
    let analyzer = InheritanceAnalyzer::new(config);

    let err = analyzer
        .classify(&load("parent_loop.json"), &load("child_unbounded.json"))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "child net is too large to analyze: reachability graph exceeds the limit of 3 markings"
    );
}

#[test]
fn report_serializes_to_json() {
    let report = InheritanceAnalyzer::default()
        .analyze(&load("parent_loop.json"), &load("child_blocked.json"))
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["kind"], "NoInheritance");
    assert_eq!(json["protocol"]["holds"], false);
    assert_eq!(json["projection"]["mismatch"]["kind"], "unmatched_move");
    assert_eq!(json["projection"]["mismatch"]["side"], "parent");
}
