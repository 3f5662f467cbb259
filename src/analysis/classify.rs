//! 继承分类：先检查协议继承（更强），不成立时再检查投影继承。
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::IdSet;
use crate::analysis::projection::check_projection;
use crate::analysis::protocol::check_protocol;
use crate::config::AnalyzerConfig;
use crate::graph::{ReachabilityGraph, StateSpaceOverflow};
use crate::net::{ModelError, Net, PetriNet};
use crate::report::{CheckVerdict, InheritanceReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InheritanceKind {
    ProtocolInheritance,
    ProjectionInheritance,
    NoInheritance,
}

impl fmt::Display for InheritanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InheritanceKind::ProtocolInheritance => write!(f, "Protocol Inheritance"),
            InheritanceKind::ProjectionInheritance => write!(f, "Projection Inheritance"),
            InheritanceKind::NoInheritance => write!(f, "No Inheritance"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetRole {
    Parent,
    Child,
}

impl fmt::Display for NetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetRole::Parent => write!(f, "parent"),
            NetRole::Child => write!(f, "child"),
        }
    }
}

/// Reasons an analysis could not reach a verdict. Never the same thing as
/// [`InheritanceKind::NoInheritance`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("{net} net is malformed: {source}")]
    MalformedModel {
        net: NetRole,
        #[source]
        source: ModelError,
    },
    #[error("{net} net is too large to analyze: {source}")]
    StateSpaceOverflow {
        net: NetRole,
        #[source]
        source: StateSpaceOverflow,
    },
}

#[derive(Debug, Clone, Default)]
pub struct InheritanceAnalyzer {
    config: AnalyzerConfig,
}

impl InheritanceAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Compiles `model` with the configured arc policy.
    pub fn compile(&self, model: &PetriNet, role: NetRole) -> Result<Net, AnalysisError> {
        Net::from_model(model, self.config.arc_policy)
            .map_err(|source| AnalysisError::MalformedModel { net: role, source })
    }

    pub fn build_graph(
        &self,
        model: &PetriNet,
        role: NetRole,
    ) -> Result<ReachabilityGraph, AnalysisError> {
        let net = self.compile(model, role)?;
        let graph = ReachabilityGraph::build(&net, &self.config.state_graph()).map_err(
            |source| {
                log::warn!("{} net: {}", role, source);
                AnalysisError::StateSpaceOverflow { net: role, source }
            },
        )?;
        log::info!(
            "{} net: {} markings, {} edges",
            role,
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    /// 构造父网与子网的可达图；两次构造互不依赖，可以并行。
    pub fn build_graphs(
        &self,
        parent: &PetriNet,
        child: &PetriNet,
    ) -> Result<(ReachabilityGraph, ReachabilityGraph), AnalysisError> {
        let (parent_graph, child_graph) = if self.config.parallel {
            rayon::join(
                || self.build_graph(parent, NetRole::Parent),
                || self.build_graph(child, NetRole::Child),
            )
        } else {
            let parent_graph = self.build_graph(parent, NetRole::Parent)?;
            (Ok(parent_graph), self.build_graph(child, NetRole::Child))
        };
        Ok((parent_graph?, child_graph?))
    }

    pub fn analyze(
        &self,
        parent: &PetriNet,
        child: &PetriNet,
    ) -> Result<InheritanceReport, AnalysisError> {
        let (parent_graph, child_graph) = self.build_graphs(parent, child)?;
        Ok(self.compare(parent, &parent_graph, &child_graph))
    }

    /// Runs both checks on graphs that were already built; `parent` supplies
    /// the declared transition ids. Places are taken from the parent graph so
    /// implicit places count as parent places.
    pub fn compare(
        &self,
        parent: &PetriNet,
        parent_graph: &ReachabilityGraph,
        child_graph: &ReachabilityGraph,
    ) -> InheritanceReport {
        let parent_places: IdSet = parent_graph.places().iter().cloned().collect();
        let parent_transitions: IdSet = parent.transitions.iter().map(|t| t.id.clone()).collect();

        let protocol: CheckVerdict = check_protocol(
            parent_graph,
            &parent_places,
            &parent_transitions,
            child_graph,
            self.config.strictness,
        )
        .into();

        let projection = if protocol.holds {
            None
        } else {
            Some(CheckVerdict::from(check_projection(
                parent_graph,
                child_graph,
                &parent_transitions,
                &self.config.silent_labels,
            )))
        };

        let kind = match (&protocol, &projection) {
            (CheckVerdict { holds: true, .. }, _) => InheritanceKind::ProtocolInheritance,
            (_, Some(CheckVerdict { holds: true, .. })) => InheritanceKind::ProjectionInheritance,
            _ => InheritanceKind::NoInheritance,
        };
        log::info!("classification: {}", kind);

        InheritanceReport {
            kind,
            protocol,
            projection,
            parent_graph: parent_graph.stats(),
            child_graph: child_graph.stats(),
        }
    }

    pub fn classify(
        &self,
        parent: &PetriNet,
        child: &PetriNet,
    ) -> Result<InheritanceKind, AnalysisError> {
        self.analyze(parent, child).map(|report| report.kind)
    }
}

/// Classifies `child` against `parent` with the default configuration.
pub fn classify(parent: &PetriNet, child: &PetriNet) -> Result<InheritanceKind, AnalysisError> {
    InheritanceAnalyzer::default().classify(parent, child)
}
