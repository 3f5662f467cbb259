//! Petri 网行为继承检查。
//!
//! 给定父网与子网，构造两者的可达图，并判定子网相对父网属于
//! 协议继承、投影继承或不存在继承关系。
//!
//! ```rust
//! use pn_inherit::{InheritanceKind, PetriNet, classify};
//!
//! let parent = PetriNet::new()
//!     .with_place("P1", 1)
//!     .with_transition("T1")
//!     .with_arc("P1", "T1", 1)
//!     .with_arc("T1", "P1", 1);
//! let child = parent.clone().with_transition("T2");
//! assert_eq!(classify(&parent, &child), Ok(InheritanceKind::ProtocolInheritance));
//! ```

pub mod analysis;
pub mod config;
pub mod graph;
pub mod net;
pub mod options;
pub mod report;

pub use analysis::{AnalysisError, InheritanceAnalyzer, InheritanceKind, NetRole, classify};
pub use config::AnalyzerConfig;
pub use graph::{ReachabilityGraph, StateSpaceOverflow};
pub use net::{PetriNet, Place, Transition};
pub use report::InheritanceReport;
