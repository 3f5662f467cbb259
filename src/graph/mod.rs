//! 由编译网生成的状态空间。
pub mod state_graph;

pub use state_graph::{
    DEFAULT_STATE_LIMIT, ReachabilityGraph, StateGraphConfig, StateGraphStats, StateSpaceOverflow,
};
