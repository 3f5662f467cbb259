//! 继承关系分析：协议继承、投影继承以及二者的分类。
//!
//! 检查器只读取两张已构造好的可达图，所有状态（工作队列、已访问集合、缓存）
//! 都是单次调用的局部变量，可并发地做互不相关的分析。
use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

pub mod classify;
pub mod correspondence;
pub mod projection;
pub mod protocol;

pub use classify::{AnalysisError, InheritanceAnalyzer, InheritanceKind, NetRole, classify};
pub use correspondence::{Correspondence, Strictness};
pub use projection::{DEFAULT_SILENT_LABEL, Visibility, check_projection, is_projection_inheritance};
pub use protocol::{check_protocol, is_protocol_inheritance};

/// Set of place or transition ids taken from the parent net.
pub type IdSet = BTreeSet<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Parent,
    Child,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Parent => write!(f, "parent"),
            Side::Child => write!(f, "child"),
        }
    }
}

/// 检查失败时的第一个反例，供日志和报告使用。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mismatch {
    /// No child marking is projection-equal to this parent marking.
    MissingMarking { parent_marking: String },
    /// Matching child markings exist but none reproduces this parent firing.
    MissingTransition {
        parent_marking: String,
        transition: String,
    },
    /// A weak move of `side` has no counterpart with the same label.
    UnmatchedMove {
        side: Side,
        transition: String,
        parent_marking: String,
        child_marking: String,
    },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::MissingMarking { parent_marking } => {
                write!(f, "no child marking matches parent marking {}", parent_marking)
            }
            Mismatch::MissingTransition {
                parent_marking,
                transition,
            } => write!(
                f,
                "child cannot fire {} from any marking matching {}",
                transition, parent_marking
            ),
            Mismatch::UnmatchedMove {
                side,
                transition,
                parent_marking,
                child_marking,
            } => write!(
                f,
                "{} move {} is unmatched at pair ({}, {})",
                side, transition, parent_marking, child_marking
            ),
        }
    }
}
