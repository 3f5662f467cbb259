use std::fmt;
use std::io::Write;

use serde::Serialize;

use crate::analysis::{InheritanceKind, Mismatch};
use crate::graph::StateGraphStats;

/// 单项检查的结论及其第一个反例。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckVerdict {
    pub holds: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mismatch: Option<Mismatch>,
}

impl From<Result<(), Mismatch>> for CheckVerdict {
    fn from(result: Result<(), Mismatch>) -> Self {
        match result {
            Ok(()) => Self {
                holds: true,
                mismatch: None,
            },
            Err(mismatch) => Self {
                holds: false,
                mismatch: Some(mismatch),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InheritanceReport {
    pub kind: InheritanceKind,
    pub protocol: CheckVerdict,
    /// `None` when protocol inheritance already holds and the projection
    /// check was skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<CheckVerdict>,
    pub parent_graph: StateGraphStats,
    pub child_graph: StateGraphStats,
}

impl InheritanceReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn save_to_file(&self, file_path: &str) -> std::io::Result<()> {
        let mut file = std::fs::File::create(file_path)?;
        writeln!(file, "{}", self)
    }
}

impl fmt::Display for InheritanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.kind)?;
        writeln!(
            f,
            "  parent graph: {} markings, {} edges",
            self.parent_graph.state_count, self.parent_graph.edge_count
        )?;
        writeln!(
            f,
            "  child graph:  {} markings, {} edges",
            self.child_graph.state_count, self.child_graph.edge_count
        )?;
        write_verdict(f, "protocol", Some(&self.protocol))?;
        write_verdict(f, "projection", self.projection.as_ref())
    }
}

fn write_verdict(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    verdict: Option<&CheckVerdict>,
) -> fmt::Result {
    match verdict {
        None => writeln!(f, "  {}: not checked", name),
        Some(CheckVerdict {
            holds: true, ..
        }) => writeln!(f, "  {}: holds", name),
        Some(CheckVerdict {
            mismatch: Some(mismatch),
            ..
        }) => writeln!(f, "  {}: fails ({})", name, mismatch),
        Some(_) => writeln!(f, "  {}: fails", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Side;

    fn report() -> InheritanceReport {
        let stats = StateGraphStats {
            state_count: 1,
            edge_count: 1,
            deadlock_count: 0,
        };
        InheritanceReport {
            kind: InheritanceKind::NoInheritance,
            protocol: CheckVerdict::from(Err(Mismatch::MissingMarking {
                parent_marking: "{P1: 1}".into(),
            })),
            projection: Some(CheckVerdict::from(Err(Mismatch::UnmatchedMove {
                side: Side::Parent,
                transition: "T1".into(),
                parent_marking: "{P1: 1}".into(),
                child_marking: "{P1: 1}".into(),
            }))),
            parent_graph: stats,
            child_graph: stats,
        }
    }

    #[test]
    fn text_report_leads_with_classification() {
        let text = report().to_string();
        assert!(text.starts_with("No Inheritance\n"));
        assert!(
            text.contains("protocol: fails (no child marking matches parent marking {P1: 1})")
        );
        assert!(text.contains("projection: fails (parent move T1 is unmatched"));
    }

    #[test]
    fn skipped_projection_is_omitted_from_json() {
        let mut report = report();
        report.kind = InheritanceKind::ProtocolInheritance;
        report.protocol = CheckVerdict::from(Ok(()));
        report.projection = None;
        let json = report.to_json().unwrap();
        assert!(!json.contains("projection"));
        assert!(report.to_string().contains("projection: not checked"));
    }

    #[test]
    fn save_to_file_writes_text() {
        let path = std::env::temp_dir()
            .join(format!("pn-inherit-report-{}.txt", std::process::id()))
            .to_string_lossy()
            .into_owned();
        report().save_to_file(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(written.starts_with("No Inheritance"));
    }
}
