//! Schema validation for raw model output.
//!
//! Works on the untyped `serde_json::Value` so that every missing or malformed
//! field is reported as its own issue instead of stopping at the first serde
//! error.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::schemas::{Axis, COUNCIL_ROSTER, COUNCIL_SIZE, find_member};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    Missing,
    WrongType { expected: &'static str },
    NotInteger,
    OutOfRange { value: i64 },
    CouncilCount { found: usize },
    UnknownMember { name: String },
    OutOfOrder { expected: String, found: String },
}

/// One problem found at a JSON path such as `axesComments.csi.improvementComment`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub path: String,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::Missing => write!(f, "{}: missing", self.path),
            IssueKind::WrongType { expected } => {
                write!(f, "{}: expected {}", self.path, expected)
            }
            IssueKind::NotInteger => write!(f, "{}: score is not an integer", self.path),
            IssueKind::OutOfRange { value } => {
                write!(f, "{}: score {} outside 0..=100", self.path, value)
            }
            IssueKind::CouncilCount { found } => write!(
                f,
                "{}: expected {} council comments, found {}",
                self.path, COUNCIL_SIZE, found
            ),
            IssueKind::UnknownMember { name } => {
                write!(f, "{}: '{}' is not a council member", self.path, name)
            }
            IssueKind::OutOfOrder { expected, found } => {
                write!(f, "{}: expected '{}', found '{}'", self.path, expected, found)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_council_count_issue(&self) -> bool {
        self.issues
            .iter()
            .any(|i| matches!(i.kind, IssueKind::CouncilCount { .. }))
    }

    fn push(&mut self, path: impl Into<String>, kind: IssueKind) {
        self.issues.push(ValidationIssue {
            path: path.into(),
            kind,
        });
    }
}

/// Check a parsed model response against the report schema.
pub fn validate_report(value: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();
    let Some(root) = value.as_object() else {
        report.push("$", IssueKind::WrongType { expected: "object" });
        return report;
    };

    check_score(&mut report, root, "overallScore", "overallScore");

    if let Some(axes) = object_field(&mut report, root, "axes", "axes") {
        for axis in Axis::ALL {
            check_score(&mut report, axes, axis.key(), &format!("axes.{}", axis.key()));
        }
    }

    if let Some(comments) = object_field(&mut report, root, "axesComments", "axesComments") {
        for axis in Axis::ALL {
            let base = format!("axesComments.{}", axis.key());
            if let Some(pair) = object_field(&mut report, comments, axis.key(), &base) {
                for key in ["evaluationComment", "improvementComment"] {
                    check_string(&mut report, pair, key, &format!("{base}.{key}"));
                }
            }
        }
    }

    check_council(&mut report, root);

    if let Some(insight) =
        object_field(&mut report, root, "concludingInsight", "concludingInsight")
    {
        for key in ["insightName", "keywords", "comment", "question"] {
            check_string(
                &mut report,
                insight,
                key,
                &format!("concludingInsight.{key}"),
            );
        }
    }

    match root.get("homeSenninComment") {
        None | Some(Value::Null) | Some(Value::String(_)) => {}
        Some(_) => report.push(
            "homeSenninComment",
            IssueKind::WrongType { expected: "string" },
        ),
    }

    report
}

fn check_council(report: &mut ValidationReport, root: &Map<String, Value>) {
    let entries = match root.get("councilComments") {
        None | Some(Value::Null) => {
            report.push("councilComments", IssueKind::Missing);
            return;
        }
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            report.push(
                "councilComments",
                IssueKind::WrongType { expected: "array" },
            );
            return;
        }
    };

    if entries.len() != COUNCIL_SIZE {
        report.push(
            "councilComments",
            IssueKind::CouncilCount {
                found: entries.len(),
            },
        );
    }

    for (idx, entry) in entries.iter().enumerate() {
        let base = format!("councilComments[{idx}]");
        let Some(obj) = entry.as_object() else {
            report.push(base, IssueKind::WrongType { expected: "object" });
            continue;
        };
        if let Some(name) = check_string(report, obj, "name", &format!("{base}.name")) {
            if find_member(name).is_none() {
                report.push(
                    format!("{base}.name"),
                    IssueKind::UnknownMember {
                        name: name.to_string(),
                    },
                );
            } else if let Some(expected) = COUNCIL_ROSTER.get(idx)
                && expected.name != name
            {
                report.push(
                    format!("{base}.name"),
                    IssueKind::OutOfOrder {
                        expected: expected.name.to_string(),
                        found: name.to_string(),
                    },
                );
            }
        }
        check_string(report, obj, "comment", &format!("{base}.comment"));
    }
}

fn object_field<'a>(
    report: &mut ValidationReport,
    parent: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Option<&'a Map<String, Value>> {
    match parent.get(key) {
        None | Some(Value::Null) => {
            report.push(path, IssueKind::Missing);
            None
        }
        Some(Value::Object(map)) => Some(map),
        Some(_) => {
            report.push(path, IssueKind::WrongType { expected: "object" });
            None
        }
    }
}

fn check_string<'a>(
    report: &mut ValidationReport,
    parent: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Option<&'a str> {
    match parent.get(key) {
        None | Some(Value::Null) => {
            report.push(path, IssueKind::Missing);
            None
        }
        Some(Value::String(s)) => Some(s.as_str()),
        Some(_) => {
            report.push(path, IssueKind::WrongType { expected: "string" });
            None
        }
    }
}

fn check_score(report: &mut ValidationReport, parent: &Map<String, Value>, key: &str, path: &str) {
    match parent.get(key) {
        None | Some(Value::Null) => report.push(path, IssueKind::Missing),
        Some(Value::Number(n)) => {
            if let Some(u) = n.as_u64() {
                if u > 100 {
                    report.push(
                        path,
                        IssueKind::OutOfRange {
                            value: i64::try_from(u).unwrap_or(i64::MAX),
                        },
                    );
                }
            } else if let Some(i) = n.as_i64() {
                report.push(path, IssueKind::OutOfRange { value: i });
            } else {
                report.push(path, IssueKind::NotInteger);
            }
        }
        Some(_) => report.push(path, IssueKind::WrongType { expected: "integer" }),
    }
}
