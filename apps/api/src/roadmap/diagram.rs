//! Graph Builder: turns a [`Roadmap`] into a flowchart description for the client's
//! diagram renderer.
//!
//! Output syntax (one statement per line, under a `graph TD` header):
//! - `ID[Label]`             node declaration
//! - `SRC --> DST`           unlabeled edge
//! - `SRC -- Label --> DST`  labeled edge
//!
//! Ids and labels are emitted verbatim. The renderer's parser is lenient, so no escaping
//! is applied. Absent fields are rendered as [`MISSING_PLACEHOLDER`] rather than rejected.

use std::fmt;

use tracing::warn;

use crate::roadmap::models::{FieldValue, Roadmap, RoadmapNode, RoadmapStep};

/// Text emitted wherever a node id, label, step id or title is absent.
pub const MISSING_PLACEHOLDER: &str = "undefined";

const HEADER: &str = "graph TD";

/// A single line of the diagram description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Node {
        id: String,
        label: String,
    },
    Edge {
        from: String,
        to: String,
        label: Option<String>,
    },
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Node { id, label } => write!(f, "{id}[{label}]"),
            Statement::Edge {
                from,
                to,
                label: Some(label),
            } => write!(f, "{from} -- {label} --> {to}"),
            Statement::Edge {
                from,
                to,
                label: None,
            } => write!(f, "{from} --> {to}"),
        }
    }
}

/// Ordered statements of a top-down directed graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagramDescription {
    statements: Vec<Statement>,
}

impl DiagramDescription {
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.statements()
            .iter()
            .filter(|s| matches!(s, Statement::Node { .. }))
            .count()
    }

    pub fn edge_count(&self) -> usize {
        self.statements.len() - self.node_count()
    }

    /// Renders the description as text. An empty description renders as the empty string.
    pub fn render(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let mut out = format!("{HEADER}\n");
        for statement in &self.statements {
            out.push_str(&statement.to_string());
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for DiagramDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Builds the diagram description for a roadmap. Pure: the same roadmap always yields
/// the same statements.
pub fn build_diagram(roadmap: &Roadmap) -> DiagramDescription {
    let mut builder = Builder::default();
    match roadmap {
        Roadmap::Empty => {}
        Roadmap::Branching(nodes) => builder.branching(nodes),
        Roadmap::Sequential(steps) => builder.sequential(steps),
    }

    if builder.gaps > 0 {
        warn!(
            "Diagram built with {} missing field(s); rendered as '{}'",
            builder.gaps, MISSING_PLACEHOLDER
        );
    }

    DiagramDescription {
        statements: builder.statements,
    }
}

#[derive(Default)]
struct Builder {
    statements: Vec<Statement>,
    gaps: usize,
}

impl Builder {
    fn text(&mut self, value: Option<&FieldValue>) -> String {
        match value {
            Some(v) => v.to_string(),
            None => {
                self.gaps += 1;
                MISSING_PLACEHOLDER.to_string()
            }
        }
    }

    /// Nodes in input order, each followed by its outgoing edges in `next` order.
    /// Self-edges and duplicate edges pass through untouched.
    fn branching(&mut self, nodes: &[RoadmapNode]) {
        for node in nodes {
            let id = self.text(node.id.as_ref());
            let label = self.text(node.label.as_ref());
            self.statements.push(Statement::Node {
                id: id.clone(),
                label,
            });

            for next in &node.next {
                let to = self.text(next.target.as_ref());
                self.statements.push(Statement::Edge {
                    from: id.clone(),
                    to,
                    label: next.edge_label().map(|l| l.into_owned()),
                });
            }
        }
    }

    /// A simple chain: each step links to the step after it in input order.
    fn sequential(&mut self, steps: &[RoadmapStep]) {
        let mut previous: Option<String> = None;
        for step in steps {
            let id = format!("step{}", self.text(step.step_id.as_ref()));
            let label = self.text(step.title.as_ref());
            self.statements.push(Statement::Node {
                id: id.clone(),
                label,
            });

            if let Some(from) = previous.take() {
                self.statements.push(Statement::Edge {
                    from,
                    to: id.clone(),
                    label: None,
                });
            }
            previous = Some(id);
        }
    }
}
