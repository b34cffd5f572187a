#![forbid(unsafe_code)]

//! Per-locale instance coverage over a schema.
//!
//! Walks the schema from the root fields and counts, per locale, how
//! many leaf wordings (string templates, numbers, booleans, arrays)
//! carry an instance value. Object nodes are structure only and
//! contribute their fields instead. Templated field names are counted
//! once under their raw template name.

use tracing::warn;

use crate::graph::NodeMap;
use crate::node::{Field, NodeId, NodeKind};

/// Coverage of one locale.
#[derive(Debug, Clone, PartialEq)]
pub struct LocaleCoverage {
    /// Locale tag.
    pub locale: String,
    /// Leaf wordings that have a value for this locale.
    pub present: usize,
    /// Paths of leaf wordings missing a value for this locale.
    pub missing: Vec<String>,
    /// `present / total * 100`, in `[0, 100]`. An empty schema counts
    /// as fully covered.
    pub coverage_percent: f64,
}

/// Coverage of every requested locale.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageReport {
    /// Total leaf wordings in the schema.
    pub total_wordings: usize,
    /// Per-locale breakdown, in the requested locale order.
    pub locales: Vec<LocaleCoverage>,
}

/// True when the node carries an instance for `locale`; `None` for
/// object nodes (not leaves).
fn has_instance(kind: &NodeKind, locale: &str) -> Option<bool> {
    match kind {
        NodeKind::StringTemplate { instances, .. } => Some(
            instances
                .as_ref()
                .is_some_and(|map| map.contains_key(locale)),
        ),
        NodeKind::Number { instances } => Some(
            instances
                .as_ref()
                .is_some_and(|map| map.contains_key(locale)),
        ),
        NodeKind::Boolean { instances } => Some(
            instances
                .as_ref()
                .is_some_and(|map| map.contains_key(locale)),
        ),
        NodeKind::Array { instances, .. } => Some(
            instances
                .as_ref()
                .is_some_and(|map| map.contains_key(locale)),
        ),
        NodeKind::Object { .. } => None,
    }
}

struct Walk<'a> {
    nodes: &'a NodeMap,
    locales: &'a [String],
    total: usize,
    present: Vec<usize>,
    missing: Vec<Vec<String>>,
}

impl Walk<'_> {
    fn visit_fields(&mut self, label_prefix: &str, fields: &[Field], ancestors: &mut Vec<NodeId>) {
        for field in fields {
            let label = if label_prefix.is_empty() {
                field.name.clone()
            } else {
                format!("{label_prefix}.{}", field.name)
            };
            self.visit(&label, &field.type_id, ancestors);
        }
    }

    fn visit(&mut self, label: &str, id: &NodeId, ancestors: &mut Vec<NodeId>) {
        let Some(node) = self.nodes.get(id) else {
            warn!(
                target: "wording.schema",
                node_id = %id,
                path = %label,
                "coverage walk skipping dangling reference"
            );
            return;
        };
        match &node.kind {
            NodeKind::Object { fields } => {
                // Recursive schemas are legal; visit each object node at
                // most once per ancestor chain.
                if ancestors.contains(id) {
                    return;
                }
                ancestors.push(id.clone());
                self.visit_fields(label, fields, ancestors);
                ancestors.pop();
            }
            kind => {
                self.total += 1;
                for (slot, locale) in self.locales.iter().enumerate() {
                    if has_instance(kind, locale) == Some(true) {
                        self.present[slot] += 1;
                    } else {
                        self.missing[slot].push(label.to_string());
                    }
                }
            }
        }
    }
}

/// Compute coverage of `locales` over the schema rooted at
/// `root_fields`.
#[must_use]
pub fn coverage_report(
    nodes: &NodeMap,
    root_fields: &[Field],
    locales: &[String],
) -> CoverageReport {
    let mut walk = Walk {
        nodes,
        locales,
        total: 0,
        present: vec![0; locales.len()],
        missing: vec![Vec::new(); locales.len()],
    };
    walk.visit_fields("", root_fields, &mut Vec::new());

    let total = walk.total;
    let locales_out = locales
        .iter()
        .enumerate()
        .map(|(slot, locale)| {
            let present = walk.present[slot];
            let coverage_percent = if total == 0 {
                100.0
            } else {
                present as f64 / total as f64 * 100.0
            };
            LocaleCoverage {
                locale: locale.clone(),
                present,
                missing: std::mem::take(&mut walk.missing[slot]),
                coverage_percent,
            }
        })
        .collect();

    CoverageReport {
        total_wordings: total,
        locales: locales_out,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{SchemaNode, TemplateValue};

    fn locales(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|tag| (*tag).to_string()).collect()
    }

    fn template_node(id: &str, instance_locales: &[&str]) -> SchemaNode {
        SchemaNode::new(
            id,
            NodeKind::StringTemplate {
                params: None,
                variant: None,
                instances: if instance_locales.is_empty() {
                    None
                } else {
                    Some(
                        instance_locales
                            .iter()
                            .map(|tag| {
                                ((*tag).to_string(), TemplateValue::Plain("x".to_string()))
                            })
                            .collect(),
                    )
                },
            },
        )
    }

    #[test]
    fn counts_present_and_missing() {
        let mut nodes = NodeMap::new();
        nodes.insert(NodeId::from("t1"), template_node("t1", &["en", "fr"]));
        nodes.insert(NodeId::from("t2"), template_node("t2", &["en"]));
        let root_fields = vec![
            Field {
                name: "title".to_string(),
                type_id: NodeId::from("t1"),
                params: None,
            },
            Field {
                name: "subtitle".to_string(),
                type_id: NodeId::from("t2"),
                params: None,
            },
        ];

        let report = coverage_report(&nodes, &root_fields, &locales(&["en", "fr"]));
        assert_eq!(report.total_wordings, 2);

        let en = &report.locales[0];
        assert_eq!(en.present, 2);
        assert!(en.missing.is_empty());
        assert_eq!(en.coverage_percent, 100.0);

        let fr = &report.locales[1];
        assert_eq!(fr.present, 1);
        assert_eq!(fr.missing, vec!["subtitle".to_string()]);
        assert_eq!(fr.coverage_percent, 50.0);
    }

    #[test]
    fn nested_object_paths_are_dotted() {
        let mut nodes = NodeMap::new();
        nodes.insert(
            NodeId::from("about"),
            SchemaNode::new(
                "about",
                NodeKind::Object {
                    fields: vec![Field {
                        name: "title".to_string(),
                        type_id: NodeId::from("t1"),
                        params: None,
                    }],
                },
            ),
        );
        nodes.insert(NodeId::from("t1"), template_node("t1", &[]));
        let root_fields = vec![Field {
            name: "about".to_string(),
            type_id: NodeId::from("about"),
            params: None,
        }];

        let report = coverage_report(&nodes, &root_fields, &locales(&["en"]));
        assert_eq!(report.total_wordings, 1);
        assert_eq!(report.locales[0].missing, vec!["about.title".to_string()]);
    }

    #[test]
    fn empty_schema_is_fully_covered() {
        let report = coverage_report(&NodeMap::new(), &[], &locales(&["en"]));
        assert_eq!(report.total_wordings, 0);
        assert_eq!(report.locales[0].coverage_percent, 100.0);
    }

    #[test]
    fn dangling_reference_is_skipped() {
        let root_fields = vec![Field {
            name: "ghost".to_string(),
            type_id: NodeId::from("missing"),
            params: None,
        }];
        let report = coverage_report(&NodeMap::new(), &root_fields, &locales(&["en"]));
        assert_eq!(report.total_wordings, 0);
    }

    #[test]
    fn recursive_object_terminates() {
        let mut nodes = NodeMap::new();
        nodes.insert(
            NodeId::from("tree"),
            SchemaNode::new(
                "tree",
                NodeKind::Object {
                    fields: vec![
                        Field {
                            name: "label".to_string(),
                            type_id: NodeId::from("t1"),
                            params: None,
                        },
                        Field {
                            name: "child".to_string(),
                            type_id: NodeId::from("tree"),
                            params: None,
                        },
                    ],
                },
            ),
        );
        nodes.insert(NodeId::from("t1"), template_node("t1", &["en"]));
        let root_fields = vec![Field {
            name: "tree".to_string(),
            type_id: NodeId::from("tree"),
            params: None,
        }];

        let report = coverage_report(&nodes, &root_fields, &locales(&["en"]));
        assert_eq!(report.total_wordings, 1);
        assert_eq!(report.locales[0].present, 1);
    }
}
