//! # Closure Audit
//!
//! Inspects a compiled document and reports every way its `definitions`
//! map fails to be the exact closure of the references it contains.
//!
//! Three findings are possible:
//!
//! - **Dangling**: a `#/definitions/...` pointer whose key is missing.
//! - **Unused**: a `definitions` entry no reference reaches from the
//!   document root.
//! - **Foreign**: a `$ref` that does not address the local `definitions`
//!   map at all.
//!
//! Reachability is computed from the root with the `definitions` map
//! removed, then followed through each reached entry, so an entry that is
//! only referenced by another unused entry is itself unused.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use serde_json::{Map, Value};
use tydef_core::{decode_definitions_pointer, walk};

/// One way a compiled document fails the closure invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClosureFinding {
    /// A pointer whose `definitions` key does not exist.
    Dangling {
        /// The `$ref` value.
        reference: String,
    },
    /// A `definitions` key that nothing reaches.
    Unused {
        /// The unreached key.
        key: String,
    },
    /// A `$ref` outside the local `definitions` map.
    Foreign {
        /// The `$ref` value.
        reference: String,
    },
}

impl fmt::Display for ClosureFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dangling { reference } => write!(f, "dangling reference '{reference}'"),
            Self::Unused { key } => write!(f, "unused definition '{key}'"),
            Self::Foreign { reference } => write!(f, "foreign reference '{reference}'"),
        }
    }
}

/// Audit a compiled document.
///
/// Findings are ordered: dangling and foreign references in traversal
/// order, then unused keys alphabetically. An empty result means the
/// document is self-contained and minimal.
pub fn audit_closure(document: &Value) -> Vec<ClosureFinding> {
    let empty = Map::new();
    let definitions = document
        .get("definitions")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let mut findings = Vec::new();
    let mut reached: BTreeSet<String> = BTreeSet::new();
    let mut queue: VecDeque<String> = VecDeque::new();

    let mut root = document.as_object().cloned().unwrap_or_default();
    root.remove("definitions");
    classify(
        &walk::collect_refs(&Value::Object(root)),
        definitions,
        &mut findings,
        &mut reached,
        &mut queue,
    );

    while let Some(key) = queue.pop_front() {
        if let Some(fragment) = definitions.get(&key) {
            classify(
                &walk::collect_refs(fragment),
                definitions,
                &mut findings,
                &mut reached,
                &mut queue,
            );
        }
    }

    findings.extend(
        definitions
            .keys()
            .filter(|key| !reached.contains(*key))
            .map(|key| ClosureFinding::Unused { key: key.clone() }),
    );
    findings
}

fn classify(
    references: &[String],
    definitions: &Map<String, Value>,
    findings: &mut Vec<ClosureFinding>,
    reached: &mut BTreeSet<String>,
    queue: &mut VecDeque<String>,
) {
    for reference in references {
        match decode_definitions_pointer(reference) {
            Some(key) if definitions.contains_key(&key) => {
                if reached.insert(key.clone()) {
                    queue.push_back(key);
                }
            }
            Some(_) => {
                let finding = ClosureFinding::Dangling {
                    reference: reference.clone(),
                };
                if !findings.contains(&finding) {
                    findings.push(finding);
                }
            }
            None => {
                let finding = ClosureFinding::Foreign {
                    reference: reference.clone(),
                };
                if !findings.contains(&finding) {
                    findings.push(finding);
                }
            }
        }
    }
}
