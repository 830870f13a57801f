//! Table validation that reports every violation in one pass.

use crate::table::error::TableViolation;
use crate::table::{PopupId, SequenceNode};
use std::collections::{BTreeSet, HashSet};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<TableViolation>>;

fn require(ok: bool, violation: impl FnOnce() -> TableViolation) -> Check {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(violation())
    }
}

/// Validate nodes against the declared popups, accumulating ALL violations.
pub(crate) fn validate(nodes: &[SequenceNode], popups: &BTreeSet<PopupId>) -> Check {
    let mut checks: Vec<Check> = Vec::new();

    for popup in popups {
        checks.push(require(!popup.is_blank(), || TableViolation::EmptyPopupId));
    }

    let mut seen = HashSet::new();
    for node in nodes {
        checks.push(require(!node.id.is_blank(), || TableViolation::EmptyNodeId));

        checks.push(require(seen.insert(node.id.clone()), || {
            TableViolation::DuplicateNode {
                id: node.id.clone(),
            }
        }));

        if let Some(media) = &node.media {
            checks.push(require(!media.is_blank(), || TableViolation::EmptyMediaRef {
                node: node.id.clone(),
            }));
        }

        if let Some(popup) = &node.on_complete_popup {
            checks.push(require(popups.contains(popup), || {
                TableViolation::UnknownPopup {
                    node: node.id.clone(),
                    popup: popup.clone(),
                }
            }));
        }
    }

    Validation::all_vec(checks).map(|_| ())
}
