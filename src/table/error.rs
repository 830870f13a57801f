//! Build errors for sequence tables.

use crate::table::{NodeId, PopupId};
use stillwater::NonEmptyVec;
use thiserror::Error;

/// A single problem found while validating a table.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TableViolation {
    #[error("Node identifier is empty")]
    EmptyNodeId,

    #[error("Popup identifier is empty")]
    EmptyPopupId,

    #[error("Node '{id}' is declared more than once")]
    DuplicateNode { id: NodeId },

    #[error("Node '{node}' ends in popup '{popup}', which is not declared")]
    UnknownPopup { node: NodeId, popup: PopupId },

    #[error("Node '{node}' has an empty media reference")]
    EmptyMediaRef { node: NodeId },
}

/// Errors that can occur when building a sequence table.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("No nodes defined. Add at least one node")]
    NoNodes,

    #[error("Sequence table has {} violation(s), first: {}", .0.len(), .0.head())]
    Violations(NonEmptyVec<TableViolation>),
}
