//! Builder for constructing sequence tables.

use crate::table::error::BuildError;
use crate::table::validate::validate;
use crate::table::{PopupId, SequenceNode, SequenceTable};
use std::collections::BTreeSet;

/// Builder for sequence tables with a fluent API.
///
/// # Example
///
/// ```
/// use reelpath::table::{SequenceNode, SequenceTableBuilder};
///
/// let table = SequenceTableBuilder::new()
///     .popup("popup1")
///     .add_node(
///         SequenceNode::new("walk1")
///             .with_media("assets/videos/walk1.mp4")
///             .with_popup("popup1"),
///     )
///     .build()
///     .unwrap();
///
/// assert!(table.contains("walk1"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct SequenceTableBuilder {
    popups: BTreeSet<PopupId>,
    nodes: Vec<SequenceNode>,
}

impl SequenceTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a popup that nodes may end in.
    pub fn popup(mut self, popup: impl Into<PopupId>) -> Self {
        self.popups.insert(popup.into());
        self
    }

    /// Declare several popups at once.
    pub fn popups<I, P>(mut self, popups: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PopupId>,
    {
        self.popups.extend(popups.into_iter().map(Into::into));
        self
    }

    pub fn add_node(mut self, node: SequenceNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn nodes(mut self, nodes: impl IntoIterator<Item = SequenceNode>) -> Self {
        self.nodes.extend(nodes);
        self
    }

    /// Build the table.
    /// Returns every violation found, not just the first.
    pub fn build(self) -> Result<SequenceTable, BuildError> {
        if self.nodes.is_empty() {
            return Err(BuildError::NoNodes);
        }

        validate(&self.nodes, &self.popups)
            .into_result()
            .map_err(BuildError::Violations)?;

        Ok(SequenceTable::from_parts(self.nodes, self.popups))
    }
}
