//! The sequence table: which media each node plays and which popup follows.
//!
//! The table is configuration, not runtime state. It is validated once when
//! built and never changes afterwards.

pub mod builder;
pub mod error;
pub mod macros;
mod validate;

pub use builder::SequenceTableBuilder;
pub use error::{BuildError, TableViolation};

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// True for an empty or whitespace-only identifier.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

identifier! {
    /// Key of a step in the presentation.
    NodeId
}

identifier! {
    /// Key of a popup surface.
    PopupId
}

identifier! {
    /// Reference to a playable media resource, e.g. `assets/videos/walk1.mp4`.
    MediaRef
}

/// One step of the presentation.
///
/// A node without `media` loads instantly. A node without `on_complete_popup`
/// is a dead end once its media has played.
///
/// # Example
///
/// ```rust
/// use reelpath::table::SequenceNode;
///
/// let node = SequenceNode::new("walk1")
///     .with_media("assets/videos/walk1.mp4")
///     .with_popup("popup1");
///
/// assert!(!node.is_instant());
/// assert!(!node.is_dead_end());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceNode {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaRef>,
    #[serde(default, rename = "popup", skip_serializing_if = "Option::is_none")]
    pub on_complete_popup: Option<PopupId>,
}

impl SequenceNode {
    /// A node with neither media nor follow-up popup.
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            media: None,
            on_complete_popup: None,
        }
    }

    pub fn with_media(mut self, media: impl Into<MediaRef>) -> Self {
        self.media = Some(media.into());
        self
    }

    pub fn with_popup(mut self, popup: impl Into<PopupId>) -> Self {
        self.on_complete_popup = Some(popup.into());
        self
    }

    /// Loading this node involves no playback.
    pub fn is_instant(&self) -> bool {
        self.media.is_none()
    }

    /// Nothing follows this node's playback.
    pub fn is_dead_end(&self) -> bool {
        self.on_complete_popup.is_none()
    }
}

/// Validated, immutable mapping from node identifiers to nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct SequenceTable {
    nodes: Vec<SequenceNode>,
    index: HashMap<NodeId, usize>,
    popups: BTreeSet<PopupId>,
}

impl SequenceTable {
    pub fn builder() -> SequenceTableBuilder {
        SequenceTableBuilder::new()
    }

    pub fn get(&self, id: &str) -> Option<&SequenceNode> {
        self.index.get(id).map(|&slot| &self.nodes[slot])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &SequenceNode> {
        self.nodes.iter()
    }

    /// Popups declared for this table, in identifier order.
    pub fn popups(&self) -> impl Iterator<Item = &PopupId> {
        self.popups.iter()
    }

    pub fn knows_popup(&self, popup: &str) -> bool {
        self.popups.contains(popup)
    }

    /// Every media reference, in declaration order, for warming caches.
    pub fn media_refs(&self) -> impl Iterator<Item = &MediaRef> {
        self.nodes.iter().filter_map(|node| node.media.as_ref())
    }

    pub fn dead_ends(&self) -> impl Iterator<Item = &SequenceNode> {
        self.nodes.iter().filter(|node| node.is_dead_end())
    }

    pub fn instant_nodes(&self) -> impl Iterator<Item = &SequenceNode> {
        self.nodes.iter().filter(|node| node.is_instant())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn from_parts(nodes: Vec<SequenceNode>, popups: BTreeSet<PopupId>) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(slot, node)| (node.id.clone(), slot))
            .collect();
        Self {
            nodes,
            index,
            popups,
        }
    }
}
