//! Presentation configuration.
//!
//! Everything here is static data: the fixed animation and pacing delays, the
//! entry node, the download asset, and the sequence table itself. It can be
//! read from JSON; whatever is left out falls back to the canonical
//! presentation.

use crate::effects::DEFAULT_HISTORY_LIMIT;
use crate::table::{BuildError, NodeId, PopupId, SequenceNode, SequenceTable};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while loading a presentation config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Table(#[from] BuildError),

    #[error("Entry node '{0}' is not in the sequence table")]
    UnknownEntry(NodeId),
}

/// Fixed delays used by the sequencer and the shell around it.
///
/// Serialized as whole milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Between unhiding a popup and marking it active.
    #[serde(with = "millis")]
    pub popup_enter: Duration,
    /// Length of a popup's exit animation.
    #[serde(with = "millis")]
    pub popup_exit: Duration,
    /// Between the end of playback and the overlay.
    #[serde(with = "millis")]
    pub blur_delay: Duration,
    /// Between the overlay and the follow-up popup.
    #[serde(with = "millis")]
    pub popup_reveal: Duration,
    #[serde(with = "millis")]
    pub landing_fade: Duration,
    #[serde(with = "millis")]
    pub effect_audio_delay: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            popup_enter: Duration::from_millis(10),
            popup_exit: Duration::from_millis(800),
            blur_delay: Duration::from_millis(100),
            popup_reveal: Duration::from_millis(300),
            landing_fade: Duration::from_millis(800),
            effect_audio_delay: Duration::from_millis(3500),
        }
    }
}

impl Timing {
    /// Time from the end of playback until the follow-up popup starts entering.
    pub fn reveal_after_end(&self) -> Duration {
        self.blur_delay + self.popup_reveal
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// A static file offered for download.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadAsset {
    pub href: String,
    pub filename: String,
}

impl Default for DownloadAsset {
    fn default() -> Self {
        Self {
            href: "assets/info/info.pdf".to_string(),
            filename: "info.pdf".to_string(),
        }
    }
}

/// Complete description of one presentation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    /// Node requested when the landing gate is passed.
    pub entry: NodeId,
    pub background_volume: f32,
    pub download: DownloadAsset,
    pub timing: Timing,
    /// Phase changes the sequencer keeps for inspection.
    pub history_limit: usize,
    pub popups: Vec<PopupId>,
    pub nodes: Vec<SequenceNode>,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            entry: NodeId::new("walk1"),
            background_volume: 0.6,
            download: DownloadAsset::default(),
            timing: Timing::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            popups: (1..=6).map(|step| PopupId::new(format!("popup{step}"))).collect(),
            nodes: canonical_nodes(),
        }
    }
}

// Forward walks each end in the popup of the same step. Reverse walks lead
// back to the previous popup; reverse1 carries no media and nothing links to it.
fn canonical_nodes() -> Vec<SequenceNode> {
    let forward = (1..=6).map(|step| {
        SequenceNode::new(format!("walk{step}"))
            .with_media(format!("assets/videos/walk{step}.mp4"))
            .with_popup(format!("popup{step}"))
    });
    let reverse = (1..=5).map(|step| {
        let node = SequenceNode::new(format!("reverse{step}")).with_popup(format!("popup{step}"));
        if step == 1 {
            node
        } else {
            node.with_media(format!("assets/videos/reverse{step}.mp4"))
        }
    });
    forward.chain(reverse).collect()
}

impl PresentationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Build and validate the sequence table, checking the entry node exists.
    pub fn table(&self) -> Result<SequenceTable, ConfigError> {
        let table = SequenceTable::builder()
            .popups(self.popups.iter().cloned())
            .nodes(self.nodes.iter().cloned())
            .build()?;

        if !table.contains(self.entry.as_str()) {
            return Err(ConfigError::UnknownEntry(self.entry.clone()));
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds_canonical_table() {
        let table = PresentationConfig::default().table().unwrap();

        assert_eq!(table.len(), 11);
        assert_eq!(table.media_refs().count(), 10);
        assert!(table.get("reverse1").unwrap().is_instant());
        assert_eq!(
            table.get("walk6").unwrap().on_complete_popup,
            Some(PopupId::new("popup6"))
        );
        assert_eq!(
            table
                .get("reverse3")
                .and_then(|node| node.media.as_ref())
                .map(|media| media.as_str()),
            Some("assets/videos/reverse3.mp4")
        );
    }

    #[test]
    fn timing_defaults_match_animation_lengths() {
        let timing = Timing::default();
        assert_eq!(timing.popup_exit, Duration::from_millis(800));
        assert_eq!(timing.reveal_after_end(), Duration::from_millis(400));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = PresentationConfig::from_json_str(
            r#"{ "entry": "walk2", "timing": { "popup_exit": 250 } }"#,
        )
        .unwrap();

        assert_eq!(config.entry, NodeId::new("walk2"));
        assert_eq!(config.timing.popup_exit, Duration::from_millis(250));
        assert_eq!(config.timing.blur_delay, Duration::from_millis(100));
        assert_eq!(config.download, DownloadAsset::default());
        assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);
    }

    #[test]
    fn history_limit_is_read_from_json() {
        let config = PresentationConfig::from_json_str(r#"{ "history_limit": 16 }"#).unwrap();
        assert_eq!(config.history_limit, 16);
    }

    #[test]
    fn timing_serializes_as_millis() {
        let json = serde_json::to_value(Timing::default()).unwrap();
        assert_eq!(json["popup_enter"], 10);
        assert_eq!(json["effect_audio_delay"], 3500);
    }

    #[test]
    fn custom_nodes_are_read_from_json() {
        let config = PresentationConfig::from_json_str(
            r#"{
                "entry": "intro",
                "popups": ["menu"],
                "nodes": [
                    { "id": "intro", "media": "intro.mp4", "popup": "menu" },
                    { "id": "outro", "media": "outro.mp4" }
                ]
            }"#,
        )
        .unwrap();

        let table = config.table().unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.get("outro").unwrap().is_dead_end());
    }

    #[test]
    fn unknown_entry_is_rejected() {
        let config = PresentationConfig {
            entry: NodeId::new("nowhere"),
            ..PresentationConfig::default()
        };
        assert!(matches!(config.table(), Err(ConfigError::UnknownEntry(_))));
    }

    #[test]
    fn invalid_table_surfaces_build_error() {
        let config = PresentationConfig {
            popups: Vec::new(),
            ..PresentationConfig::default()
        };
        assert!(matches!(
            config.table(),
            Err(ConfigError::Table(BuildError::Violations(_)))
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let result = PresentationConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = PresentationConfig::load("/nonexistent/reelpath.json");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
