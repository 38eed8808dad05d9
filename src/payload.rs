//! Graph payload handed to the engine by the host application.
//!
//! Field names follow the host's JSON (camelCase). Every field carries a
//! serde default so partially filled payloads still parse; entries that are
//! unusable (blank identity, unknown link endpoints) are rejected later by the
//! reconciler, one entry at a time. A `null` identity or label reads as blank
//! and numeric identities read as their decimal text, so one bad entry never
//! fails the whole payload.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawIdentity {
    Text(String),
    Number(serde_json::Number),
}

fn identity<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawIdentity>::deserialize(deserializer)? {
        Some(RawIdentity::Text(text)) => text,
        Some(RawIdentity::Number(number)) => number.to_string(),
        None => String::new(),
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Receipt status counts for one connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusMix {
    pub verified: u32,
    pub pending: u32,
    pub rejected: u32,
    pub unclear: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionStats {
    pub sent: u32,
    pub received: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphNode {
    #[serde(deserialize_with = "identity")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub label: String,
    pub strength: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub status_mix: StatusMix,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction_stats: Option<InteractionStats>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_me: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_interaction: Option<String>,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub top_tags: Vec<String>,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            ..Self::default()
        }
    }

    /// A node flagged as the current user; the engine pins it to the viewport center.
    pub fn me(id: impl Into<String>) -> Self {
        Self {
            is_me: true,
            ..Self::new(id, "You")
        }
    }

    pub fn has_identity(&self) -> bool {
        !self.id.trim().is_empty()
    }

    pub fn sent(&self) -> u32 {
        self.interaction_stats.map_or(0, |stats| stats.sent)
    }

    pub fn received(&self) -> u32 {
        self.interaction_stats.map_or(0, |stats| stats.received)
    }
}

/// A connection between two nodes, referenced by plain identity.
///
/// `sent_count` is help sent from `source` to `target`, `received_count` is
/// help received by `source` from `target`. The engine draws links undirected
/// and never merges duplicates; the host collapses interactions per pair.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphLink {
    #[serde(deserialize_with = "identity")]
    pub source: String,
    #[serde(deserialize_with = "identity")]
    pub target: String,
    pub verified_count: u32,
    pub pending_count: u32,
    pub unclear_count: u32,
    pub sent_count: u32,
    pub received_count: u32,
    pub strength: f32,
}

impl GraphLink {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            strength: 1.0,
            ..Self::default()
        }
    }

    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }

    pub fn other_end(&self, id: &str) -> Option<&str> {
        if self.source == id {
            Some(self.target.as_str())
        } else if self.target == id {
            Some(self.source.as_str())
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphPayload {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

impl GraphPayload {
    pub fn new(nodes: Vec<GraphNode>, links: Vec<GraphLink>) -> Self {
        Self { nodes, links }
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Which interaction count the stat cards show. Opaque to the physics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Filter {
    #[default]
    All,
    Gave,
    Received,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Gave, Filter::Received];

    pub fn shows_sent(self) -> bool {
        matches!(self, Filter::All | Filter::Gave)
    }

    pub fn shows_received(self) -> bool {
        matches!(self, Filter::All | Filter::Received)
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Gave => "Gave",
            Filter::Received => "Received",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_json_with_missing_optionals() {
        let payload = GraphPayload::from_json(
            r#"{
                "nodes": [
                    {"id": "me", "label": "You", "isMe": true, "strength": 10,
                     "statusMix": {"verified": 0, "pending": 0, "unclear": 0},
                     "interactionStats": {"sent": 3, "received": 1}},
                    {"id": "u1", "label": "A. Lovelace", "strength": 7,
                     "statusMix": {"verified": 2, "pending": 1},
                     "lastInteraction": "2024-05-01T10:00:00Z", "topTags": ["math"]}
                ],
                "links": [
                    {"source": "me", "target": "u1", "verifiedCount": 2,
                     "pendingCount": 1, "sentCount": 3, "receivedCount": 1, "strength": 1}
                ]
            }"#,
        )
        .expect("payload parses");

        assert_eq!(payload.nodes.len(), 2);
        assert!(payload.nodes[0].is_me);
        assert_eq!(payload.nodes[0].sent(), 3);
        assert_eq!(payload.nodes[1].status_mix.rejected, 0);
        assert_eq!(payload.nodes[1].top_tags, vec!["math".to_owned()]);
        assert_eq!(payload.nodes[1].received(), 0);
        assert_eq!(payload.links[0].pending_count, 1);
        assert_eq!(payload.links[0].unclear_count, 0);
    }

    #[test]
    fn missing_identity_parses_as_blank() {
        let payload = GraphPayload::from_json(r#"{"nodes": [{"label": "ghost"}]}"#)
            .expect("payload parses");
        assert!(!payload.nodes[0].has_identity());
        assert!(payload.links.is_empty());
    }

    #[test]
    fn null_identity_parses_as_blank_without_failing_the_payload() {
        let payload = GraphPayload::from_json(
            r#"{
                "nodes": [
                    {"id": null, "label": null, "isMe": null, "topTags": null},
                    {"id": "u1", "label": "Ada"}
                ],
                "links": [{"source": "u1", "target": null}]
            }"#,
        )
        .expect("payload parses");

        assert!(!payload.nodes[0].has_identity());
        assert_eq!(payload.nodes[0].label, "");
        assert!(!payload.nodes[0].is_me);
        assert!(payload.nodes[0].top_tags.is_empty());
        assert_eq!(payload.nodes[1].id, "u1");
        assert_eq!(payload.links[0].target, "");
    }

    #[test]
    fn numeric_identities_read_as_text() {
        let payload = GraphPayload::from_json(
            r#"{
                "nodes": [{"id": 7}, {"id": "8"}],
                "links": [{"source": 7, "target": 8}]
            }"#,
        )
        .expect("payload parses");

        assert_eq!(payload.nodes[0].id, "7");
        assert_eq!(payload.links[0].source, "7");
        assert_eq!(payload.links[0].target, "8");
    }

    #[test]
    fn identity_of_the_wrong_shape_is_still_an_error() {
        assert!(GraphPayload::from_json(r#"{"nodes": [{"id": {"nested": 1}}]}"#).is_err());
    }

    #[test]
    fn negative_counts_are_rejected_by_the_parser() {
        let result = GraphPayload::from_json(
            r#"{"nodes": [{"id": "a", "statusMix": {"verified": -1}}]}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn filter_uses_host_spelling() {
        let filter: Filter = serde_json::from_str("\"RECEIVED\"").expect("filter parses");
        assert_eq!(filter, Filter::Received);
        assert!(!filter.shows_sent());
        assert!(filter.shows_received());
        assert!(Filter::All.shows_sent() && Filter::All.shows_received());
    }

    #[test]
    fn link_other_end() {
        let link = GraphLink::new("a", "b");
        assert_eq!(link.other_end("a"), Some("b"));
        assert_eq!(link.other_end("b"), Some("a"));
        assert_eq!(link.other_end("c"), None);
        assert!(link.touches("b"));
    }
}
