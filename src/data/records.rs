use serde::Serialize;

use super::osm::OsmId;

/// Column order of every output table. Bulk loaders rely on it, so the
/// struct field order below must match.
pub const NODE_FIELDS: [&str; 8] = ["id", "lat", "lon", "user", "uid", "version", "changeset", "timestamp"];
pub const NODE_TAGS_FIELDS: [&str; 4] = ["id", "key", "value", "type"];
pub const WAY_FIELDS: [&str; 6] = ["id", "user", "uid", "version", "changeset", "timestamp"];
pub const WAY_TAGS_FIELDS: [&str; 4] = ["id", "key", "value", "type"];
pub const WAY_NODES_FIELDS: [&str; 3] = ["id", "node_id", "position"];

pub const REGULAR_TAG_TYPE: &str = "regular";

/// Top-level node attributes, copied verbatim. A missing attribute is `None`
/// and gets rejected by the schema.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub id: OsmId,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub user: Option<String>,
    pub uid: Option<String>,
    pub version: Option<String>,
    pub changeset: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct WayRecord {
    pub id: OsmId,
    pub user: Option<String>,
    pub uid: Option<String>,
    pub version: Option<String>,
    pub changeset: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TagRecord {
    pub id: OsmId,
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub tag_type: String,
}

impl TagRecord {
    pub fn new(id: OsmId, key: impl Into<String>, value: impl Into<String>, tag_type: impl Into<String>) -> Self {
        TagRecord {
            id,
            key: key.into(),
            value: value.into(),
            tag_type: tag_type.into(),
        }
    }

    pub fn is(&self, tag_type: &str, key: &str) -> bool {
        self.tag_type == tag_type && self.key == key
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WayNodeRecord {
    pub id: OsmId,
    pub node_id: OsmId,
    pub position: u64,
}

/// Everything derived from one source element.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapedElement {
    Node {
        node: NodeRecord,
        tags: Vec<TagRecord>,
    },
    Way {
        way: WayRecord,
        tags: Vec<TagRecord>,
        nodes: Vec<WayNodeRecord>,
    },
}

impl ShapedElement {
    pub fn id(&self) -> OsmId {
        match self {
            ShapedElement::Node { node, .. } => node.id,
            ShapedElement::Way { way, .. } => way.id,
        }
    }

    pub fn tags(&self) -> &[TagRecord] {
        match self {
            ShapedElement::Node { tags, .. } | ShapedElement::Way { tags, .. } => tags,
        }
    }
}
