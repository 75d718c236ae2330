/// Elements as they appear in the .osm file, before any cleaning.

pub type OsmId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Node,
    Way,
}

impl ElementKind {
    pub fn tag_name(&self) -> &'static str {
        match self {
            ElementKind::Node => "node",
            ElementKind::Way => "way",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    pub key: String,
    pub value: String,
}

impl TagEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        TagEntry {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawElement {
    pub kind: ElementKind,
    pub id: OsmId,
    /// Top-level attributes in document order, `id` included.
    pub attributes: Vec<(String, String)>,
    pub tags: Vec<TagEntry>,
    /// `nd` references of a way in document order. Always empty for nodes.
    pub node_refs: Vec<OsmId>,
}

impl RawElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}
