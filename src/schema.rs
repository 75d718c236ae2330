//! Schema gate in front of the record sink.
//!
//! Every record of a shaped element is checked field by field against a
//! declared [`Schema`]. Relations between the records (tag ids, way-node
//! positions) are checked too, since the CSV tables carry no constraints.

use std::fmt;

use crate::data::records::{NODE_FIELDS, NODE_TAGS_FIELDS, WAY_FIELDS, WAY_NODES_FIELDS, WAY_TAGS_FIELDS};
use crate::data::{NodeRecord, OsmId, ShapedElement, TagRecord, WayNodeRecord, WayRecord};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Integer,
    Float {
        min: f64,
        max: f64,
    },
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        FieldSpec { name, kind, required: true }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    pub record: &'static str,
    pub fields: Vec<FieldSpec>,
}

/// Field values as the validator sees them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Missing,
    Integer(i64),
    Text(&'a str),
}

impl<'a> From<&'a Option<String>> for FieldValue<'a> {
    fn from(value: &'a Option<String>) -> Self {
        match value {
            Some(text) => FieldValue::Text(text),
            None => FieldValue::Missing,
        }
    }
}

/// Records that can be checked against a [`RecordSchema`].
pub trait SchemaFields {
    fn field(&self, name: &str) -> FieldValue<'_>;
}

impl SchemaFields for NodeRecord {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "id" => FieldValue::Integer(self.id),
            "lat" => (&self.lat).into(),
            "lon" => (&self.lon).into(),
            "user" => (&self.user).into(),
            "uid" => (&self.uid).into(),
            "version" => (&self.version).into(),
            "changeset" => (&self.changeset).into(),
            "timestamp" => (&self.timestamp).into(),
            _ => FieldValue::Missing,
        }
    }
}

impl SchemaFields for WayRecord {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "id" => FieldValue::Integer(self.id),
            "user" => (&self.user).into(),
            "uid" => (&self.uid).into(),
            "version" => (&self.version).into(),
            "changeset" => (&self.changeset).into(),
            "timestamp" => (&self.timestamp).into(),
            _ => FieldValue::Missing,
        }
    }
}

impl SchemaFields for TagRecord {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "id" => FieldValue::Integer(self.id),
            "key" => FieldValue::Text(&self.key),
            "value" => FieldValue::Text(&self.value),
            "type" => FieldValue::Text(&self.tag_type),
            _ => FieldValue::Missing,
        }
    }
}

impl SchemaFields for WayNodeRecord {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "id" => FieldValue::Integer(self.id),
            "node_id" => FieldValue::Integer(self.node_id),
            "position" => i64::try_from(self.position).map_or(FieldValue::Missing, FieldValue::Integer),
            _ => FieldValue::Missing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub element_id: OsmId,
    pub record: &'static str,
    pub field: String,
    pub detail: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Element {} has an invalid {} record: field '{}' {}",
            self.element_id, self.record, self.field, self.detail
        )
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub node: RecordSchema,
    pub node_tags: RecordSchema,
    pub way: RecordSchema,
    pub way_tags: RecordSchema,
    pub way_nodes: RecordSchema,
}

impl Default for Schema {
    /// The table layout the bulk loader expects.
    fn default() -> Self {
        use FieldKind::{Float, Integer, Text};

        let tag_fields = |record: &'static str| RecordSchema {
            record,
            fields: vec![
                FieldSpec::required("id", Integer),
                FieldSpec::required("key", Text),
                FieldSpec::required("value", Text),
                FieldSpec::required("type", Text),
            ],
        };

        Schema {
            node: RecordSchema {
                record: "node",
                fields: vec![
                    FieldSpec::required("id", Integer),
                    FieldSpec::required("lat", Float { min: -90.0, max: 90.0 }),
                    FieldSpec::required("lon", Float { min: -180.0, max: 180.0 }),
                    FieldSpec::required("user", Text),
                    FieldSpec::required("uid", Integer),
                    FieldSpec::required("version", Text),
                    FieldSpec::required("changeset", Integer),
                    FieldSpec::required("timestamp", Text),
                ],
            },
            node_tags: tag_fields("node_tags"),
            way: RecordSchema {
                record: "way",
                fields: vec![
                    FieldSpec::required("id", Integer),
                    FieldSpec::required("user", Text),
                    FieldSpec::required("uid", Integer),
                    FieldSpec::required("version", Text),
                    FieldSpec::required("changeset", Integer),
                    FieldSpec::required("timestamp", Text),
                ],
            },
            way_tags: tag_fields("way_tags"),
            way_nodes: RecordSchema {
                record: "way_nodes",
                fields: vec![
                    FieldSpec::required("id", Integer),
                    FieldSpec::required("node_id", Integer),
                    FieldSpec::required("position", Integer),
                ],
            },
        }
    }
}

impl Schema {
    /// Column names of each record schema, in order. Used to check that a
    /// schema describes the same tables the sink writes.
    pub fn columns(record: &RecordSchema) -> Vec<&'static str> {
        record.fields.iter().map(|field| field.name).collect()
    }

    pub fn matches_output_layout(&self) -> bool {
        Self::columns(&self.node) == NODE_FIELDS
            && Self::columns(&self.node_tags) == NODE_TAGS_FIELDS
            && Self::columns(&self.way) == WAY_FIELDS
            && Self::columns(&self.way_tags) == WAY_TAGS_FIELDS
            && Self::columns(&self.way_nodes) == WAY_NODES_FIELDS
    }

    pub fn validate(&self, element: &ShapedElement) -> Result<(), ValidationError> {
        let element_id = element.id();
        match element {
            ShapedElement::Node { node, tags } => {
                check_record(&self.node, element_id, node)?;
                check_tags(&self.node_tags, element_id, tags)
            }
            ShapedElement::Way { way, tags, nodes } => {
                check_record(&self.way, element_id, way)?;
                check_tags(&self.way_tags, element_id, tags)?;
                check_way_nodes(&self.way_nodes, element_id, nodes)
            }
        }
    }
}

fn check_tags(schema: &RecordSchema, element_id: OsmId, tags: &[TagRecord]) -> Result<(), ValidationError> {
    for tag in tags {
        check_record(schema, element_id, tag)?;
        if tag.id != element_id {
            return Err(invalid(schema, element_id, "id", format!("is {} but the owning element is {element_id}", tag.id)));
        }
    }
    Ok(())
}

fn check_way_nodes(schema: &RecordSchema, element_id: OsmId, nodes: &[WayNodeRecord]) -> Result<(), ValidationError> {
    for (expected, way_node) in (0u64..).zip(nodes) {
        check_record(schema, element_id, way_node)?;
        if way_node.id != element_id {
            return Err(invalid(schema, element_id, "id", format!("is {} but the owning way is {element_id}", way_node.id)));
        }
        if way_node.position != expected {
            return Err(invalid(schema, element_id, "position", format!("is {} where {expected} was expected", way_node.position)));
        }
    }
    Ok(())
}

fn check_record(schema: &RecordSchema, element_id: OsmId, record: &impl SchemaFields) -> Result<(), ValidationError> {
    for spec in &schema.fields {
        check_field(spec, record.field(spec.name))
            .map_err(|detail| invalid(schema, element_id, spec.name, detail))?;
    }
    Ok(())
}

fn check_field(spec: &FieldSpec, value: FieldValue<'_>) -> Result<(), String> {
    let text = match value {
        FieldValue::Missing if spec.required => return Err("is required".to_string()),
        FieldValue::Missing => return Ok(()),
        FieldValue::Integer(_) => {
            return match spec.kind {
                FieldKind::Integer | FieldKind::Text => Ok(()),
                FieldKind::Float { .. } => Err("must be of float type".to_string()),
            };
        }
        FieldValue::Text(text) => text,
    };

    match spec.kind {
        FieldKind::Text => Ok(()),
        FieldKind::Integer => text.trim().parse::<i64>()
            .map(|_| ())
            .map_err(|_| format!("must be of integer type, got {text:?}")),
        FieldKind::Float { min, max } => {
            let number: f64 = text.trim().parse()
                .map_err(|_| format!("must be of float type, got {text:?}"))?;
            if !number.is_finite() || number < min || number > max {
                return Err(format!("must be within [{min}, {max}], got {text}"));
            }
            Ok(())
        }
    }
}

fn invalid(schema: &RecordSchema, element_id: OsmId, field: &str, detail: String) -> ValidationError {
    ValidationError {
        element_id,
        record: schema.record,
        field: field.to_string(),
        detail,
    }
}
