//! CSV output: one table per record type, header row first.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use csv::{Writer, WriterBuilder};
use serde::Serialize;

use crate::data::records::{NODE_FIELDS, NODE_TAGS_FIELDS, WAY_FIELDS, WAY_NODES_FIELDS, WAY_TAGS_FIELDS};
use crate::data::ShapedElement;
use crate::errors::Result;

pub const NODES_FILE: &str = "nodes.csv";
pub const NODE_TAGS_FILE: &str = "nodes_tags.csv";
pub const WAYS_FILE: &str = "ways.csv";
pub const WAY_TAGS_FILE: &str = "ways_tags.csv";
pub const WAY_NODES_FILE: &str = "ways_nodes.csv";

pub const OUTPUT_FILES: [&str; 5] = [NODES_FILE, NODE_TAGS_FILE, WAYS_FILE, WAY_TAGS_FILE, WAY_NODES_FILE];

/// The five destinations of a sink, one per table.
#[derive(Debug)]
pub struct Tables<W> {
    pub nodes: W,
    pub node_tags: W,
    pub ways: W,
    pub way_tags: W,
    pub way_nodes: W,
}

pub fn output_paths(dir: &Path) -> Vec<PathBuf> {
    OUTPUT_FILES.iter().map(|name| dir.join(name)).collect()
}

pub struct CsvSink<W: Write> {
    nodes: Writer<W>,
    node_tags: Writer<W>,
    ways: Writer<W>,
    way_tags: Writer<W>,
    way_nodes: Writer<W>,
}

impl CsvSink<BufWriter<File>> {
    /// Creates (or truncates) the five CSV files in `dir`.
    pub fn create(dir: &Path) -> Result<Self> {
        let open = |name: &str| -> Result<BufWriter<File>> {
            let path = dir.join(name);
            let file = File::create(&path)
                .map_err(|err| format!("Could not create {}: {err}", path.display()))?;
            Ok(BufWriter::new(file))
        };
        CsvSink::new(Tables {
            nodes: open(NODES_FILE)?,
            node_tags: open(NODE_TAGS_FILE)?,
            ways: open(WAYS_FILE)?,
            way_tags: open(WAY_TAGS_FILE)?,
            way_nodes: open(WAY_NODES_FILE)?,
        })
    }
}

impl<W: Write> CsvSink<W> {
    /// Wraps the destinations and writes the header rows.
    pub fn new(tables: Tables<W>) -> Result<Self> {
        Ok(CsvSink {
            nodes: table_writer(tables.nodes, &NODE_FIELDS)?,
            node_tags: table_writer(tables.node_tags, &NODE_TAGS_FIELDS)?,
            ways: table_writer(tables.ways, &WAY_FIELDS)?,
            way_tags: table_writer(tables.way_tags, &WAY_TAGS_FIELDS)?,
            way_nodes: table_writer(tables.way_nodes, &WAY_NODES_FIELDS)?,
        })
    }

    pub fn write(&mut self, element: &ShapedElement) -> Result<()> {
        match element {
            ShapedElement::Node { node, tags } => {
                self.nodes.serialize(node)?;
                serialize_all(&mut self.node_tags, tags)
            }
            ShapedElement::Way { way, tags, nodes } => {
                self.ways.serialize(way)?;
                serialize_all(&mut self.way_tags, tags)?;
                serialize_all(&mut self.way_nodes, nodes)
            }
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        self.nodes.flush()?;
        self.node_tags.flush()?;
        self.ways.flush()?;
        self.way_tags.flush()?;
        self.way_nodes.flush()?;
        Ok(())
    }

    /// Flushes and hands back the destinations.
    pub fn into_inner(self) -> Result<Tables<W>> {
        Ok(Tables {
            nodes: unwrap_writer(self.nodes)?,
            node_tags: unwrap_writer(self.node_tags)?,
            ways: unwrap_writer(self.ways)?,
            way_tags: unwrap_writer(self.way_tags)?,
            way_nodes: unwrap_writer(self.way_nodes)?,
        })
    }
}

fn table_writer<W: Write>(destination: W, header: &[&str]) -> Result<Writer<W>> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(destination);
    writer.write_record(header)?;
    Ok(writer)
}

fn serialize_all<W: Write, T: Serialize>(writer: &mut Writer<W>, records: &[T]) -> Result<()> {
    for record in records {
        writer.serialize(record)?;
    }
    Ok(())
}

fn unwrap_writer<W: Write>(writer: Writer<W>) -> Result<W> {
    writer.into_inner()
        .map_err(|err| format!("Could not flush CSV output: {}", err.error()).into())
}
