//! Streaming reader over the top-level elements of an .osm file.
//!
//! Only `node` and `way` elements are materialized, one at a time; relation
//! subtrees are skipped without being kept. Any XML error ends the stream.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use xz::bufread::XzDecoder;

use crate::data::{ElementKind, OsmId, RawElement, TagEntry};
use crate::errors::{Error, Result};

pub struct ElementReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    child_buf: Vec<u8>,
    /// Names of the enclosing elements (`osm`, ...) still waiting for their end tag.
    open_tags: Vec<Vec<u8>>,
    finished: bool,
}

impl ElementReader<Box<dyn BufRead>> {
    /// Opens an .osm file, decompressing it on the fly when it ends in `.xz`.
    pub fn open(path: &Path) -> Result<Self> {
        let file = fs::File::open(path)
            .map_err(|err| format!("Could not open OSM file {}: {err}", path.display()))?;
        let file_reader = BufReader::new(file);
        let input: Box<dyn BufRead> = if path.extension().is_some_and(|ext| ext == "xz") {
            Box::new(BufReader::new(XzDecoder::new(file_reader)))
        } else {
            Box::new(file_reader)
        };
        Ok(ElementReader::new(input))
    }
}

impl<'a> ElementReader<&'a [u8]> {
    pub fn from_xml(xml: &'a str) -> Self {
        ElementReader::new(xml.as_bytes())
    }
}

impl<R: BufRead> ElementReader<R> {
    pub fn new(input: R) -> Self {
        let mut reader = Reader::from_reader(input);
        reader.trim_text(true);
        ElementReader {
            reader,
            buf: Vec::new(),
            child_buf: Vec::new(),
            open_tags: Vec::new(),
            finished: false,
        }
    }

    fn next_element(&mut self) -> Result<Option<RawElement>> {
        loop {
            // if we don't keep a borrow elsewhere, we can clear the buffer to keep memory usage low
            self.buf.clear();
            let (kind, id, attributes, has_children) = match self.reader.read_event_into(&mut self.buf)? {
                Event::Eof => {
                    return match self.open_tags.last() {
                        Some(name) => Err(format!(
                            "Unexpected end of document: <{}> not closed",
                            String::from_utf8_lossy(name)
                        ).into()),
                        None => Ok(None),
                    };
                }
                Event::Start(e) => match e.name().as_ref() {
                    b"node" => {
                        let (id, attributes) = parse_attributes(&e, ElementKind::Node)?;
                        (ElementKind::Node, id, attributes, true)
                    }
                    b"way" => {
                        let (id, attributes) = parse_attributes(&e, ElementKind::Way)?;
                        (ElementKind::Way, id, attributes, true)
                    }
                    b"relation" => {
                        let end = e.to_end().into_owned();
                        self.child_buf.clear();
                        self.reader.read_to_end_into(end.name(), &mut self.child_buf)?;
                        continue;
                    }
                    name => {
                        self.open_tags.push(name.to_vec());
                        continue;
                    }
                },
                Event::End(_) => {
                    self.open_tags.pop();
                    continue;
                }
                Event::Empty(e) => match e.name().as_ref() {
                    b"node" => {
                        let (id, attributes) = parse_attributes(&e, ElementKind::Node)?;
                        (ElementKind::Node, id, attributes, false)
                    }
                    b"way" => {
                        let (id, attributes) = parse_attributes(&e, ElementKind::Way)?;
                        (ElementKind::Way, id, attributes, false)
                    }
                    _ => continue,
                },
                _ => continue,
            };

            let mut element = RawElement {
                kind,
                id,
                attributes,
                tags: Vec::new(),
                node_refs: Vec::new(),
            };
            if has_children {
                self.read_children(&mut element)?;
            }
            return Ok(Some(element));
        }
    }

    /// Collects `tag` and `nd` children up to the element's end tag.
    fn read_children(&mut self, element: &mut RawElement) -> Result<()> {
        let element_name = element.kind.tag_name().as_bytes();
        loop {
            self.child_buf.clear();
            match self.reader.read_event_into(&mut self.child_buf)? {
                Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                    b"tag" => element.tags.push(parse_tag(&e, element.id)?),
                    b"nd" if element.kind == ElementKind::Way => element.node_refs.push(parse_node_ref(&e, element.id)?),
                    _ => (),
                },
                Event::End(e) if e.name().as_ref() == element_name => return Ok(()),
                Event::Eof => {
                    return Err(format!(
                        "Unexpected end of document inside <{} id=\"{}\">",
                        element.kind.tag_name(),
                        element.id
                    ).into());
                }
                _ => (),
            }
        }
    }
}

impl<R: BufRead> Iterator for ElementReader<R> {
    type Item = Result<RawElement>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_element() {
            Ok(Some(element)) => Some(Ok(element)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

fn attribute_value(attribute: &quick_xml::events::attributes::Attribute<'_>) -> Result<String> {
    Ok(attribute.unescape_value()?.into_owned())
}

fn parse_attributes(el: &BytesStart<'_>, kind: ElementKind) -> Result<(OsmId, Vec<(String, String)>)> {
    let mut attributes = Vec::new();
    for attribute_res in el.attributes() {
        let attribute = attribute_res?;
        let key = std::str::from_utf8(attribute.key.as_ref())?.to_string();
        attributes.push((key, attribute_value(&attribute)?));
    }

    let id = attributes.iter()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.as_str())
        .ok_or_else(|| Error::from(format!("<{}> element without an id attribute", kind.tag_name())))?;
    let id = id.parse()
        .map_err(|err| format!("<{}> element has a malformed id {id:?}: {err}", kind.tag_name()))?;
    Ok((id, attributes))
}

fn parse_tag(el: &BytesStart<'_>, owner: OsmId) -> Result<TagEntry> {
    let mut key = None;
    let mut value = None;
    for attribute_res in el.attributes() {
        let attribute = attribute_res?;
        match attribute.key.as_ref() {
            b"k" => key = Some(attribute_value(&attribute)?),
            b"v" => value = Some(attribute_value(&attribute)?),
            _ => (),
        }
    }
    match (key, value) {
        (Some(key), Some(value)) => Ok(TagEntry { key, value }),
        _ => Err(format!("<tag> of element {owner} needs both k and v attributes").into()),
    }
}

fn parse_node_ref(el: &BytesStart<'_>, owner: OsmId) -> Result<OsmId> {
    for attribute_res in el.attributes() {
        let attribute = attribute_res?;
        if attribute.key.as_ref() == b"ref" {
            let value = attribute_value(&attribute)?;
            return value.parse()
                .map_err(|err| format!("<nd> of way {owner} has a malformed ref {value:?}: {err}").into());
        }
    }
    Err(format!("<nd> of way {owner} has no ref attribute").into())
}
