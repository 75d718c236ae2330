pub mod osm;
pub mod records;

pub use self::osm::{ElementKind, OsmId, RawElement, TagEntry};
pub use self::records::{NodeRecord, ShapedElement, TagRecord, WayNodeRecord, WayRecord};
