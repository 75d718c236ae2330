use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use osm_shaper::config::{UserConfig, ValidationPolicy};
use osm_shaper::data::{ElementKind, ShapedElement};
use osm_shaper::etl::shape_osm::ShapeOsmEtl;
use osm_shaper::etl::Etl;
use osm_shaper::normalize::overrides::Overrides;
use osm_shaper::reader::ElementReader;
use osm_shaper::schema::Schema;
use osm_shaper::shaper::{ShapeStats, Shaper};
use osm_shaper::sink::{output_paths, CsvSink, Tables, NODES_FILE, NODE_TAGS_FILE, WAY_NODES_FILE, WAY_TAGS_FILE};

const TAMPA_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6" generator="osmconvert">
  <bounds minlat="27.56" minlon="-82.87" maxlat="28.17" maxlon="-82.05"/>
  <node id="100" lat="27.9506" lon="-82.4572" user="mapper" uid="11" version="2" changeset="501" timestamp="2016-02-01T10:00:00Z">
    <tag k="addr:street" v="123 Main St"/>
    <tag k="addr:postcode" v="FL 33612"/>
  </node>
  <node id="101" lat="27.9600" lon="-82.5060" user="mapper" uid="11" version="1" changeset="502" timestamp="2016-02-02T10:00:00Z">
    <tag k="addr:street" v="N Dale Mabry Hwy"/>
    <tag k="addr:city" v="st petersburg"/>
    <tag k="addr:postcode" v="00000"/>
  </node>
  <node id="102" lat="27.7676" lon="-82.6403" user="Zoë" uid="12" version="4" changeset="503" timestamp="2016-02-03T10:00:00Z">
    <tag k="population" v="1,234"/>
    <tag k="name" v="Café Ñandú, Ybor"/>
    <tag k="bad.key" v="dropped"/>
  </node>
  <node id="2061928287" lat="27.9" lon="-82.4" user="mapper" uid="11" version="1" changeset="504" timestamp="2016-02-04T10:00:00Z">
    <tag k="amenity" v="bowling_alley"/>
  </node>
  <way id="200" user="mapper" uid="11" version="3" changeset="505" timestamp="2016-02-05T10:00:00Z">
    <nd ref="102"/>
    <nd ref="100"/>
    <nd ref="101"/>
    <tag k="highway" v="residential"/>
    <tag k="tiger:county" v="Hillsborough, FL"/>
  </way>
  <relation id="300" user="mapper" uid="11" version="1" changeset="506" timestamp="2016-02-06T10:00:00Z">
    <member type="way" ref="200" role="outer"/>
  </relation>
</osm>"#;

fn shape_all(xml: &str) -> (Vec<ShapedElement>, ShapeStats) {
    let shaper = Shaper::standard(Overrides::builtin().expect("builtin overrides")).expect("shaper");
    let schema = Schema::default();
    let mut stats = ShapeStats::default();
    let mut shaped = Vec::new();
    for raw in ElementReader::from_xml(xml) {
        let raw = raw.expect("sample parses");
        if let Some(element) = shaper.shape(&raw, &mut stats) {
            schema.validate(&element).expect("sample is valid");
            shaped.push(element);
        }
    }
    (shaped, stats)
}

fn rows(csv_text: &str) -> Vec<Vec<String>> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(csv_text.as_bytes())
        .records()
        .map(|record| record.expect("csv row").iter().map(str::to_string).collect())
        .collect()
}

fn tag_rows(csv_text: &str, id: &str) -> Vec<(String, String, String)> {
    rows(csv_text).into_iter()
        .skip(1)
        .filter(|row| row[0] == id)
        .map(|row| (row[1].clone(), row[2].clone(), row[3].clone()))
        .collect()
}

fn has_tag(tags: &[(String, String, String)], key: &str, value: &str, tag_type: &str) -> bool {
    tags.iter().any(|(k, v, t)| k == key && v == value && t == tag_type)
}

fn memory_tables(elements: &[ShapedElement]) -> Tables<String> {
    let mut sink = CsvSink::new(Tables {
        nodes: Vec::new(),
        node_tags: Vec::new(),
        ways: Vec::new(),
        way_tags: Vec::new(),
        way_nodes: Vec::new(),
    }).expect("sink");
    for element in elements {
        sink.write(element).expect("element written");
    }
    let tables = sink.into_inner().expect("flush");
    let text = |bytes: Vec<u8>| String::from_utf8(bytes).expect("utf-8");
    Tables {
        nodes: text(tables.nodes),
        node_tags: text(tables.node_tags),
        ways: text(tables.ways),
        way_tags: text(tables.way_tags),
        way_nodes: text(tables.way_nodes),
    }
}

#[test]
fn sample_extract_is_shaped_into_five_tables() {
    let (elements, stats) = shape_all(TAMPA_SAMPLE);
    assert_eq!(stats.nodes, 3);
    assert_eq!(stats.ways, 1);
    assert_eq!(stats.excluded, 1);
    assert_eq!(stats.dropped_tags, 1);

    let tables = memory_tables(&elements);

    let node_ids: Vec<String> = rows(&tables.nodes).into_iter().skip(1).map(|row| row[0].clone()).collect();
    assert_eq!(node_ids, vec!["100", "101", "102"]);

    let first = tag_rows(&tables.node_tags, "100");
    assert!(has_tag(&first, "street", "123 Main Street", "addr"));
    assert!(has_tag(&first, "u_street", "123 Main Street", "addr"));
    assert!(has_tag(&first, "postcode", "33612", "addr"));

    let second = tag_rows(&tables.node_tags, "101");
    assert!(has_tag(&second, "street", "North Dale Mabry Highway", "addr"));
    assert!(has_tag(&second, "u_street", "Dale Mabry Highway", "addr"));
    assert!(has_tag(&second, "city", "Saint Petersburg", "addr"));
    assert!(has_tag(&second, "postcode", "FIXME", "addr"));

    let third = tag_rows(&tables.node_tags, "102");
    assert!(has_tag(&third, "population", "1234", "regular"));
    assert!(has_tag(&third, "name", "Café Ñandú, Ybor", "regular"));
    assert_eq!(third.len(), 2);

    let way_tags = tag_rows(&tables.way_tags, "200");
    assert!(has_tag(&way_tags, "highway", "residential", "regular"));
    assert!(has_tag(&way_tags, "county", "Hillsborough", "tiger"));

    assert_eq!(
        rows(&tables.way_nodes),
        vec![
            vec!["id", "node_id", "position"],
            vec!["200", "102", "0"],
            vec!["200", "100", "1"],
            vec!["200", "101", "2"],
        ]
    );
    assert!(!tables.nodes.contains("2061928287"));
}

fn config_for(dir: &Path, on_invalid: ValidationPolicy) -> UserConfig {
    UserConfig {
        data_path: dir.join("tampa.osm").to_string_lossy().into_owned(),
        dest_path: dir.join("out").to_string_lossy().into_owned(),
        overrides_path: None,
        on_invalid,
        overwrite: false,
        log_level: "info".to_string(),
    }
}

#[test]
fn etl_writes_csv_files_and_reuses_them() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join("tampa.osm"), TAMPA_SAMPLE).expect("write sample");
    let config = config_for(dir.path(), ValidationPolicy::FailFast);
    let out = Path::new(&config.dest_path);
    fs::create_dir_all(out).expect("output dir");

    let mut etl = ShapeOsmEtl::from_config(&config).expect("etl");
    assert!(!etl.is_cached(out).expect("cache check"));
    etl.process(out).expect("etl runs");
    assert!(output_paths(out).iter().all(|path| path.exists()));
    assert_eq!(etl.stats().nodes, 3);
    assert!(etl.is_cached(out).expect("cache check"));

    let nodes = fs::read_to_string(out.join(NODES_FILE)).expect("nodes.csv");
    assert!(nodes.starts_with("id,lat,lon,user,uid,version,changeset,timestamp\n"));
    assert!(nodes.contains("102,27.7676,-82.6403,Zoë,12,4,503,2016-02-03T10:00:00Z"));

    let node_tags = fs::read_to_string(out.join(NODE_TAGS_FILE)).expect("nodes_tags.csv");
    assert!(node_tags.contains("\"Café Ñandú, Ybor\""));
    let way_tags = fs::read_to_string(out.join(WAY_TAGS_FILE)).expect("ways_tags.csv");
    assert!(way_tags.contains("200,county,Hillsborough,tiger"));
    let way_nodes = fs::read_to_string(out.join(WAY_NODES_FILE)).expect("ways_nodes.csv");
    assert_eq!(way_nodes.lines().count(), 4);

    // a second run keeps the cached tables untouched
    let mut again = ShapeOsmEtl::from_config(&config).expect("etl");
    again.process(out).expect("cached run");
    assert_eq!(again.stats().nodes, 0);
}

#[test]
fn fail_fast_run_leaves_no_partial_tables() {
    let dir = tempfile::tempdir().expect("temp dir");
    let broken = TAMPA_SAMPLE.replace(r#"lat="27.9600""#, r#"lat="north""#);
    fs::write(dir.path().join("tampa.osm"), broken).expect("write sample");
    let config = config_for(dir.path(), ValidationPolicy::FailFast);
    let out = Path::new(&config.dest_path);
    fs::create_dir_all(out).expect("output dir");

    let mut etl = ShapeOsmEtl::from_config(&config).expect("etl");
    let error = etl.process(out).expect_err("invalid latitude aborts the run");
    assert!(error.message.contains("Element 101"));
    assert!(output_paths(out).iter().all(|path| !path.exists()));
}

#[test]
fn skip_run_drops_only_the_invalid_element() {
    let dir = tempfile::tempdir().expect("temp dir");
    let broken = TAMPA_SAMPLE.replace(r#"lat="27.9600""#, r#"lat="north""#);
    fs::write(dir.path().join("tampa.osm"), broken).expect("write sample");
    let config = config_for(dir.path(), ValidationPolicy::Skip);
    let out = Path::new(&config.dest_path);
    fs::create_dir_all(out).expect("output dir");

    let mut etl = ShapeOsmEtl::from_config(&config).expect("etl");
    etl.process(out).expect("skip policy keeps going");
    assert_eq!(etl.stats().invalid, 1);

    let nodes = fs::read_to_string(out.join(NODES_FILE)).expect("nodes.csv");
    assert!(!nodes.contains("\n101,"));
    let node_tags = fs::read_to_string(out.join(NODE_TAGS_FILE)).expect("nodes_tags.csv");
    assert!(!node_tags.contains("\n101,"));
}

#[test]
fn malformed_documents_abort_the_run() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join("tampa.osm"), r#"<osm><node id="1" lat="1" lon="1"></way></osm>"#).expect("write sample");
    let config = config_for(dir.path(), ValidationPolicy::Skip);
    let out = Path::new(&config.dest_path);
    fs::create_dir_all(out).expect("output dir");

    let mut etl = ShapeOsmEtl::from_config(&config).expect("etl");
    assert!(etl.process(out).is_err());
}

#[test]
fn xz_compressed_extracts_are_read_transparently() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("tampa.osm.xz");
    let mut encoder = xz::write::XzEncoder::new(File::create(&path).expect("create archive"), 6);
    encoder.write_all(TAMPA_SAMPLE.as_bytes()).expect("compress sample");
    encoder.finish().expect("finish archive");

    let elements: Vec<(ElementKind, i64)> = ElementReader::open(&path)
        .expect("archive opens")
        .map(|element| element.map(|element| (element.kind, element.id)))
        .collect::<osm_shaper::errors::Result<_>>()
        .expect("archive parses");
    assert_eq!(
        elements,
        vec![
            (ElementKind::Node, 100),
            (ElementKind::Node, 101),
            (ElementKind::Node, 102),
            (ElementKind::Node, 2061928287),
            (ElementKind::Way, 200),
        ]
    );
}

#[test]
fn write_error_survives_a_failed_cleanup() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join("tampa.osm"), TAMPA_SAMPLE).expect("write sample");
    let config = config_for(dir.path(), ValidationPolicy::FailFast);
    let out = Path::new(&config.dest_path);
    // a directory where a table should go breaks both writing and removal
    fs::create_dir_all(out.join("ways.csv")).expect("blocking dir");

    let mut etl = ShapeOsmEtl::from_config(&config).expect("etl");
    let error = etl.process(out).expect_err("table cannot be created");
    assert!(error.message.contains("Could not create"), "{}", error.message);
    assert!(error.message.contains("ways.csv"));
    assert!(!out.join(NODES_FILE).exists());
}
