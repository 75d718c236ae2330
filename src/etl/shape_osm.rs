use std::fs;
use std::io::BufRead;
use std::path::Path;
use std::rc::Rc;

use log::{error, info, warn};

use crate::config::{UserConfig, ValidationPolicy};
use crate::data::ShapedElement;
use crate::errors::Result;
use crate::reader::ElementReader;
use crate::schema::Schema;
use crate::shaper::{ShapeStats, Shaper};
use crate::sink::{output_paths, CsvSink};

use super::Etl;

pub const ETL_NAME: &str = "shape_osm";

/// Lazily shapes and validates elements as they are pulled. Elements that
/// are excluded, or invalid under [`ValidationPolicy::Skip`], never come out.
pub struct ShapedStream<R: BufRead> {
    reader: ElementReader<R>,
    shaper: Rc<Shaper>,
    schema: Rc<Schema>,
    policy: ValidationPolicy,
    stats: ShapeStats,
}

impl<R: BufRead> ShapedStream<R> {
    pub fn new(reader: ElementReader<R>, shaper: Rc<Shaper>, schema: Rc<Schema>, policy: ValidationPolicy) -> Self {
        ShapedStream {
            reader,
            shaper,
            schema,
            policy,
            stats: ShapeStats::default(),
        }
    }

    pub fn stats(&self) -> &ShapeStats {
        &self.stats
    }
}

impl<R: BufRead> Iterator for ShapedStream<R> {
    type Item = Result<ShapedElement>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let raw = match self.reader.next()? {
                Ok(raw) => raw,
                Err(err) => return Some(Err(err)),
            };
            let Some(shaped) = self.shaper.shape(&raw, &mut self.stats) else {
                continue;
            };
            match self.schema.validate(&shaped) {
                Ok(()) => return Some(Ok(shaped)),
                Err(invalid) => match self.policy {
                    ValidationPolicy::FailFast => return Some(Err(invalid.into())),
                    ValidationPolicy::Skip => {
                        warn!(
                            element_id = invalid.element_id,
                            record = invalid.record,
                            field = invalid.field.as_str(),
                            detail = invalid.detail.as_str();
                            "Skipping invalid element"
                        );
                        self.stats.invalid += 1;
                    }
                },
            }
        }
    }
}

/// Reads the configured .osm extract and writes the five CSV tables into the
/// ETL directory.
pub struct ShapeOsmEtl<'a> {
    config: &'a UserConfig,
    shaper: Rc<Shaper>,
    schema: Rc<Schema>,
    stats: ShapeStats,
}

impl<'a> ShapeOsmEtl<'a> {
    pub fn new(config: &'a UserConfig, shaper: Shaper, schema: Schema) -> Self {
        ShapeOsmEtl {
            config,
            shaper: Rc::new(shaper),
            schema: Rc::new(schema),
            stats: ShapeStats::default(),
        }
    }

    /// Builds the standard shaper with the overrides named in the config.
    pub fn from_config(config: &'a UserConfig) -> Result<Self> {
        let shaper = Shaper::standard(config.overrides()?)?;
        Ok(ShapeOsmEtl::new(config, shaper, Schema::default()))
    }

    /// Counters of the last completed load.
    pub fn stats(&self) -> &ShapeStats {
        &self.stats
    }

    fn write_tables(dir: &Path, output: &mut ShapedStream<Box<dyn BufRead>>) -> Result<()> {
        let mut sink = CsvSink::create(dir)?;
        for element in tqdm::tqdm(output.by_ref()) {
            sink.write(&element?)?;
        }
        sink.flush()
    }
}

impl Etl for ShapeOsmEtl<'_> {
    type Input = ElementReader<Box<dyn BufRead>>;
    type Output = ShapedStream<Box<dyn BufRead>>;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn is_cached(&self, dir: &Path) -> Result<bool> {
        if self.config.overwrite {
            return Ok(false);
        }
        for path in output_paths(dir) {
            if !path.try_exists()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn clean(&self, dir: &Path) -> Result<()> {
        for path in output_paths(dir) {
            if path.try_exists()? {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    fn extract(&mut self, _dir: &Path) -> Result<Self::Input> {
        ElementReader::open(Path::new(&self.config.data_path))
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        if !self.schema.matches_output_layout() {
            return Err("Schema columns do not match the output tables".into());
        }
        Ok(ShapedStream::new(input, Rc::clone(&self.shaper), Rc::clone(&self.schema), self.config.on_invalid))
    }

    fn load(&mut self, dir: &Path, mut output: Self::Output) -> Result<()> {
        // partial tables must not be mistaken for a cached result
        if let Err(err) = Self::write_tables(dir, &mut output) {
            if let Err(clean_err) = self.clean(dir) {
                error!(etl_name = ETL_NAME, err = clean_err.message.as_str(); "Could not remove partial output");
            }
            return Err(err);
        }

        let stats = output.stats().clone();
        info!(
            etl_name = ETL_NAME,
            nodes = stats.nodes,
            ways = stats.ways,
            tags = stats.tags,
            dropped_tags = stats.dropped_tags,
            excluded = stats.excluded,
            invalid = stats.invalid,
            fixme_values = stats.fixme_values;
            "Shaping summary"
        );
        self.stats = stats;
        Ok(())
    }
}
