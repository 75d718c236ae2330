use std::env;
use std::fs::create_dir_all;
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use structured_logger::json::new_writer;
use structured_logger::Builder;

use osm_shaper::config::{load_user_config, UserConfig};
use osm_shaper::errors::Result;
use osm_shaper::etl::shape_osm::ShapeOsmEtl;
use osm_shaper::etl::Etl;

const DEFAULT_CONFIG_PATH: &str = "config/tampa.json";

fn create_output_dir(config: &UserConfig) -> Result<PathBuf> {
    let output_dir = Path::new(&config.dest_path).to_path_buf();
    create_dir_all(&output_dir)?;
    Ok(output_dir)
}

fn setup_logging(level: &str) {
    Builder::with_level(level)
        .with_target_writer("*", new_writer(io::stdout()))
        .init();
}

fn main() -> Result<()> {
    let config_path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let user_config = load_user_config(Path::new(&config_path))?;
    setup_logging(&user_config.log_level);
    info!(config = config_path.as_str(), data_path = user_config.data_path.as_str(); "Loaded configuration");

    let output_dir = create_output_dir(&user_config)?;
    let mut etl = ShapeOsmEtl::from_config(&user_config)?;
    etl.process(&output_dir)?;

    Ok(())
}
