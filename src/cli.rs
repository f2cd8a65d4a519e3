use std::path::PathBuf;

use clap::Parser;

use crate::config::{get_config_dir, get_data_dir};

#[derive(Parser, Debug)]
#[command(author, version = version(), about)]
pub struct Cli {
    /// Directory to start browsing in
    #[arg(value_name = "DIR")]
    pub start: Option<PathBuf>,

    /// Mark the folders the media library scans instead of picking one folder
    #[arg(short, long)]
    pub media_folders: bool,

    /// Media folder preferences file, defaults to the data directory
    #[arg(short, long, value_name = "FILE", requires = "media_folders")]
    pub preferences: Option<PathBuf>,

    /// Tick rate, i.e. number of ticks per second
    #[arg(short, long, value_name = "FLOAT", default_value_t = 4.0)]
    pub tick_rate: f64,

    /// Frame rate, i.e. number of frames per second
    #[arg(short, long, value_name = "FLOAT", default_value_t = 30.0)]
    pub frame_rate: f64,
}

const VERSION_MESSAGE: &str = env!("CARGO_PKG_VERSION");

pub fn version() -> String {
    let author = clap::crate_authors!();
    let built = option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown");
    let target = option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown");

    let config_dir_path = get_config_dir().display().to_string();
    let data_dir_path = get_data_dir().display().to_string();

    format!(
        "\
{VERSION_MESSAGE} ({target}, built {built})

Authors: {author}

Config directory: {config_dir_path}
Data directory: {data_dir_path}"
    )
}
