use color_eyre::Result;
use time::macros::format_description;
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, time::LocalTime},
    prelude::*,
};

use crate::config;

const LOG_FILE: &str = "dirpick.log";
const LOG_LEVEL_ENV: &str = "DIRPICK_LOG_LEVEL";

/// Logs to a file in the data directory; the terminal belongs to the picker.
pub fn init() -> Result<()> {
    let directory = config::get_data_dir();
    std::fs::create_dir_all(&directory)?;
    let log_file = std::fs::File::create(directory.join(LOG_FILE))?;
    let env_filter = EnvFilter::builder().with_default_directive(tracing::Level::INFO.into());
    let timer = LocalTime::new(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"
    ));

    // RUST_LOG first, then DIRPICK_LOG_LEVEL. A malformed DIRPICK_LOG_LEVEL is an error.
    let env_filter = env_filter
        .try_from_env()
        .or_else(|_| env_filter.with_env_var(LOG_LEVEL_ENV).from_env())?;
    let file_subscriber = fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_timer(timer)
        .with_filter(env_filter);
    tracing_subscriber::registry()
        .with(file_subscriber)
        .with(ErrorLayer::default())
        .try_init()?;
    Ok(())
}
