mod action;
mod app;
mod browser;
mod cli;
mod components;
mod config;
mod errors;
mod listing;
mod logging;
mod preferences;
mod terminal;

use std::env;

use clap::Parser;
use color_eyre::Result;
use tracing::info;

use crate::{
    app::App,
    cli::Cli,
    components::{
        Component,
        media_folders::MediaFoldersSelection,
        picker::{FolderPicker, PlainSelection},
    },
    config::Config,
    preferences::JsonPreferences,
};

#[tokio::main]
async fn main() -> Result<()> {
    errors::init()?;
    logging::init()?;

    let args = Cli::parse();
    let config = Config::new()?;

    let picker = if args.media_folders {
        let store = match args.preferences {
            Some(path) => JsonPreferences::new(path),
            None => JsonPreferences::in_dir(&config.config.data_dir),
        };
        info!("media folder preferences at {}", store.path().display());
        FolderPicker::new("/", Box::new(MediaFoldersSelection::new(store, args.start)))
    } else {
        let start = match args.start {
            Some(start) => start,
            None => env::current_dir()?,
        };
        FolderPicker::new(start, Box::new(PlainSelection))
    };

    let mode = picker.mode();
    let components: Vec<Box<dyn Component>> = vec![Box::new(picker)];
    let mut app = App::new(config, args.tick_rate, args.frame_rate, mode, components);
    if let Some(directory) = app.run().await? {
        println!("{}", directory.display());
    }
    Ok(())
}
