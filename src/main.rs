mod app;
mod cli;
mod config;
mod core;
mod executors;
mod organizers;
mod parser;
mod plugins;
mod ui;
mod utils;

use clap::Parser;
use colored::Colorize;

use crate::ui::printer::{Source, format_line};

#[tokio::main]
async fn main() {
    human_panic::setup_panic!();

    let cli = cli::args::Cli::parse();
    let code = match app::run(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{}", format_line(Source::Telescope, &format!("fatal: {:#}", err)).red());
            1
        }
    };

    // A prompt may still be blocked on stdin; don't wait for it
    std::process::exit(code);
}
