#[macro_use]
extern crate prettytable;

use anyhow::{anyhow, bail};
use directories::ProjectDirs;
use log::debug;
use std::path::PathBuf;
use structopt::StructOpt;

mod cli;
mod interface;
mod loader;
mod model;

use cli::{Command::*, CommandLineArgs};

/// The project file used when none is given on the command line.
fn find_default_project_file() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("com", "schedule-timer", "schedule-timer")?;
    let mut path = PathBuf::from(dirs.config_dir());
    path.push("project.yaml");
    Some(path)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Get the command-line arguments.
    let CommandLineArgs {
        action,
        project_file,
    } = CommandLineArgs::from_args();

    // Unpack the project file.
    let project_file = project_file
        .or_else(find_default_project_file)
        .ok_or_else(|| anyhow!("Failed to find a project file."))?;
    debug!("Reading project from {}", project_file.display());

    let project = loader::read_file(&project_file)?;

    // Perform the action.
    match action {
        Run { tick, start_at } => {
            if tick.is_zero() {
                bail!("The tick must be longer than zero.");
            }
            interface::run(&project, tick, start_at)
        }
        List => interface::list(&project),
        At { elapsed } => interface::at(&project, elapsed),
    }?;
    Ok(())
}
