use anyhow::{bail, Context, Result};
use log::debug;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::model::{Project, Task};

/// A task entry of the project document.
#[derive(Debug, Deserialize)]
struct TaskEntry {
    #[serde(default)]
    name: String,
    /// in seconds
    #[serde(default)]
    duration: u64,
}

/// The project document, as written by the user.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProjectDocument {
    name: String,
    repeat: bool,
    tasks: Vec<TaskEntry>,
}

/// Build a project from a YAML document.
pub fn read(text: &str) -> Result<Project> {
    let document: ProjectDocument =
        serde_yaml::from_str(text).context("Failed to parse project document.")?;

    let mut project = Project::new(document.name, Vec::new(), document.repeat);
    let mut total = Duration::ZERO;
    for entry in document.tasks {
        let duration = Duration::from_secs(entry.duration);
        total = match total.checked_add(duration) {
            Some(total) => total,
            None => bail!("The tasks of project '{}' last too long.", project.name()),
        };
        project.add_task(Task::new(entry.name, duration));
    }

    debug!(
        "Loaded project {} '{}' ({} tasks, repeat: {})",
        project.id(),
        project.name(),
        project.tasks().len(),
        project.repeat()
    );
    Ok(project)
}

/// Read the project document at `path`.
pub fn read_file(path: &Path) -> Result<Project> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read project file {}.", path.display()))?;
    read(&text).with_context(|| format!("Invalid project file {}.", path.display()))
}
