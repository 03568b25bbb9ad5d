use humantime::parse_duration;
use std::path::PathBuf;
use std::time::Duration;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Track the project in the terminal, one tick at a time.
    Run {
        /// Time between two updates (parse_duration)
        #[structopt(short, long, parse(try_from_str=parse_duration), default_value = "1s")]
        tick: Duration,

        /// Start tracking as if this much time had already elapsed (parse_duration)
        #[structopt(short, long, parse(try_from_str=parse_duration), default_value = "0s")]
        start_at: Duration,
    },
    /// List the tasks of the project with their expected end times.
    List,
    /// Show the active task once the given time has elapsed.
    At {
        /// Elapsed time since the start of the project (parse_duration)
        #[structopt(parse(try_from_str=parse_duration))]
        elapsed: Duration,
    },
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "schedule-timer",
    about = "A minimalistic timer for a schedule of tasks."
)]
pub struct CommandLineArgs {
    #[structopt(subcommand)]
    pub action: Command,

    /// Use a different project file.
    #[structopt(parse(from_os_str), short, long)]
    pub project_file: Option<PathBuf>,
}
