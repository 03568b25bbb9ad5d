use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use crossterm::cursor::{Hide, MoveTo, MoveToNextLine, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use humantime::format_duration;
use log::{debug, info};
use prettytable::Table;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use crate::model::{Project, TaskProgress};

/// Widest a task name gets in the task table before wrapping.
const NAME_WIDTH: usize = 40;
const BAR_ROWS: usize = 3;
const DEFAULT_WIDTH: usize = 80;

/// Restores the terminal when dropped, whatever the way out of the loop.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode.")?;
        execute!(io::stdout(), EnterAlternateScreen, Hide)
            .context("Failed to enter the alternate screen.")?;
        Ok(TerminalGuard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// Track the project in the terminal until the schedule is over or the
/// user quits. The elapsed time starts at `start_at` and moves forward by
/// `tick` on every tick.
pub fn run(project: &Project, tick: Duration, start_at: Duration) -> Result<()> {
    let mut elapsed = start_at;
    let mut latest = match project.progress(elapsed) {
        Some(progress) => progress,
        None => {
            println!("Nothing to track: the schedule has no active task.");
            return Ok(());
        }
    };

    info!(
        "Tracking project '{}' from {} (tick: {})",
        project.name(),
        format_duration(elapsed),
        format_duration(tick)
    );

    let guard = TerminalGuard::enter()?;
    let mut stdout = io::stdout();
    let mut next_tick = Instant::now()
        .checked_add(tick)
        .context("The tick is too long.")?;

    let finished = loop {
        draw(&mut stdout, project, &latest)?;

        let timeout = next_tick.saturating_duration_since(Instant::now());
        if event::poll(timeout).context("Failed to poll terminal events.")? {
            let event = event::read().context("Failed to read terminal event.")?;
            if let Event::Key(key) = event {
                if is_quit(&key) {
                    break false;
                }
            }
            continue;
        }

        next_tick = next_tick
            .checked_add(tick)
            .context("The tick is too long.")?;
        match advance(project, elapsed, tick) {
            Some((next, progress)) => {
                elapsed = next;
                if progress.task_index() != latest.task_index() {
                    debug!(
                        "Task {} '{}' is now active (#{})",
                        progress.task_id(),
                        progress.name(),
                        progress.task_index()
                    );
                }
                latest = progress;
            }
            None => break true,
        }
    };
    drop(guard);

    if finished {
        info!("Project '{}' finished after {}", project.name(), format_duration(elapsed));
        println!("Done");
    } else {
        info!("Stopped at {}", format_duration(elapsed));
    }
    Ok(())
}

/// Move `elapsed` forward by one tick. None once there is no active task
/// left, or when the elapsed time can no longer be counted.
fn advance(project: &Project, elapsed: Duration, tick: Duration) -> Option<(Duration, TaskProgress)> {
    let elapsed = elapsed.checked_add(tick)?;
    Some((elapsed, project.progress(elapsed)?))
}

fn is_quit(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn draw(stdout: &mut io::Stdout, project: &Project, progress: &TaskProgress) -> Result<()> {
    let width = terminal::size()
        .map(|(columns, _)| columns as usize)
        .unwrap_or(DEFAULT_WIDTH);
    let frame = render_frame(project, progress, width, Local::now())?;

    queue!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
    for line in frame.lines() {
        queue!(stdout, Print(line), MoveToNextLine(1))?;
    }
    stdout.flush().context("Failed to draw the screen.")?;
    Ok(())
}

/// Render one screen of the tracking loop.
pub fn render_frame(
    project: &Project,
    progress: &TaskProgress,
    width: usize,
    now: DateTime<Local>,
) -> Result<String> {
    let mut screen = String::new();

    screen += &format!("Project: {}", project.name());
    if project.repeat() {
        screen += " (repeat)";
    }
    screen += "\n";
    screen += &format!("Task: {}\n", progress.name());

    // the bar shrinks as the task goes on
    let bar = bar(1.0 - progress.progress_ratio(), width);
    for _ in 0..BAR_ROWS {
        screen += &bar;
        screen += "\n";
    }
    screen += &format!(
        "{} / {}\n",
        format_duration(progress.remaining()),
        format_duration(progress.total())
    );
    screen += &"-".repeat(width);
    screen += "\n";

    let since = chrono::Duration::from_std(started_since(project, progress))
        .context("Task start time is out of range.")?;
    let cycle_start = now
        .checked_sub_signed(since)
        .context("Task start time is out of range.")?;
    screen += &task_table(project, Some(progress.task_index()), cycle_start)?.to_string();
    Ok(screen)
}

/// Time since the current pass through the task list began.
fn started_since(project: &Project, progress: &TaskProgress) -> Duration {
    let before: Duration = project.tasks()[..progress.task_index()]
        .iter()
        .fold(Duration::ZERO, |total, task| total.saturating_add(task.duration()));
    before.saturating_add(progress.elapsed())
}

fn bar(fill: f64, width: usize) -> String {
    let filled = ((fill.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Expected end time of every task when the list starts at `start`.
pub fn end_times(project: &Project, start: DateTime<Local>) -> Result<Vec<DateTime<Local>>> {
    let mut end = start;
    let mut ends = Vec::with_capacity(project.tasks().len());
    for task in project.tasks() {
        let delta = chrono::Duration::from_std(task.duration())
            .context("Task duration is out of range.")?;
        end = end
            .checked_add_signed(delta)
            .context("Expected end time is out of range.")?;
        ends.push(end);
    }
    Ok(ends)
}

/// The table of all the tasks, with the active one (if any) marked.
pub fn task_table(project: &Project, active: Option<usize>, start: DateTime<Local>) -> Result<Table> {
    let mut table = Table::new();
    table.add_row(row!["", "#", "task", "duration", "expected end"]);

    let ends = end_times(project, start)?;
    for (index, (task, end)) in project.tasks().iter().zip(ends).enumerate() {
        let marker = if active == Some(index) { ">" } else { "" };
        table.add_row(row![
            marker,
            index,
            textwrap::fill(task.name(), NAME_WIDTH),
            format_duration(task.duration()),
            end.format("%T")
        ]);
    }
    Ok(table)
}

/// Print the tasks of the project as if it was started now.
pub fn list(project: &Project) -> Result<()> {
    task_table(project, None, Local::now())?.printstd();
    println!(
        "{}: {} task(s), {} in total{}.",
        project.name(),
        project.tasks().len(),
        format_duration(project.duration()),
        if project.repeat() { ", repeating" } else { "" }
    );
    Ok(())
}

/// Describe the state of the project once `elapsed` has passed.
pub fn describe(project: &Project, elapsed: Duration) -> String {
    match project.progress(elapsed) {
        Some(progress) => format!(
            "#{} {}: {} / {} ({:.0}%), {} left",
            progress.task_index(),
            progress.name(),
            format_duration(progress.elapsed()),
            format_duration(progress.total()),
            progress.progress_ratio() * 100.0,
            format_duration(progress.remaining())
        ),
        None => "No active task: the schedule is over.".to_string(),
    }
}

pub fn at(project: &Project, elapsed: Duration) -> Result<()> {
    println!("{}", describe(project, elapsed));
    Ok(())
}
