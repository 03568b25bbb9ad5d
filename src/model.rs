use std::fmt;
use std::time::Duration;
use uuid::Uuid;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Opaque identity of a task. Assigned at creation, it never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(Uuid);

impl TaskId {
    fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque identity of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectId(Uuid);

impl ProjectId {
    fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A named unit of work with a fixed duration.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    id: TaskId,
    name: String,
    duration: Duration,
}

impl Task {
    pub fn new(name: impl Into<String>, duration: Duration) -> Self {
        Task {
            id: TaskId::new(),
            name: name.into(),
            duration,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

/// An ordered sequence of tasks. When `repeat` is set, the sequence
/// restarts from the first task once the last one is over, forever.
#[derive(Debug, Clone)]
pub struct Project {
    id: ProjectId,
    name: String,
    tasks: Vec<Task>,
    repeat: bool,
}

impl Project {
    pub fn new(name: impl Into<String>, tasks: Vec<Task>, repeat: bool) -> Self {
        Project {
            id: ProjectId::new(),
            name: name.into(),
            tasks,
            repeat,
        }
    }

    pub fn id(&self) -> ProjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Append a task at the end of the sequence. Only meant to be used
    /// while the project is being built.
    pub fn add_task(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Sum of the durations of all the tasks. Zero for an empty project.
    /// Saturates at `Duration::MAX`.
    pub fn duration(&self) -> Duration {
        self.tasks
            .iter()
            .fold(Duration::ZERO, |total, task| total.saturating_add(task.duration))
    }

    /// Return the task active after `elapsed` time since tracking began, if any.
    ///
    /// The instant where a task ends and the next one starts belongs to
    /// the next task. A non-repeating project keeps its last task active
    /// up to and including its end, and has no active task after it. A
    /// repeating project wraps around its total duration, unless that
    /// duration is zero, in which case nothing is ever active.
    pub fn progress(&self, elapsed: Duration) -> Option<TaskProgress> {
        if self.repeat {
            let cycle = self.duration();
            if cycle.is_zero() {
                return None;
            }
            return self.locate(wrap(elapsed, cycle));
        }

        if elapsed > self.duration() {
            return None;
        }
        // only reached at the very end of the schedule
        self.locate(elapsed).or_else(|| {
            let index = self.tasks.len().checked_sub(1)?;
            let last = &self.tasks[index];
            Some(TaskProgress::of(last, index, last.duration()))
        })
    }

    /// Find the first task whose end lies strictly after `elapsed`.
    fn locate(&self, elapsed: Duration) -> Option<TaskProgress> {
        let mut rest = elapsed;
        for (index, task) in self.tasks.iter().enumerate() {
            if rest < task.duration {
                return Some(TaskProgress::of(task, index, rest));
            }
            rest -= task.duration;
        }
        None
    }
}

/// `elapsed` modulo `cycle`. `cycle` must not be zero.
fn wrap(elapsed: Duration, cycle: Duration) -> Duration {
    let rest = elapsed.as_nanos() % cycle.as_nanos();
    Duration::new(
        (rest / NANOS_PER_SEC) as u64,
        (rest % NANOS_PER_SEC) as u32,
    )
}

/// Snapshot of the active task of a project at a given instant.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskProgress {
    task_id: TaskId,
    task_index: usize,
    name: String,
    elapsed: Duration,
    total: Duration,
}

impl TaskProgress {
    pub fn new(
        task_id: TaskId,
        task_index: usize,
        name: impl Into<String>,
        elapsed: Duration,
        total: Duration,
    ) -> Self {
        TaskProgress {
            task_id,
            task_index,
            name: name.into(),
            elapsed,
            total,
        }
    }

    fn of(task: &Task, task_index: usize, elapsed: Duration) -> Self {
        TaskProgress::new(task.id(), task_index, task.name(), elapsed, task.duration())
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Zero-based position of the task within its project.
    pub fn task_index(&self) -> usize {
        self.task_index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Time spent since the task started.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn remaining(&self) -> Duration {
        self.total.saturating_sub(self.elapsed)
    }

    /// Fraction of the task already done, between 0 and 1. Zero-length
    /// tasks are always at 0.
    pub fn progress_ratio(&self) -> f64 {
        if self.total.is_zero() || self.elapsed.is_zero() {
            return 0.0;
        }
        (self.elapsed.as_secs_f64() / self.total.as_secs_f64()).min(1.0)
    }
}
