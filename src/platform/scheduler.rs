//! Cooperative task scheduling on a virtual clock
//!
//! There is one execution thread. Work is deferred by scheduling a [`Task`]
//! with a declared [`Resume`] point; the page's event loop later hands due
//! tasks back to whoever owns them. Time only moves when the host advances
//! it, which keeps every suspension point deterministic.

/// Deferred work items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Set up the lazy observation engine after boot
    EngineSetup,
    /// Frame-coalesced scan of the fallback pending set
    FallbackScan,
}

/// When a scheduled task resumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    /// In the next idle period, or once `timeout_ms` elapses, whichever is first
    Idle { timeout_ms: u64 },
    /// After `ms` milliseconds
    Delay { ms: u64 },
    /// Before the next rendered frame
    NextFrame,
}

#[derive(Debug, Clone)]
struct ScheduledTask {
    /// Scheduling order, breaks deadline ties
    seq: u64,
    task: Task,
    resume: Resume,
    /// Deadline on the virtual clock; frame tasks have none
    due_ms: Option<u64>,
}

/// Task scheduler with a virtual millisecond clock
#[derive(Debug, Default)]
pub struct Scheduler {
    now_ms: u64,
    next_seq: u64,
    queue: Vec<ScheduledTask>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Schedule a task
    pub fn schedule(&mut self, task: Task, resume: Resume) {
        let seq = self.next_seq;
        self.next_seq += 1;
        let due_ms = match resume {
            Resume::Idle { timeout_ms } => Some(self.now_ms + timeout_ms),
            Resume::Delay { ms } => Some(self.now_ms + ms),
            Resume::NextFrame => None,
        };
        self.queue.push(ScheduledTask {
            seq,
            task,
            resume,
            due_ms,
        });
    }

    /// The host entered an idle period: release every idle task
    pub fn take_idle(&mut self) -> Vec<Task> {
        self.take_where(|t| matches!(t.resume, Resume::Idle { .. }))
    }

    /// A frame is about to render: release every frame task
    pub fn take_frame(&mut self) -> Vec<Task> {
        self.take_where(|t| t.resume == Resume::NextFrame)
    }

    /// Move the clock forward and release timed tasks that became due,
    /// earliest deadline first
    pub fn advance(&mut self, ms: u64) -> Vec<Task> {
        self.now_ms += ms;
        let now = self.now_ms;
        let mut due: Vec<ScheduledTask> = Vec::new();
        self.queue.retain(|t| match t.due_ms {
            Some(deadline) if deadline <= now => {
                due.push(t.clone());
                false
            }
            _ => true,
        });
        due.sort_by_key(|t| (t.due_ms, t.seq));
        due.into_iter().map(|t| t.task).collect()
    }

    fn take_where(&mut self, pred: impl Fn(&ScheduledTask) -> bool) -> Vec<Task> {
        let mut taken = Vec::new();
        self.queue.retain(|t| {
            if pred(t) {
                taken.push(t.task);
                false
            } else {
                true
            }
        });
        taken
    }

    /// Whether a task of this kind is waiting
    pub fn is_scheduled(&self, task: Task) -> bool {
        self.queue.iter().any(|t| t.task == task)
    }

    /// Number of waiting tasks
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_task_runs_in_idle_period() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Task::EngineSetup, Resume::Idle { timeout_ms: 2000 });

        assert!(scheduler.take_frame().is_empty());
        assert_eq!(scheduler.take_idle(), vec![Task::EngineSetup]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_idle_task_bounded_by_timeout() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Task::EngineSetup, Resume::Idle { timeout_ms: 2000 });

        assert!(scheduler.advance(1999).is_empty());
        assert_eq!(scheduler.advance(1), vec![Task::EngineSetup]);
        assert_eq!(scheduler.now_ms(), 2000);
    }

    #[test]
    fn test_delay_and_frame() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Task::FallbackScan, Resume::NextFrame);
        scheduler.schedule(Task::EngineSetup, Resume::Delay { ms: 1 });

        assert!(scheduler.is_scheduled(Task::FallbackScan));
        assert_eq!(scheduler.advance(16), vec![Task::EngineSetup]);
        assert_eq!(scheduler.take_frame(), vec![Task::FallbackScan]);
        assert!(!scheduler.is_scheduled(Task::FallbackScan));
    }

    #[test]
    fn test_due_tasks_release_earliest_first() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Task::FallbackScan, Resume::Delay { ms: 10 });
        scheduler.schedule(Task::EngineSetup, Resume::Delay { ms: 5 });

        assert_eq!(
            scheduler.advance(10),
            vec![Task::EngineSetup, Task::FallbackScan]
        );
    }
}
