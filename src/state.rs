use nix::sys::signal::{Signal, kill};
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::Pid;
use std::fmt;

/// How a reaped background child ended.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Exited(i32),
    Signaled(i32),
}

/// One completed background job, ready to be announced by the loop.
#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub pid: Pid,
    pub outcome: JobOutcome,
}

impl fmt::Display for JobReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            JobOutcome::Exited(code) => {
                write!(f, "background pid {} is done. exit value {}", self.pid, code)
            }
            JobOutcome::Signaled(sig) => write!(
                f,
                "background pid {} is done: terminated by signal {}",
                self.pid, sig
            ),
        }
    }
}

/// Result of the `exit` built-in's attempt to kill one tracked job.
#[derive(Debug, Clone, PartialEq)]
pub struct KillReport {
    pub pid: Pid,
    pub killed: bool,
}

/// Per-process shell state, owned by the REPL loop.
pub struct ShellState {
    /// Raw wait status of the most recent foreground child; `None` until
    /// the first foreground command has run.
    pub last_fg_status: Option<WaitStatus>,
    /// Background children not yet observed to have terminated. A pid
    /// appears at most once, from spawn until the reap that collects it.
    pub jobs: Vec<Pid>,
}

impl ShellState {
    pub fn new() -> Self {
        Self {
            last_fg_status: None,
            jobs: Vec::new(),
        }
    }

    /// Track a freshly spawned background child.
    pub fn add_job(&mut self, pid: Pid) {
        self.jobs.push(pid);
    }

    /// Non-blocking reap of completed background jobs. Terminated children
    /// are removed from the table and returned for announcement; children
    /// still running stay tracked. Calling this again with no intervening
    /// activity returns nothing and leaves the table unchanged.
    pub fn reap_jobs(&mut self) -> Vec<JobReport> {
        let mut reports = Vec::new();

        self.jobs.retain(|&pid| match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::Exited(_, code)) => {
                reports.push(JobReport {
                    pid,
                    outcome: JobOutcome::Exited(code),
                });
                false
            }
            Ok(WaitStatus::Signaled(_, sig, _)) => {
                reports.push(JobReport {
                    pid,
                    outcome: JobOutcome::Signaled(sig as i32),
                });
                false
            }
            // Still running (or stopped); keep watching it.
            Ok(_) => true,
            // Nothing to wait for under that pid anymore; drop the slot.
            Err(_) => false,
        });

        reports
    }

    /// SIGKILL every still-tracked background job. Only the `exit` built-in
    /// calls this; the shell terminates right after.
    pub fn kill_all(&mut self) -> Vec<KillReport> {
        self.jobs
            .drain(..)
            .map(|pid| KillReport {
                pid,
                killed: kill(pid, Signal::SIGKILL).is_ok(),
            })
            .collect()
    }
}

impl Default for ShellState {
    fn default() -> Self {
        Self::new()
    }
}
