use crate::state::ShellState;
use nix::sys::wait::WaitStatus;
use std::env;
use std::path::Path;
use std::process;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuiltinError {
    #[error("Builtin error: {0}")]
    General(String),
}

pub trait Builtin {
    fn execute(&self, args: &[String], state: &mut ShellState) -> Result<i32, BuiltinError>;
}

/// Render the last foreground status the way `status` reports it. A shell
/// that has not yet run a foreground command reports a clean exit.
pub fn format_status(status: Option<WaitStatus>) -> String {
    match status {
        Some(WaitStatus::Exited(_, code)) => format!("exit value {}", code),
        Some(WaitStatus::Signaled(_, sig, _)) => format!("terminated by signal {}", sig as i32),
        _ => "exit value 0".to_string(),
    }
}

pub struct Cd;

impl Builtin for Cd {
    fn execute(&self, args: &[String], _state: &mut ShellState) -> Result<i32, BuiltinError> {
        let target = match args.get(1) {
            Some(path) => path.clone(),
            None => match env::var("HOME") {
                Ok(home) => home,
                Err(_) => return Err(BuiltinError::General("HOME not set".to_string())),
            },
        };

        match env::set_current_dir(Path::new(&target)) {
            Ok(_) => Ok(0),
            Err(e) => {
                eprintln!("cd: {}: {}", target, e);
                Ok(1)
            }
        }
    }
}

pub struct Status;

impl Builtin for Status {
    fn execute(&self, _args: &[String], state: &mut ShellState) -> Result<i32, BuiltinError> {
        println!("{}", format_status(state.last_fg_status));
        Ok(0)
    }
}

pub struct Exit;

impl Builtin for Exit {
    /// Kills every still-running background job, reports each attempt, and
    /// ends the shell with status 0. Extra arguments are ignored.
    fn execute(&self, _args: &[String], state: &mut ShellState) -> Result<i32, BuiltinError> {
        for report in state.kill_all() {
            println!("Attempting to kill {}", report.pid);
            if report.killed {
                println!("Process {} was killed", report.pid);
            } else {
                println!("Process {} was not killed", report.pid);
            }
        }
        process::exit(0);
    }
}

pub fn get_builtin(name: &str) -> Option<Box<dyn Builtin>> {
    match name {
        "cd" => Some(Box::new(Cd)),
        "exit" => Some(Box::new(Exit)),
        "status" => Some(Box::new(Status)),
        _ => None,
    }
}
