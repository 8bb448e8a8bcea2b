use crate::ast::Command;
use crate::builtins::get_builtin;
use crate::signals;
use crate::state::ShellState;
use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, execvp, fork};
use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::os::fd::IntoRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::process::exit;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("Execution error: {0}")]
    General(String),
    #[error("Nix error: {0}")]
    Nix(#[from] nix::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Point stdin at `path`, opened read-only.
fn redirect_input(path: &str) -> std::io::Result<()> {
    let fd = File::open(path)?.into_raw_fd();
    let result = unsafe { libc::dup2(fd, libc::STDIN_FILENO) };
    unsafe { libc::close(fd) };
    if result == -1 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

/// Point stdout at `path`, created 0644 or truncated.
fn redirect_output(path: &str) -> std::io::Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o644)
        .open(path)?;
    let fd = file.into_raw_fd();
    let result = unsafe { libc::dup2(fd, libc::STDOUT_FILENO) };
    unsafe { libc::close(fd) };
    if result == -1 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

fn redirect_or_die(result: std::io::Result<()>, path: &str) {
    if let Err(e) = result {
        eprintln!("{}: {}", path, e);
        exit(1);
    }
}

/// Runs in the forked child, never returns. Sets signal dispositions, wires
/// up redirection, then replaces the process image with the requested
/// program. Exec failure is the only way back, and it ends the child.
fn run_child(cmd: &Command) -> ! {
    signals::setup_child_signals(cmd.background);

    if let Some(path) = &cmd.input {
        redirect_or_die(redirect_input(path), path);
    } else if cmd.background {
        // Background children never read the terminal.
        redirect_or_die(redirect_input("/dev/null"), "/dev/null");
    }
    if let Some(path) = &cmd.output {
        redirect_or_die(redirect_output(path), path);
    } else if cmd.background {
        redirect_or_die(redirect_output("/dev/null"), "/dev/null");
    }

    let c_program = CString::new(cmd.program()).unwrap();
    let c_args: Vec<CString> = cmd
        .args
        .iter()
        .map(|arg| CString::new(arg.clone()).unwrap())
        .collect();

    // execvp only returns on failure.
    if let Err(e) = execvp(&c_program, &c_args) {
        eprintln!("{}: {}", cmd.program(), e);
    }
    exit(1);
}

/// Dispatch one parsed command: built-ins run in-process, everything else
/// forks. Foreground children are waited on and their status recorded;
/// background children are announced and handed to the job table.
pub fn execute(cmd: &Command, state: &mut ShellState) -> Result<i32, ExecError> {
    if let Some(builtin) = get_builtin(cmd.program()) {
        // Built-ins ignore redirection and `&`, as the reference shell did.
        return builtin
            .execute(&cmd.args, state)
            .map_err(|e| ExecError::General(e.to_string()));
    }

    match unsafe { fork() } {
        Ok(ForkResult::Child) => run_child(cmd),
        Ok(ForkResult::Parent { child, .. }) => {
            if cmd.background {
                println!("PID {} started in background", child);
                state.add_job(child);
                return Ok(0);
            }

            let status = loop {
                match waitpid(child, None) {
                    Err(Errno::EINTR) => continue,
                    other => break other?,
                }
            };
            state.last_fg_status = Some(status);

            match status {
                WaitStatus::Exited(_, code) => Ok(code),
                WaitStatus::Signaled(_, sig, _) => {
                    if sig == Signal::SIGINT {
                        println!("terminated by signal 2");
                    }
                    Ok(128 + sig as i32)
                }
                _ => Ok(0),
            }
        }
        Err(e) => {
            // No child was created; nothing to recover into.
            eprintln!("fork: {}", e);
            exit(1);
        }
    }
}
