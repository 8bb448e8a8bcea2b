use nix::unistd::getpid;
use orsh::{ShellState, execute, parse_line, signals};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// One prompt cycle: announce a pending mode change, reap finished
/// background jobs, prompt, read, parse, dispatch. Only the `exit` built-in
/// ever ends the process.
fn main() -> anyhow::Result<()> {
    signals::setup_shell_signals();

    let shell_pid = getpid();
    let mut state = ShellState::new();
    let mut rl = DefaultEditor::new()?;

    loop {
        if let Some(entering) = signals::take_mode_change() {
            if entering {
                println!("Entering foreground-only mode (& is now ignored)");
            } else {
                println!("Exiting foreground-only mode");
            }
        }

        // Completions are only ever announced here, between prompts, so
        // they never interleave with a half-typed line.
        for report in state.reap_jobs() {
            println!("{}", report);
        }

        let line = match rl.readline(":") {
            Ok(line) => line,
            // An interrupted or failed read re-enters the loop; the next
            // iteration picks up whatever the signal changed.
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => continue,
            Err(err) => {
                eprintln!("Error: {:?}", err);
                continue;
            }
        };

        let Some(cmd) = parse_line(&line, shell_pid, signals::foreground_only()) else {
            continue;
        };

        if let Err(e) = execute(&cmd, &mut state) {
            eprintln!("Error executing command: {}", e);
        }
    }
}
