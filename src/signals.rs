use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};
use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide foreground-only mode flag, flipped by the SIGTSTP handler.
static FOREGROUND_ONLY: AtomicBool = AtomicBool::new(false);

/// Set by the SIGTSTP handler, consumed once by the main loop so the mode
/// banner prints exactly once per toggle.
static MODE_CHANGED: AtomicBool = AtomicBool::new(false);

/// SIGTSTP handler for the shell process. Flips the mode flag and records
/// that it changed; no I/O and no allocation, those happen in the main loop
/// where it is safe.
extern "C" fn handle_sigtstp(_signo: libc::c_int) {
    FOREGROUND_ONLY.fetch_xor(true, Ordering::SeqCst);
    MODE_CHANGED.store(true, Ordering::SeqCst);
}

/// Whether `&` requests are currently being ignored.
pub fn foreground_only() -> bool {
    FOREGROUND_ONLY.load(Ordering::SeqCst)
}

/// Consume a pending mode change. Returns the mode that is now in effect,
/// or `None` if SIGTSTP has not fired since the last call.
pub fn take_mode_change() -> Option<bool> {
    if MODE_CHANGED.swap(false, Ordering::SeqCst) {
        Some(foreground_only())
    } else {
        None
    }
}

/// Setup signal handlers for the shell process itself.
/// Called once at startup before the REPL loop.
///
/// The shell ignores SIGINT so that Ctrl-C only affects foreground child
/// processes. SIGTSTP toggles foreground-only mode instead of stopping the
/// shell; all other signals are blocked while the handler runs.
pub fn setup_shell_signals() {
    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
    let toggle = SigAction::new(
        SigHandler::Handler(handle_sigtstp),
        SaFlags::empty(),
        SigSet::all(),
    );

    unsafe {
        let _ = sigaction(Signal::SIGINT, &ignore);
        let _ = sigaction(Signal::SIGTSTP, &toggle);
    }
}

/// Set signal dispositions in a child process after fork(), before exec().
///
/// Every child ignores SIGTSTP: stop requests only ever change the parent's
/// mode. A foreground child gets the default SIGINT disposition back so
/// Ctrl-C can kill it; a background child ignores SIGINT too.
pub fn setup_child_signals(background: bool) {
    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
    let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());

    unsafe {
        let _ = sigaction(Signal::SIGTSTP, &ignore);
        if background {
            let _ = sigaction(Signal::SIGINT, &ignore);
        } else {
            let _ = sigaction(Signal::SIGINT, &default);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn reset() {
        FOREGROUND_ONLY.store(false, Ordering::SeqCst);
        MODE_CHANGED.store(false, Ordering::SeqCst);
    }

    #[test]
    #[serial]
    fn test_mode_toggles_on_each_delivery() {
        reset();
        assert!(!foreground_only());

        handle_sigtstp(libc::SIGTSTP);
        assert!(foreground_only());

        handle_sigtstp(libc::SIGTSTP);
        assert!(!foreground_only());
    }

    #[test]
    #[serial]
    fn test_mode_change_consumed_once() {
        reset();
        assert_eq!(take_mode_change(), None);

        handle_sigtstp(libc::SIGTSTP);
        assert_eq!(take_mode_change(), Some(true));
        assert_eq!(take_mode_change(), None);

        handle_sigtstp(libc::SIGTSTP);
        assert_eq!(take_mode_change(), Some(false));
        assert_eq!(take_mode_change(), None);
    }
}
