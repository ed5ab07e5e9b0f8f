//! Process plumbing: child spawning and signal flags.

use std::ffi::CString;
use std::ptr::null;
use std::sync::atomic::{AtomicBool, Ordering};

/// Set by the signal handlers, consumed by the event loop.
static TERM_REQUESTED: AtomicBool = AtomicBool::new(false);
static HUP_REQUESTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_sigterm(_sig: libc::c_int) {
    TERM_REQUESTED.store(true, Ordering::SeqCst);
}

extern "C" fn on_sighup(_sig: libc::c_int) {
    HUP_REQUESTED.store(true, Ordering::SeqCst);
}

extern "C" fn on_sigchld(_sig: libc::c_int) {
    // Reap children inline; waitpid with WNOHANG is async-signal-safe.
    unsafe {
        while libc::waitpid(-1, std::ptr::null_mut(), libc::WNOHANG) > 0 {}
    }
}

/// Install the signal handlers and reap any zombies inherited at startup.
pub fn install_signal_handlers() {
    unsafe {
        libc::signal(
            libc::SIGCHLD,
            on_sigchld as extern "C" fn(libc::c_int) as libc::sighandler_t,
        );
        libc::signal(
            libc::SIGHUP,
            on_sighup as extern "C" fn(libc::c_int) as libc::sighandler_t,
        );
        libc::signal(
            libc::SIGTERM,
            on_sigterm as extern "C" fn(libc::c_int) as libc::sighandler_t,
        );
    }
    on_sigchld(0);
}

pub fn term_requested() -> bool {
    TERM_REQUESTED.swap(false, Ordering::SeqCst)
}

pub fn hup_requested() -> bool {
    HUP_REQUESTED.swap(false, Ordering::SeqCst)
}

/// Launch `argv` detached from the WM: fork, drop the X connection, start a
/// new session, exec. Exec failure is reported on the child's stderr.
pub fn spawn(argv: &[&str], display_fd: Option<i32>) {
    if argv.is_empty() {
        return;
    }
    let cstrings: Vec<CString> = argv
        .iter()
        .filter_map(|a| CString::new(*a).ok())
        .collect();
    if cstrings.len() != argv.len() {
        log::error!("spawn: argv contains NUL: {:?}", argv);
        return;
    }

    unsafe {
        if libc::fork() == 0 {
            if let Some(fd) = display_fd {
                libc::close(fd);
            }
            libc::setsid();
            let mut ptrs: Vec<*const libc::c_char> =
                cstrings.iter().map(|c| c.as_ptr()).collect();
            ptrs.push(null());
            libc::execvp(ptrs[0], ptrs.as_ptr());
            eprintln!("rawm: execvp {} failed", argv[0]);
            libc::_exit(0);
        }
    }
}
