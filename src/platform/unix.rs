use std::io;

use tracing::debug;

/// Send SIGTERM (or SIGKILL when `force`) once. No escalation, no retry.
pub fn terminate_process(pid: u32, force: bool) -> io::Result<()> {
    let signal = if force { libc::SIGKILL } else { libc::SIGTERM };
    send_signal(pid as libc::pid_t, signal)?;
    debug!(pid, signal, "signal delivered");
    Ok(())
}

/// Scheduling priority of `pid`, or 0 when it cannot be read.
pub fn nice_value(pid: u32) -> i32 {
    // getpriority may legitimately return -1, so errno has to be cleared and
    // checked instead of trusting the return value.
    clear_errno();
    let value = unsafe { libc::getpriority(libc::PRIO_PROCESS, pid as libc::id_t) };
    if value == -1 && io::Error::last_os_error().raw_os_error().unwrap_or(0) != 0 {
        return 0;
    }
    value
}

/// Safely send signal
///
/// Encapsulates unsafe kill call and returns Result instead of raw error code
fn send_signal(pid: libc::pid_t, signal: libc::c_int) -> io::Result<()> {
    if pid <= 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("refusing to signal pid {pid}"),
        ));
    }
    let result = unsafe { libc::kill(pid, signal) };
    if result == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

fn clear_errno() {
    #[cfg(any(target_os = "linux", target_os = "android"))]
    unsafe {
        *libc::__errno_location() = 0;
    }

    #[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
    unsafe {
        *libc::__error() = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pid_zero_is_never_signalled() {
        let err = terminate_process(0, false).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn own_nice_value_is_readable() {
        let nice = nice_value(std::process::id());
        assert!((-20..=19).contains(&nice));
    }
}
