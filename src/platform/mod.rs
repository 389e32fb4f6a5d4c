//! OS-specific process primitives
//!
//! Unix talks to the kernel directly through libc; other platforms go through
//! sysinfo.

#[cfg(unix)]
mod unix;

use crate::error::{errors, TpmResult};

/// Attempt to terminate `pid` once.
pub fn terminate(pid: u32, force: bool) -> TpmResult<()> {
    #[cfg(unix)]
    {
        unix::terminate_process(pid, force).map_err(|err| {
            let message = match err.raw_os_error() {
                Some(code) if code == libc::ESRCH => "no such process".to_string(),
                Some(code) if code == libc::EPERM => "permission denied".to_string(),
                _ => err.to_string(),
            };
            errors::process_error(Some(pid), message)
        })
    }

    #[cfg(not(unix))]
    {
        use sysinfo::{Pid, ProcessesToUpdate, Signal, System};

        let mut system = System::new();
        let target = Pid::from_u32(pid);
        system.refresh_processes(ProcessesToUpdate::Some(&[target]), true);
        let process = system
            .process(target)
            .ok_or_else(|| errors::process_error(Some(pid), "no such process"))?;
        let delivered = if force {
            process.kill()
        } else {
            process.kill_with(Signal::Term).unwrap_or_else(|| process.kill())
        };
        if delivered {
            Ok(())
        } else {
            Err(errors::process_error(Some(pid), "termination was refused"))
        }
    }
}

/// Nice value; platforms without the concept report 0.
pub fn nice_value(pid: u32) -> i32 {
    #[cfg(unix)]
    {
        unix::nice_value(pid)
    }
    #[cfg(not(unix))]
    {
        let _ = pid;
        0
    }
}
