// src/exec/terminate.rs

//! Graceful-then-forced child termination.
//!
//! Children spawned by this crate lead their own process group, so signals
//! go to the whole group: a shell wrapper and whatever it started stop
//! together. A child that is not a group leader is signalled alone.

use std::time::Duration;

use tokio::process::Child;
use tracing::{debug, info, warn};

/// How the child ended up stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The child had already exited; nothing was sent.
    AlreadyExited,
    /// The child exited within the grace period after the polite signal.
    Graceful,
    /// The grace period elapsed and the child was killed.
    Forced,
}

/// Stop `child`: send the graceful termination signal, wait up to `grace`,
/// then kill it.
///
/// Calling this on a child that already exited is a no-op and never errors.
pub async fn terminate(child: &mut Child, grace: Duration) -> Termination {
    if let Ok(Some(status)) = child.try_wait() {
        debug!(?status, "child already exited; nothing to terminate");
        return Termination::AlreadyExited;
    }

    if !send_graceful_signal(child) {
        // No signal could be delivered: the child is gone or the platform has
        // no graceful variant. Fall through to a direct kill.
        return force_kill(child).await;
    }

    match tokio::time::timeout(grace, child.wait()).await {
        Ok(Ok(status)) => {
            debug!(?status, "child exited after graceful signal");
            Termination::Graceful
        }
        Ok(Err(e)) => {
            warn!(error = %e, "waiting for terminated child failed");
            Termination::Graceful
        }
        Err(_) => {
            info!(
                grace_ms = grace.as_millis() as u64,
                "child ignored graceful signal; killing"
            );
            force_kill(child).await
        }
    }
}

/// Hand `child` to a background task that runs [`terminate`], so the caller
/// can resolve immediately. Must be called within a tokio runtime.
///
/// If the runtime shuts down first, `kill_on_drop` still kills the child.
pub fn terminate_in_background(child: Child, grace: Duration) {
    tokio::spawn(async move {
        let mut child = child;
        let pid = child.id();
        let how = terminate(&mut child, grace).await;
        debug!(?pid, termination = ?how, "background termination finished");
    });
}

async fn force_kill(child: &mut Child) -> Termination {
    kill_group(child);
    if let Err(e) = child.kill().await {
        // kill() on an already-reaped child reports InvalidInput; that is fine.
        debug!(error = %e, "kill after timeout failed; child likely gone");
        return Termination::AlreadyExited;
    }
    Termination::Forced
}

#[cfg(unix)]
fn send_graceful_signal(child: &Child) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::Signal;

    let Some(pid) = child.id() else {
        return false;
    };
    match signal_group(pid, Signal::SIGTERM) {
        Ok(()) => true,
        Err(Errno::ESRCH) => {
            debug!(pid, "child vanished before SIGTERM");
            false
        }
        Err(e) => {
            warn!(pid, error = %e, "SIGTERM failed");
            false
        }
    }
}

/// SIGKILL the rest of the group; the leader itself is killed and reaped by
/// `Child::kill`.
#[cfg(unix)]
fn kill_group(child: &Child) {
    use nix::sys::signal::Signal;

    if let Some(pid) = child.id() {
        if let Err(e) = signal_group(pid, Signal::SIGKILL) {
            debug!(pid, error = %e, "SIGKILL to process group failed");
        }
    }
}

/// Signal the group led by `pid`, or just `pid` when it leads no group.
#[cfg(unix)]
fn signal_group(pid: u32, signal: nix::sys::signal::Signal) -> nix::Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{kill, killpg};
    use nix::unistd::Pid;

    let pid = Pid::from_raw(pid as i32);
    match killpg(pid, signal) {
        Err(Errno::ESRCH) => kill(pid, signal),
        other => other,
    }
}

#[cfg(not(unix))]
fn send_graceful_signal(_child: &Child) -> bool {
    false
}

#[cfg(not(unix))]
fn kill_group(_child: &Child) {}
