//! Runs the generation command while watching for cancellation

use std::io;
use std::process::ExitStatus;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};

/// Time a cancelled command gets to exit on its own before it is killed
const CANCEL_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug)]
pub enum ChildExit {
    Exited(ExitStatus),
    /// diffpress was interrupted or terminated; holds the exit code to use
    Cancelled(u8),
}

/// Signal listeners on a private current-thread runtime.
///
/// Once created, SIGINT and SIGTERM no longer terminate the process; they
/// are reported by [`ChildRunner::run`] as [`ChildExit::Cancelled`].
pub struct ChildRunner {
    runtime: Runtime,
    cancel: Cancellation,
}

impl ChildRunner {
    pub fn new() -> io::Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let cancel = {
            let _guard = runtime.enter();
            Cancellation::install()?
        };
        Ok(Self { runtime, cancel })
    }

    /// Run `program` and wait for it to exit or for diffpress to be cancelled
    pub fn run(&mut self, program: &str, args: &[String]) -> io::Result<ChildExit> {
        let Self { runtime, cancel } = self;
        runtime.block_on(async {
            let mut child = tokio::process::Command::new(program).args(args).spawn()?;

            let code = tokio::select! {
                status = child.wait() => return Ok(ChildExit::Exited(status?)),
                code = cancel.recv() => code,
            };

            tracing::info!(program, code, "cancelled, waiting for command to exit");
            if tokio::time::timeout(CANCEL_GRACE, child.wait()).await.is_err() {
                if let Err(e) = child.kill().await {
                    tracing::warn!(program, "failed to kill command: {}", e);
                }
            }
            Ok::<_, io::Error>(ChildExit::Cancelled(code))
        })
    }
}

#[cfg(unix)]
struct Cancellation {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Cancellation {
    fn install() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    /// Shell-style exit code (128 + signal number) of the first signal
    async fn recv(&mut self) -> u8 {
        tokio::select! {
            _ = self.interrupt.recv() => 130,
            _ = self.terminate.recv() => 143,
        }
    }
}

#[cfg(not(unix))]
struct Cancellation;

#[cfg(not(unix))]
impl Cancellation {
    fn install() -> io::Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> u8 {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
        130
    }
}

/// Signals reach every listener in the process; tests that create a
/// [`ChildRunner`] hold this while they run.
#[cfg(test)]
pub(crate) fn runner_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(|e| e.into_inner())
}
