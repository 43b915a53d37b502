//! Heartbeat logger with signal-driven rotation.
//!
//! Every tick emits an `info` event, which the subscriber formats into the
//! sink. SIGHUP (unix only) rotates the sink; Ctrl-C closes it and exits.

use rotalog_core::RotatingFileSink;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Options for the `run` command.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Time between heartbeats.
    pub interval: Duration,
    /// Rotate after this many heartbeats, if set.
    pub rotate_every: Option<u64>,
    /// Stop after this many heartbeats, if set.
    pub count: Option<u64>,
}

/// Runs the heartbeat loop until Ctrl-C or the configured count.
pub fn run(sink: Arc<RotatingFileSink>, options: &RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(heartbeat_loop(Arc::clone(&sink), options))?;

    sink.close()?;
    info!("Closed {:?}", sink.path());
    Ok(())
}

async fn heartbeat_loop(
    sink: Arc<RotatingFileSink>,
    options: &RunOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        path = %sink.path().display(),
        retention = sink.retention(),
        "Logging heartbeats; send SIGHUP to rotate"
    );

    let mut ticker = tokio::time::interval(options.interval);
    let mut hangup = Hangup::new()?;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut beats: u64 = 0;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                beats += 1;
                info!(beat = beats, "heartbeat");

                if options.rotate_every.is_some_and(|n| n > 0 && beats % n == 0) {
                    rotate(&sink, "schedule").await?;
                }
                if options.count.is_some_and(|n| beats >= n) {
                    break;
                }
            }
            Some(()) = hangup.recv() => {
                rotate(&sink, "SIGHUP").await?;
            }
            result = &mut shutdown => {
                result?;
                info!("Shutting down");
                break;
            }
        }
    }

    Ok(())
}

/// Rotates on the blocking pool; a failed rotation is logged, not fatal.
async fn rotate(sink: &Arc<RotatingFileSink>, reason: &str) -> Result<(), Box<dyn std::error::Error>> {
    let sink = Arc::clone(sink);
    let result = tokio::task::spawn_blocking(move || {
        let mut archived: Option<PathBuf> = None;
        sink.rotate_with(|path| archived = path.map(Path::to_path_buf))
            .map(|()| archived)
    })
    .await?;

    match result {
        Ok(archived) => info!(reason, archived = ?archived, "Rotated log file"),
        Err(e) => error!(reason, error = %e, "Log rotation failed"),
    }
    Ok(())
}

/// SIGHUP listener.
#[cfg(unix)]
struct Hangup(tokio::signal::unix::Signal);

#[cfg(unix)]
impl Hangup {
    fn new() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};
        Ok(Self(signal(SignalKind::hangup())?))
    }

    async fn recv(&mut self) -> Option<()> {
        self.0.recv().await
    }
}

/// No SIGHUP off unix; rotation is only scheduled.
#[cfg(not(unix))]
struct Hangup;

#[cfg(not(unix))]
impl Hangup {
    fn new() -> io::Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> Option<()> {
        std::future::pending().await
    }
}
