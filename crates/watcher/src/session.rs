// crates/watcher/src/session.rs
//! A running watch-and-sync session

use crate::aggregator::{RootEvent, WatchRootAggregator};
use crate::error::WatchResult;
use crate::scan::scan_roots;
use crate::settle::SettleTracker;
use log::{debug, info, warn};
use playsync_config::{Config, WatchConfig};
use playsync_sync_engine::{FileEvent, SyncController};
use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const CHANNEL_BUFFER_SIZE: usize = 100;

/// Entry point for watching folders and mirroring them remotely
pub struct SyncSession;

impl SyncSession {
    /// Starts watching every configured root
    ///
    /// Must be called from within a tokio runtime. Roots that cannot be
    /// watched yet are retried on every poll tick, so the session starts
    /// even when none of them exist.
    pub fn start(config: &Config) -> WatchResult<SessionHandle> {
        let controller = SyncController::new(config)?;
        Ok(Self::start_with_controller(config, controller))
    }

    /// Starts a session around an existing controller
    pub fn start_with_controller(config: &Config, controller: SyncController) -> SessionHandle {
        log_banner(config);

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let aggregator = WatchRootAggregator::start(&config.roots(), &config.watch, tx);
        let (watched_tx, watched_rx) = watch::channel(aggregator.roots());

        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(run_session(
            aggregator,
            watched_tx,
            config.watch.clone(),
            controller,
            rx,
            stop_rx,
        ));

        SessionHandle {
            watched: watched_rx,
            stop_tx: Some(stop_tx),
            task: Some(task),
        }
    }
}

/// Handle to a running session
///
/// Dropping the handle stops watching without waiting for the session task.
pub struct SessionHandle {
    watched: watch::Receiver<Vec<PathBuf>>,
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SessionHandle {
    /// Roots being watched right now, canonicalized
    ///
    /// Grows as pending roots appear and shrinks when a root is deleted.
    pub fn roots(&self) -> Vec<PathBuf> {
        self.watched.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stops watching and waits for the session task to end
    ///
    /// Remote calls already in flight are left to finish on their own.
    pub async fn stop(mut self) -> WatchResult<()> {
        self.release();

        if let Some(task) = self.task.take() {
            task.await?;
        }

        info!("Watch session stopped");
        Ok(())
    }

    fn release(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.release();
    }
}

async fn run_session(
    mut aggregator: WatchRootAggregator,
    watched: watch::Sender<Vec<PathBuf>>,
    options: WatchConfig,
    controller: SyncController,
    mut rx: mpsc::Receiver<RootEvent>,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let mut settle = SettleTracker::new(options.stability_threshold());
    let mut ticker = tokio::time::interval(options.poll_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    if options.initial_scan {
        scan_into(aggregator.roots(), &options, &controller, &mut settle).await;
    }

    loop {
        tokio::select! {
            _ = &mut stop_rx => break,
            received = rx.recv() => match received {
                Some(root_event) => {
                    if is_root_removal(&root_event) && aggregator.root_removed(&root_event.root) {
                        watched.send_replace(aggregator.roots());
                    } else if !is_relevant(&controller, &root_event.event) {
                        dispatch(&controller, root_event);
                    } else if let Some(ready) = settle.observe(root_event, Instant::now()) {
                        dispatch(&controller, ready);
                    }
                }
                None => break,
            },
            _ = ticker.tick(), if settle.pending() > 0 || aggregator.has_pending() => {
                if aggregator.has_pending() {
                    let started = aggregator.retry_pending();
                    if !started.is_empty() {
                        watched.send_replace(aggregator.roots());
                        if options.initial_scan {
                            scan_into(started, &options, &controller, &mut settle).await;
                        }
                    }
                }
                for ready in settle.poll(Instant::now()) {
                    dispatch(&controller, ready);
                }
            }
        }
    }

    aggregator.stop();
    if settle.pending() > 0 {
        debug!("Discarding {} unsettled file(s)", settle.pending());
    }
}

/// Feeds the supported files already under `roots` into the settle stage
async fn scan_into(
    roots: Vec<PathBuf>,
    options: &WatchConfig,
    controller: &SyncController,
    settle: &mut SettleTracker,
) {
    let filter = controller.filter().clone();
    let scan_options = options.clone();
    match tokio::task::spawn_blocking(move || scan_roots(&roots, &filter, &scan_options)).await {
        Ok(found) => {
            let now = Instant::now();
            for root_event in found {
                if let Some(ready) = settle.observe(root_event, now) {
                    dispatch(controller, ready);
                }
            }
        }
        Err(e) => warn!("Folder scan failed: {}", e),
    }
}

/// The watched directory itself was deleted or moved away
fn is_root_removal(root_event: &RootEvent) -> bool {
    matches!(&root_event.event, FileEvent::Removed(path) if path == &root_event.root)
}

/// Events with no supported path skip the settle stage
fn is_relevant(controller: &SyncController, event: &FileEvent) -> bool {
    event
        .paths()
        .into_iter()
        .any(|p| controller.filter().is_supported(p))
}

fn dispatch(controller: &SyncController, root_event: RootEvent) {
    debug!(
        "Dispatching {} from {}",
        root_event.event,
        root_event.root.display()
    );
    // The spawned pipeline logs its own results
    let _ = controller.handle(root_event.event);
}

fn log_banner(config: &Config) {
    info!("Remote endpoint: {}", config.remote_endpoint);
    info!(
        "Supported extensions: {}",
        config.supported_extensions.join(", ")
    );
    for root in config.roots() {
        info!("Watch root: {}", root.display());
    }
    debug!(
        "Settle window {:?}, poll interval {:?}",
        config.watch.stability_threshold(),
        config.watch.poll_interval()
    );
}
