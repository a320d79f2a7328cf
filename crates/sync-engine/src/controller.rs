// crates/sync-engine/src/controller.rs
//! Per-event orchestration of filter, identity, state reads and mutations

use crate::dispatcher::MutationDispatcher;
use crate::endpoint::RemoteEndpoint;
use crate::error::{SyncError, SyncResult};
use crate::filter::ExtensionFilter;
use crate::identity::PlaylistIdentity;
use crate::sequencer::ItemSequencer;
use crate::state::RemoteStateReader;
use crate::types::{EventReport, FileEvent, Operation, Outcome, PlaylistTarget};
use playsync_config::Config;
use playsync_network::{Client, ClientConfig};
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
enum Step {
    Remove(PlaylistTarget),
    Add(PlaylistTarget),
}

impl Step {
    fn target(&self) -> &PlaylistTarget {
        match self {
            Step::Remove(target) | Step::Add(target) => target,
        }
    }
}

struct Plan {
    report: EventReport,
    steps: Vec<Step>,
}

struct ControllerInner {
    filter: ExtensionFilter,
    reader: RemoteStateReader,
    dispatcher: MutationDispatcher,
    sequencer: ItemSequencer,
}

/// Turns file events into remote list mutations
///
/// Cheap to clone; clones share the same sequencing state.
#[derive(Clone)]
pub struct SyncController {
    inner: Arc<ControllerInner>,
}

impl SyncController {
    /// Builds a controller and its HTTP client from configuration
    pub fn new(config: &Config) -> SyncResult<Self> {
        let client_config = ClientConfig::default()
            .with_timeout(config.remote.request_timeout())
            .with_user_agent(config.remote.user_agent.clone());
        let client = Client::with_config(client_config)?;

        Ok(Self::with_client(config, client))
    }

    /// Builds a controller around an existing client
    pub fn with_client(config: &Config, client: Client) -> Self {
        let endpoint = RemoteEndpoint::new(config.remote_endpoint.as_str());

        Self {
            inner: Arc::new(ControllerInner {
                filter: ExtensionFilter::new(&config.supported_extensions),
                reader: RemoteStateReader::new(client.clone(), endpoint.clone()),
                dispatcher: MutationDispatcher::new(client, endpoint),
                sequencer: ItemSequencer::new(),
            }),
        }
    }

    pub fn filter(&self) -> &ExtensionFilter {
        &self.inner.filter
    }

    /// Schedules an event without waiting for it
    ///
    /// Returns `None` when the event needs no remote call. The event takes
    /// its place in line for each item it touches before this returns, so
    /// events on the same item run in the order they were handed in.
    pub fn handle(&self, event: FileEvent) -> Option<JoinHandle<EventReport>> {
        let plan = self.plan(event);
        if plan.steps.is_empty() {
            return None;
        }

        let targets: Vec<PlaylistTarget> =
            plan.steps.iter().map(|s| s.target().clone()).collect();
        let mut ticket = self.inner.sequencer.enqueue(&targets);
        let inner = Arc::clone(&self.inner);

        Some(tokio::spawn(async move {
            ticket.ready().await;
            let report = inner.execute(plan).await;
            drop(ticket);
            report
        }))
    }

    /// Handles an event to completion
    pub async fn process(&self, event: FileEvent) -> EventReport {
        let plan = self.plan(event);
        if plan.steps.is_empty() {
            return plan.report;
        }

        let targets: Vec<PlaylistTarget> =
            plan.steps.iter().map(|s| s.target().clone()).collect();
        let mut ticket = self.inner.sequencer.enqueue(&targets);
        ticket.ready().await;
        self.inner.execute(plan).await
    }

    fn plan(&self, event: FileEvent) -> Plan {
        let mut report = EventReport::new(event.clone());
        let mut steps = Vec::new();

        match &event {
            FileEvent::Created(path) | FileEvent::Modified(path) => {
                self.plan_half(path, Step::Add, &mut report, &mut steps);
            }
            FileEvent::Removed(path) => {
                self.plan_half(path, Step::Remove, &mut report, &mut steps);
            }
            FileEvent::Renamed { from, to } => {
                log::debug!("Rename {} -> {}", from.display(), to.display());
                self.plan_half(from, Step::Remove, &mut report, &mut steps);
                self.plan_half(to, Step::Add, &mut report, &mut steps);
            }
        }

        Plan { report, steps }
    }

    fn plan_half(
        &self,
        path: &Path,
        step: fn(PlaylistTarget) -> Step,
        report: &mut EventReport,
        steps: &mut Vec<Step>,
    ) {
        if !self.inner.filter.is_supported(path) {
            log::debug!("Ignoring unsupported file: {}", path.display());
            report.outcomes.push(Outcome::Skipped {
                path: path.to_path_buf(),
                reason: "unsupported extension".to_string(),
            });
            return;
        }

        match PlaylistIdentity::identify(path) {
            Ok(target) => steps.push(step(target)),
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                report.outcomes.push(Outcome::Skipped {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        }
    }
}

impl ControllerInner {
    async fn execute(&self, plan: Plan) -> EventReport {
        let Plan { mut report, steps } = plan;

        // Each half runs regardless of how the previous one ended
        for step in steps {
            let outcome = match step {
                Step::Add(target) => self.add(target).await,
                Step::Remove(target) => self.remove(target).await,
            };
            report.outcomes.push(outcome);
        }

        report
    }

    async fn add(&self, target: PlaylistTarget) -> Outcome {
        match self.dispatcher.add(&target).await {
            Ok(()) => Outcome::Added { target },
            Err(e) => failed(Operation::Add, target, e),
        }
    }

    async fn remove(&self, target: PlaylistTarget) -> Outcome {
        let Some(position) = self.reader.locate(&target).await else {
            log::info!("File not found in list \"{}\": {}", target.bucket, target.item);
            return Outcome::NotFound { target };
        };

        match self.dispatcher.remove(&target.bucket, position).await {
            Ok(()) => Outcome::Removed { target, position },
            Err(e) => failed(Operation::Remove, target, e),
        }
    }
}

fn failed(operation: Operation, target: PlaylistTarget, error: SyncError) -> Outcome {
    Outcome::Failed {
        operation,
        target,
        error: error.to_string(),
    }
}
