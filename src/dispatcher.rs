//! Room dispatcher actor
//!
//! The single owner of room membership. Sessions submit events through a
//! cloneable `DispatcherHandle`; the `RoomDispatcher` loop applies them one
//! at a time and queues a report for each to a pool of report workers.
//!
//! # Ordering
//! - Events within one queue (messages, joins, leaves) are applied in
//!   submission order.
//! - Nothing orders events across queues; when several are ready the loop
//!   picks one at random.
//! - Reports are recorded by a fixed pool of workers and may reach the sink
//!   in any order, including out of order within a single queue. Use
//!   `Report::seq` to recover the order in which events were applied.
//!
//! # Report backlog
//! Reports wait in a bounded queue of `report_queue_capacity`. When a slow
//! sink lets it fill up, new reports are dropped with a warning on the
//! `chat_registry::report` target instead of piling up in memory.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::config::DispatcherConfig;
use crate::error::{ConfigError, SubmitError};
use crate::message::{ChatMessage, EventKind, Report};
use crate::report::ReportSink;
use crate::room::RoomMembership;

/// Submitting side of the room dispatcher
///
/// Cheap to clone; give one to every session. Submissions never block:
/// a full queue is reported back as `SubmitError::QueueFull` and the caller
/// decides whether to retry. Usable from async tasks and plain threads.
#[derive(Debug, Clone)]
pub struct DispatcherHandle {
    messages: mpsc::Sender<ChatMessage>,
    joins: mpsc::Sender<String>,
    leaves: mpsc::Sender<String>,
}

impl DispatcherHandle {
    /// Send a chat message, stamped with the current time
    pub fn submit_message(
        &self,
        sender: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<(), SubmitError> {
        self.messages
            .try_send(ChatMessage::new(sender, body))
            .map_err(|e| submit_error(EventKind::Message, e))
    }

    /// Ask for a user to be added to the room
    pub fn submit_join(&self, username: impl Into<String>) -> Result<(), SubmitError> {
        self.joins
            .try_send(username.into())
            .map_err(|e| submit_error(EventKind::Join, e))
    }

    /// Ask for a user to be removed from the room
    pub fn submit_leave(&self, username: impl Into<String>) -> Result<(), SubmitError> {
        self.leaves
            .try_send(username.into())
            .map_err(|e| submit_error(EventKind::Leave, e))
    }
}

fn submit_error<T>(kind: EventKind, err: TrySendError<T>) -> SubmitError {
    match err {
        TrySendError::Full(_) => SubmitError::QueueFull { kind },
        TrySendError::Closed(_) => SubmitError::Closed { kind },
    }
}

/// The room dispatcher actor
///
/// Owns the membership set outright, so no lock guards it. Runs until every
/// `DispatcherHandle` has been dropped, then lets the report workers finish
/// the buffered reports and returns the final membership.
pub struct RoomDispatcher {
    membership: RoomMembership,
    messages: mpsc::Receiver<ChatMessage>,
    joins: mpsc::Receiver<String>,
    leaves: mpsc::Receiver<String>,
    sink: Arc<dyn ReportSink>,
    /// Bounded queue between the loop and the report workers
    report_tx: mpsc::Sender<Report>,
    /// Handed to the workers when the loop starts
    report_rx: Option<mpsc::Receiver<Report>>,
    report_workers: usize,
    dropped_reports: u64,
    next_seq: u64,
}

impl RoomDispatcher {
    /// Create the inbound queues without starting the loop
    ///
    /// Each queue holds up to `config.queue_capacity` events independently.
    pub fn channel(
        config: &DispatcherConfig,
        sink: Arc<dyn ReportSink>,
    ) -> Result<(DispatcherHandle, Self), ConfigError> {
        config.validate()?;

        let (message_tx, message_rx) = mpsc::channel(config.queue_capacity);
        let (join_tx, join_rx) = mpsc::channel(config.queue_capacity);
        let (leave_tx, leave_rx) = mpsc::channel(config.queue_capacity);
        let (report_tx, report_rx) = mpsc::channel(config.report_queue_capacity);

        let handle = DispatcherHandle {
            messages: message_tx,
            joins: join_tx,
            leaves: leave_tx,
        };
        let dispatcher = Self {
            membership: RoomMembership::new(),
            messages: message_rx,
            joins: join_rx,
            leaves: leave_rx,
            sink,
            report_tx,
            report_rx: Some(report_rx),
            report_workers: config.max_concurrent_reports,
            dropped_reports: 0,
            next_seq: 0,
        };
        Ok((handle, dispatcher))
    }

    /// Run the dispatcher event loop
    ///
    /// Returns once all handles are gone, the queues are drained and the
    /// report workers have recorded everything still buffered.
    pub async fn run(mut self) -> RoomMembership {
        info!(workers = self.report_workers, "Room dispatcher started");

        let mut workers = JoinSet::new();
        if let Some(receiver) = self.report_rx.take() {
            let receiver = Arc::new(Mutex::new(receiver));
            for _ in 0..self.report_workers {
                workers.spawn(report_worker(
                    Arc::clone(&receiver),
                    Arc::clone(&self.sink),
                ));
            }
        }

        loop {
            tokio::select! {
                Some(message) = self.messages.recv() => self.handle_message(message),
                Some(username) = self.joins.recv() => self.handle_join(username),
                Some(username) = self.leaves.recv() => self.handle_leave(username),
                else => break,
            }
        }

        let RoomDispatcher {
            membership,
            report_tx,
            dropped_reports,
            next_seq,
            ..
        } = self;

        // Closing the report queue stops the workers once it is empty
        drop(report_tx);
        while let Some(result) = workers.join_next().await {
            report_finished(result);
        }

        info!(
            members = membership.len(),
            processed = next_seq,
            dropped_reports,
            "Room dispatcher shutting down"
        );
        membership
    }

    fn handle_message(&mut self, message: ChatMessage) {
        debug!("Message from {}", message.sender());
        let report = Report::Message {
            seq: self.take_seq(),
            at: message.sent_at(),
            sender: message.sender().to_string(),
            body: message.body().to_string(),
        };
        self.dispatch_report(report);
    }

    fn handle_join(&mut self, username: String) {
        let changed = self.membership.join(&username);
        if !changed {
            debug!("{} joined again while already present", username);
        }
        let report = Report::Join {
            seq: self.take_seq(),
            username,
            changed,
            members: self.membership.len(),
            at: Utc::now(),
        };
        self.dispatch_report(report);
    }

    fn handle_leave(&mut self, username: String) {
        let changed = self.membership.leave(&username);
        if !changed {
            debug!("{} left without being present", username);
        }
        let report = Report::Leave {
            seq: self.take_seq(),
            username,
            changed,
            members: self.membership.len(),
            at: Utc::now(),
        };
        self.dispatch_report(report);
    }

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Queue a report for the workers without waiting
    ///
    /// A full report queue drops the report with a warning; the room state
    /// has already been updated either way.
    fn dispatch_report(&mut self, report: Report) {
        match self.report_tx.try_send(report) {
            Ok(()) => {}
            Err(TrySendError::Full(report)) => {
                self.dropped_reports += 1;
                warn!(
                    target: "chat_registry::report",
                    seq = report.seq(),
                    kind = %report.kind(),
                    dropped = self.dropped_reports,
                    "Report queue full, dropping report: {}",
                    report
                );
            }
            Err(TrySendError::Closed(report)) => {
                self.dropped_reports += 1;
                warn!(
                    target: "chat_registry::report",
                    seq = report.seq(),
                    kind = %report.kind(),
                    "No report workers left, dropping report: {}",
                    report
                );
            }
        }
    }
}

/// Record reports from the shared queue until it is closed and empty
async fn report_worker(queue: Arc<Mutex<mpsc::Receiver<Report>>>, sink: Arc<dyn ReportSink>) {
    loop {
        // The lock covers the receive only; recording runs unlocked
        let next = queue.lock().await.recv().await;
        let Some(report) = next else {
            break;
        };
        if let Err(e) = sink.record(&report).await {
            warn!(
                target: "chat_registry::report",
                seq = report.seq(),
                kind = %report.kind(),
                "Failed to record report: {}",
                e
            );
        }
    }
}

fn report_finished(result: Result<(), JoinError>) {
    if let Err(e) = result {
        warn!(target: "chat_registry::report", "Report worker failed: {}", e);
    }
}

/// Create a room dispatcher and start its loop on the current runtime
///
/// Must be called from within a tokio runtime. The join handle resolves to
/// the final membership once every `DispatcherHandle` has been dropped.
pub fn spawn_dispatcher(
    config: &DispatcherConfig,
    sink: Arc<dyn ReportSink>,
) -> Result<(DispatcherHandle, JoinHandle<RoomMembership>), ConfigError> {
    let (handle, dispatcher) = RoomDispatcher::channel(config, sink)?;
    Ok((handle, tokio::spawn(dispatcher.run())))
}
