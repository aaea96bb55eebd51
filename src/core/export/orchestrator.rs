//! Export orchestrator
//!
//! Drives one run: discover the log groups, wait for the provider's single export
//! slot, pick the next unit, submit its export task, record progress and repeat
//! until nothing is left to export.
//!
//! ```text
//! DISCOVER -> GATE_CHECK <-> WAIT
//!                 |
//!               SELECT -> SUBMIT -> PERSIST -> GATE_CHECK
//!                 |
//!                DONE
//! ```

use crate::adapters::cloudwatch::{
    CloudWatchClients, CloudWatchEnumerator, CloudWatchExportDriver, CloudWatchQuotaGate, LogsApi,
};
use crate::adapters::notify::{FailureNotice, FailureNotifier, SnsNotifier};
use crate::adapters::provider::{ExportDriver, QuotaGate, WorkEnumerator};
use crate::adapters::store::create_progress_storage;
use crate::config::ArchivistConfig;
use crate::core::export::summary::{RunError, RunErrorType, RunPhase, RunSummary, UnitOutcome};
use crate::core::export::window::ExportWindow;
use crate::core::state::record::ExportStatus;
use crate::core::state::ProgressManager;
use crate::domain::{
    ArchivistError, ExportDestination, ExportUnit, JobHandle, JobState, Region, Result,
    SubmitError,
};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use uuid::Uuid;

/// Per-run settings resolved from configuration
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Pause between gate checks and between job status polls
    pub poll_interval: Duration,

    /// Wall-clock budget for the whole run
    pub run_timeout: Duration,

    /// Destination bucket per region
    pub buckets: HashMap<Region, String>,

    /// Key prefix under which exports are written
    pub destination_prefix: String,

    /// Time range exported for every unit
    pub window: ExportWindow,
}

impl RunSettings {
    /// Resolve settings from configuration, anchoring the export window at `now`
    pub fn from_config(config: &ArchivistConfig, now: DateTime<Utc>) -> Result<Self> {
        let mut buckets = HashMap::new();
        for entry in &config.regions {
            let region = Region::from_str(&entry.region).map_err(ArchivistError::Configuration)?;
            buckets.insert(region, entry.bucket.clone());
        }

        let window = ExportWindow::resolve(
            now,
            config.export.window_days,
            config
                .export
                .window_start_time()
                .map_err(ArchivistError::Configuration)?,
            config
                .export
                .window_end_time()
                .map_err(ArchivistError::Configuration)?,
        )?;

        Ok(Self {
            poll_interval: Duration::from_secs(config.orchestrator.poll_interval_seconds),
            run_timeout: Duration::from_secs(config.orchestrator.run_timeout_seconds),
            buckets,
            destination_prefix: config.export.destination_prefix.clone(),
            window,
        })
    }
}

/// In-memory view of one run's work list
///
/// Lives for a single run. A fresh run re-enumerates and reads the progress store
/// instead of resuming a cursor.
#[derive(Debug, Default)]
pub struct RunCursor {
    /// Enumerated units, in enumerator order
    pub units: Vec<ExportUnit>,

    /// Units whose export failed during this run
    pub failed: HashSet<ExportUnit>,
}

#[derive(Debug)]
enum Step {
    Discover,
    GateCheck,
    Wait,
    Select,
    Submit(ExportUnit),
    Persist(ExportUnit, JobHandle),
    Done,
}

impl Step {
    fn phase(&self) -> RunPhase {
        match self {
            Step::Discover => RunPhase::Discover,
            Step::GateCheck => RunPhase::GateCheck,
            Step::Wait => RunPhase::Wait,
            Step::Select => RunPhase::Select,
            Step::Submit(_) => RunPhase::Submit,
            Step::Persist(_, _) => RunPhase::Persist,
            Step::Done => RunPhase::Done,
        }
    }
}

/// How a tracked export task ended
enum JobOutcome {
    Finished(JobState),
    Missing,
}

impl JobOutcome {
    fn status_label(&self) -> &'static str {
        match self {
            JobOutcome::Finished(state) => state.as_str(),
            JobOutcome::Missing => "NOT_FOUND",
        }
    }

    /// Error text stored on the record
    fn failure_reason(&self) -> &'static str {
        match self {
            JobOutcome::Finished(state) => state.as_str(),
            JobOutcome::Missing => "export task not found",
        }
    }
}

/// Export orchestrator
pub struct Orchestrator {
    enumerator: Arc<dyn WorkEnumerator>,
    gate: Arc<dyn QuotaGate>,
    driver: Arc<dyn ExportDriver>,
    progress: Arc<ProgressManager>,
    settings: RunSettings,
    shutdown: watch::Receiver<bool>,
    notifier: Option<Arc<dyn FailureNotifier>>,
}

impl Orchestrator {
    /// Create an orchestrator from its collaborators
    pub fn new(
        enumerator: Arc<dyn WorkEnumerator>,
        gate: Arc<dyn QuotaGate>,
        driver: Arc<dyn ExportDriver>,
        progress: Arc<ProgressManager>,
        settings: RunSettings,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            enumerator,
            gate,
            driver,
            progress,
            settings,
            shutdown,
            notifier: None,
        }
    }

    /// Send failed-export and aborted-run notices to `notifier`
    pub fn with_notifier(mut self, notifier: Arc<dyn FailureNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Create an orchestrator backed by CloudWatch Logs and the configured store
    pub async fn from_config(
        config: &ArchivistConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self> {
        let settings = RunSettings::from_config(config, Utc::now())?;

        let regions: Vec<Region> = config
            .regions
            .iter()
            .map(|r| Region::from_str(&r.region).map_err(ArchivistError::Configuration))
            .collect::<Result<_>>()?;

        let api: Arc<dyn LogsApi> = Arc::new(CloudWatchClients::connect(&regions).await);
        let enumerator = CloudWatchEnumerator::new(api.clone(), regions.clone(), &config.export);
        let gate = CloudWatchQuotaGate::new(api.clone(), regions);
        let driver = CloudWatchExportDriver::new(api, settings.window);

        let storage = create_progress_storage(&config.store).await?;
        let progress = Arc::new(ProgressManager::new_with_storage(storage));

        tracing::info!(
            regions = config.regions.len(),
            store = progress.backend_name(),
            window_from = %settings.window.from,
            window_to = %settings.window.to,
            "Orchestrator initialized"
        );

        let orchestrator = Self::new(
            Arc::new(enumerator),
            Arc::new(gate),
            Arc::new(driver),
            progress,
            settings,
            shutdown,
        );

        match &config.notification.topic_arn {
            Some(topic_arn) => {
                let notifier = SnsNotifier::new(topic_arn).await?;
                tracing::info!(topic = %topic_arn, "Failure notifications enabled");
                Ok(orchestrator.with_notifier(Arc::new(notifier)))
            }
            None => Ok(orchestrator),
        }
    }

    /// Progress store access layer used by this orchestrator
    pub fn progress(&self) -> &Arc<ProgressManager> {
        &self.progress
    }

    /// Resolved run settings
    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Execute one run
    ///
    /// Always returns a summary. A run that did not reach DONE carries the
    /// aborting error in [`RunSummary::abort`]; progress written before the abort
    /// stays in the store for the next run.
    pub async fn execute_run(&self) -> RunSummary {
        let start_time = Instant::now();
        let mut summary = RunSummary::new(Uuid::new_v4().to_string());
        let mut cursor = RunCursor::default();

        tracing::info!(run_id = %summary.run_id, "Starting export run");

        let budget = self.settings.run_timeout;
        let result =
            match tokio::time::timeout(budget, self.drive(&mut summary, &mut cursor)).await {
                Ok(result) => result,
                Err(_) => Err(ArchivistError::Timeout(budget.as_secs())),
            };

        if let Err(e) = result {
            crate::log_error_with_context!(e, format!("export run {} aborted", summary.run_id));
            summary.abort = Some(RunError::from(&e));

            // A shutdown was asked for by the operator
            if !e.is_interrupted() {
                let notice = FailureNotice::RunAborted {
                    run_id: summary.run_id.clone(),
                    reason: e.to_string(),
                };
                self.notify(notice, &mut summary).await;
            }
        }

        self.collect_outcomes(&cursor, &mut summary).await;

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        summary
    }

    /// Units a run would export, in order, without touching the provider's
    /// export slot or the progress store
    pub async fn plan(&self) -> Result<Vec<ExportUnit>> {
        let units = self.discover().await?;
        let mut planned = Vec::new();

        for unit in units {
            let selectable = match self.progress.get_status(&unit.region, &unit.name).await? {
                None => true,
                Some(record) => record.status.is_selectable(),
            };
            if selectable {
                planned.push(unit);
            }
        }

        Ok(planned)
    }

    async fn drive(&self, summary: &mut RunSummary, cursor: &mut RunCursor) -> Result<()> {
        let mut step = Step::Discover;

        loop {
            self.check_shutdown()?;
            crate::log_phase!(summary.run_id, step.phase());
            summary.trace.push(step.phase());

            step = match step {
                Step::Discover => {
                    cursor.units = self.discover().await?;
                    summary.units_discovered = cursor.units.len();
                    self.reconcile(&cursor.units, summary).await?;

                    // Nothing to do means nothing to gate on
                    if cursor.units.is_empty() {
                        Step::Select
                    } else {
                        Step::GateCheck
                    }
                }

                Step::GateCheck => match self.gate.has_capacity().await {
                    Ok(true) => Step::Select,
                    Ok(false) => {
                        tracing::debug!("Export slot busy");
                        Step::Wait
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Gate query failed, treating as no capacity");
                        summary.gate_errors += 1;
                        summary.add_error(RunError::from(&e));
                        Step::Wait
                    }
                },

                Step::Wait => {
                    summary.wait_cycles += 1;
                    self.pause().await?;
                    Step::GateCheck
                }

                Step::Select => {
                    match self
                        .progress
                        .next_pending_unit(&cursor.units, &cursor.failed)
                        .await?
                    {
                        Some(unit) => Step::Submit(unit),
                        None => Step::Done,
                    }
                }

                Step::Submit(unit) => {
                    let destination = self.destination_for(&unit)?;
                    match self.driver.submit(&unit, &destination).await {
                        Ok(handle) => {
                            crate::log_unit_submitted!(unit, handle, destination);
                            summary.submitted += 1;
                            Step::Persist(unit, handle)
                        }
                        Err(SubmitError::QuotaExceeded(message)) => {
                            tracing::info!(
                                region = %unit.region,
                                log_group = %unit.name,
                                message = %message,
                                "Export slot taken after gate check"
                            );
                            summary.quota_races += 1;
                            Step::GateCheck
                        }
                        Err(err @ SubmitError::Provider(_)) => {
                            let reason = err.to_string();
                            if let Err(e) = self
                                .progress
                                .record_submission_error(&unit.region, &unit.name, &reason)
                                .await
                            {
                                tracing::warn!(
                                    region = %unit.region,
                                    log_group = %unit.name,
                                    error = %e,
                                    "Failed to record submission error"
                                );
                                summary.add_error(RunError::from(&e).with_context(unit.to_string()));
                            }
                            return Err(err.into());
                        }
                    }
                }

                Step::Persist(unit, handle) => {
                    self.progress
                        .record_submitted(&unit.region, &unit.name, &handle)
                        .await?;

                    match self.await_job(&unit, &handle).await? {
                        JobOutcome::Finished(state) if state.is_success() => {
                            self.progress
                                .record_completed(&unit.region, &unit.name, &handle)
                                .await?;
                            summary.completed += 1;
                        }
                        outcome => {
                            let reason = outcome.failure_reason();
                            self.progress
                                .record_failed(&unit.region, &unit.name, Some(&handle), reason)
                                .await?;
                            summary.failed += 1;
                            summary.add_error(
                                RunError::new(RunErrorType::Provider, reason)
                                    .with_context(unit.to_string()),
                            );
                            self.notify_export_failed(&unit, &handle, &outcome, summary)
                                .await;
                            cursor.failed.insert(unit);
                        }
                    }

                    Step::GateCheck
                }

                Step::Done => {
                    tracing::info!(run_id = %summary.run_id, "No pending units left");
                    return Ok(());
                }
            };
        }
    }

    async fn discover(&self) -> Result<Vec<ExportUnit>> {
        let listed: Vec<ExportUnit> = self.enumerator.list_units().try_collect().await?;

        let mut seen = HashSet::new();
        let units: Vec<ExportUnit> = listed
            .into_iter()
            .filter(|unit| seen.insert(unit.clone()))
            .collect();

        tracing::info!(count = units.len(), "Discovered export units");
        Ok(units)
    }

    /// Settle IN_PROGRESS records left by an earlier run
    async fn reconcile(&self, units: &[ExportUnit], summary: &mut RunSummary) -> Result<()> {
        for unit in units {
            let record = match self.progress.get_status(&unit.region, &unit.name).await? {
                Some(record) if record.status == ExportStatus::InProgress => record,
                _ => continue,
            };

            let Some(handle) = record.job_handle.clone() else {
                tracing::warn!(
                    region = %unit.region,
                    log_group = %unit.name,
                    "In-progress record has no export task id, leaving it untouched"
                );
                continue;
            };

            let outcome = match self.driver.job_status(unit, &handle).await {
                Ok(state) if state.is_terminal() => JobOutcome::Finished(state),
                Ok(_) => {
                    tracing::info!(
                        region = %unit.region,
                        log_group = %unit.name,
                        task_id = %handle,
                        "Export task from an earlier run still active, waiting for it"
                    );
                    self.await_job(unit, &handle).await?
                }
                Err(ArchivistError::JobNotFound(_)) => JobOutcome::Missing,
                Err(e) => {
                    tracing::warn!(
                        region = %unit.region,
                        log_group = %unit.name,
                        task_id = %handle,
                        error = %e,
                        "Could not check export task, leaving record in progress"
                    );
                    summary.add_error(RunError::from(&e).with_context(unit.to_string()));
                    continue;
                }
            };

            match &outcome {
                JobOutcome::Finished(state) if state.is_success() => {
                    self.progress
                        .record_completed(&unit.region, &unit.name, &handle)
                        .await?;
                }
                _ => {
                    self.progress
                        .record_failed(
                            &unit.region,
                            &unit.name,
                            Some(&handle),
                            outcome.failure_reason(),
                        )
                        .await?;
                    self.notify_export_failed(unit, &handle, &outcome, summary)
                        .await;
                }
            }
            summary.reconciled += 1;
        }

        Ok(())
    }

    /// Poll an export task until it reaches a terminal state
    async fn await_job(&self, unit: &ExportUnit, handle: &JobHandle) -> Result<JobOutcome> {
        loop {
            self.pause().await?;

            match self.driver.job_status(unit, handle).await {
                Ok(state) if state.is_terminal() => {
                    crate::log_unit_finished!(unit, handle, state);
                    return Ok(JobOutcome::Finished(state));
                }
                Ok(state) => {
                    tracing::debug!(task_id = %handle, state = %state, "Export task still running");
                }
                Err(ArchivistError::JobNotFound(_)) => return Ok(JobOutcome::Missing),
                Err(e) => {
                    tracing::warn!(task_id = %handle, error = %e, "Export task status check failed");
                }
            }
        }
    }

    fn destination_for(&self, unit: &ExportUnit) -> Result<ExportDestination> {
        let bucket = self.settings.buckets.get(&unit.region).ok_or_else(|| {
            ArchivistError::Configuration(format!(
                "No destination bucket configured for region {}",
                unit.region
            ))
        })?;

        Ok(self
            .settings
            .window
            .destination(bucket, &self.settings.destination_prefix, unit))
    }

    /// Sleep for one poll interval unless shutdown is requested first
    async fn pause(&self) -> Result<()> {
        let mut shutdown = self.shutdown.clone();
        tokio::select! {
            _ = tokio::time::sleep(self.settings.poll_interval) => Ok(()),
            Ok(()) = shutdown.changed() => {
                if *shutdown.borrow() {
                    Err(ArchivistError::Interrupted("shutdown signal received".to_string()))
                } else {
                    Ok(())
                }
            }
        }
    }

    async fn notify_export_failed(
        &self,
        unit: &ExportUnit,
        handle: &JobHandle,
        outcome: &JobOutcome,
        summary: &mut RunSummary,
    ) {
        let notice = FailureNotice::ExportFailed {
            unit: unit.clone(),
            task_id: Some(handle.clone()),
            status: outcome.status_label().to_string(),
            window_start: self.settings.window.from,
        };
        self.notify(notice, summary).await;
    }

    /// Delivery failures are recorded on the run but never stop it
    async fn notify(&self, notice: FailureNotice, summary: &mut RunSummary) {
        let Some(notifier) = &self.notifier else {
            return;
        };

        match notifier.notify(&notice).await {
            Ok(()) => summary.notifications_sent += 1,
            Err(e) => {
                tracing::warn!(error = %e, subject = %notice.subject(), "Failure notification not delivered");
                summary.add_error(RunError::from(&e));
            }
        }
    }

    fn check_shutdown(&self) -> Result<()> {
        if *self.shutdown.borrow() {
            return Err(ArchivistError::Interrupted(
                "shutdown signal received".to_string(),
            ));
        }
        Ok(())
    }

    async fn collect_outcomes(&self, cursor: &RunCursor, summary: &mut RunSummary) {
        for unit in &cursor.units {
            match self.progress.get_status(&unit.region, &unit.name).await {
                Ok(Some(record)) => summary.outcomes.push(UnitOutcome::from_record(&record)),
                Ok(None) => summary.outcomes.push(UnitOutcome::untouched(unit.clone())),
                Err(e) => {
                    tracing::warn!(
                        region = %unit.region,
                        log_group = %unit.name,
                        error = %e,
                        "Could not read unit status for the run report"
                    );
                    summary.outcomes.push(UnitOutcome::unreadable(unit.clone(), &e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::ProgressStorage;
    use crate::core::state::record::ProgressRecord;
    use crate::domain::LogGroupName;
    use async_trait::async_trait;
    use futures::stream::{self, BoxStream, StreamExt};

    /// Provider that is never asked for anything
    struct Idle;

    impl WorkEnumerator for Idle {
        fn list_units(&self) -> BoxStream<'_, Result<ExportUnit>> {
            stream::empty().boxed()
        }
    }

    #[async_trait]
    impl QuotaGate for Idle {
        async fn has_capacity(&self) -> Result<bool> {
            Ok(true)
        }
    }

    #[async_trait]
    impl ExportDriver for Idle {
        async fn submit(
            &self,
            _unit: &ExportUnit,
            _destination: &ExportDestination,
        ) -> std::result::Result<JobHandle, SubmitError> {
            Err(SubmitError::Provider("idle".to_string()))
        }

        async fn job_status(&self, _unit: &ExportUnit, task: &JobHandle) -> Result<JobState> {
            Err(ArchivistError::JobNotFound(task.to_string()))
        }
    }

    /// Store that can read only one log group
    struct PartlyReadable {
        readable: LogGroupName,
    }

    #[async_trait]
    impl ProgressStorage for PartlyReadable {
        async fn load_record(
            &self,
            _region: &Region,
            name: &LogGroupName,
        ) -> Result<Option<ProgressRecord>> {
            if *name == self.readable {
                Ok(None)
            } else {
                Err(ArchivistError::Persistence("read timed out".to_string()))
            }
        }

        async fn save_record(&self, _record: &ProgressRecord) -> Result<()> {
            Ok(())
        }

        async fn list_records(&self) -> Result<Vec<ProgressRecord>> {
            Ok(Vec::new())
        }

        fn backend_name(&self) -> &str {
            "partly-readable"
        }
    }

    fn unit(name: &str) -> ExportUnit {
        ExportUnit::new(
            Region::new("us-east-1").unwrap(),
            LogGroupName::new(name).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_outcomes_keep_going_past_unreadable_units() {
        let (_tx, rx) = watch::channel(false);
        let settings = RunSettings {
            poll_interval: Duration::from_millis(1),
            run_timeout: Duration::from_secs(1),
            buckets: HashMap::new(),
            destination_prefix: "exportedlogs".to_string(),
            window: ExportWindow::resolve(Utc::now(), 1, None, None).unwrap(),
        };
        let store = PartlyReadable {
            readable: LogGroupName::new("/app/c").unwrap(),
        };
        let orchestrator = Orchestrator::new(
            Arc::new(Idle),
            Arc::new(Idle),
            Arc::new(Idle),
            Arc::new(ProgressManager::new_with_storage(Arc::new(store))),
            settings,
            rx,
        );
        let cursor = RunCursor {
            units: vec![unit("/app/a"), unit("/app/b"), unit("/app/c")],
            failed: HashSet::new(),
        };
        let mut summary = RunSummary::new("run-1".to_string());

        orchestrator.collect_outcomes(&cursor, &mut summary).await;

        assert_eq!(summary.outcomes.len(), 3);
        for outcome in &summary.outcomes[..2] {
            assert!(outcome
                .last_error
                .as_deref()
                .unwrap()
                .starts_with("status unavailable"));
        }
        assert_eq!(summary.outcomes[2].unit, unit("/app/c"));
        assert!(summary.outcomes[2].last_error.is_none());
    }

    #[test]
    fn test_step_phases() {
        assert_eq!(Step::Discover.phase(), RunPhase::Discover);
        assert_eq!(Step::Wait.phase(), RunPhase::Wait);
        assert_eq!(Step::Done.phase(), RunPhase::Done);
    }

    #[test]
    fn test_run_cursor_starts_empty() {
        let cursor = RunCursor::default();
        assert!(cursor.units.is_empty());
        assert!(cursor.failed.is_empty());
    }
}
