//! Filler batch workflow.
//!
//! For every target row, in order: make sure the source exists on the portal,
//! creating it when missing, then submit the row's follow-up requests. A
//! failing row or request is recorded and the batch moves on.

use tracing::{info, warn};

use crate::models::{
    build_followup_request, observation_plan, GroupId, RequestDefaults, SourceDraft,
    SourceOutcome, TargetRecord,
};
use crate::parsing::TargetRow;
use crate::portal::repository::{FollowupRepository, FullPortal, PortalResult, SourceRepository};
use crate::portal::settings::PortalSettings;

use super::sync_report::SyncReport;

/// Options for [`run_filler_sync`].
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Create missing sources but submit no requests.
    pub only_create: bool,
    pub defaults: RequestDefaults,
}

impl SyncOptions {
    /// Options with request defaults taken from the `[defaults]` settings section.
    pub fn from_settings(settings: &PortalSettings, only_create: bool) -> Self {
        Self {
            only_create,
            defaults: settings.request_defaults(),
        }
    }

    /// Groups new sources are saved to.
    pub fn source_groups(&self) -> Vec<GroupId> {
        vec![self.defaults.group_id]
    }
}

/// Make sure a source exists, creating it when the lookup says it does not.
///
/// At most one creation is attempted per call. A transport failure while
/// creating counts as [`SourceOutcome::CreateFailed`].
pub async fn ensure_source<R>(repo: &R, draft: &SourceDraft) -> SourceOutcome
where
    R: SourceRepository + ?Sized,
{
    if repo.source_exists(draft.id()).await {
        return SourceOutcome::AlreadyExists;
    }

    match repo.create_source(draft).await {
        Ok(true) => {
            info!("Created source {}", draft.id());
            SourceOutcome::Created
        }
        Ok(false) => SourceOutcome::CreateFailed,
        Err(e) => {
            warn!("Creating source {} failed: {}", draft.id(), e);
            SourceOutcome::CreateFailed
        }
    }
}

fn source_draft(record: &TargetRecord, groups: Vec<GroupId>) -> PortalResult<SourceDraft> {
    let (ra, dec) = record.coordinates()?;
    SourceDraft::new(&record.object_id, ra, dec, groups)
}

async fn submit_requests<R>(
    repo: &R,
    record: &TargetRecord,
    options: &SyncOptions,
    report: &mut SyncReport,
) where
    R: FullPortal + ?Sized,
{
    let (observation_type, choices) = match observation_plan(record) {
        Ok(plan) => plan,
        Err(e) => {
            warn!("No requests for {}: {}", record.object_id, e);
            report.request_failed(&record.object_id, "<none>", e.message());
            return;
        }
    };

    for choice in &choices {
        let request = build_followup_request(
            &record.object_id,
            record.exposure_time,
            choice,
            observation_type,
            &options.defaults,
        );
        match repo.submit_followup(&request).await {
            Ok(()) => report.request_submitted(&record.object_id, choice),
            Err(e) => {
                warn!("Request {} for {} failed: {}", choice, record.object_id, e);
                report.request_failed(&record.object_id, choice, e.message());
            }
        }
    }
}

/// Run the filler workflow over parsed target rows.
pub async fn run_filler_sync<R>(
    repo: &R,
    rows: Vec<TargetRow>,
    options: &SyncOptions,
    mut report: SyncReport,
) -> SyncReport
where
    R: FullPortal + ?Sized,
{
    info!(
        "Processing {} target rows (only_create={})",
        rows.len(),
        options.only_create
    );

    for TargetRow { row, record } in rows {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping row {}: {}", row, e);
                report.row_skipped(None, format!("row {}: {}", row, e.message()));
                continue;
            }
        };

        let draft = match source_draft(&record, options.source_groups()) {
            Ok(draft) => draft,
            Err(e) => {
                warn!("Skipping {}: {}", record.object_id, e);
                report.row_skipped(Some(&record.object_id), e.message());
                continue;
            }
        };

        let outcome = ensure_source(repo, &draft).await;
        report.source(&record.object_id, outcome);

        if !options.only_create {
            submit_requests(repo, &record, options, &mut report).await;
        }
    }

    info!("Filler sync finished: {}", report.summary());
    report
}
