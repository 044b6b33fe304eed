//! Moderation inbox use-cases for user corrections.
//!
//! # Invariants
//! - New submissions always start in `novy`.
//! - Status changes happen only through explicit moderator calls.
//! - Contributor emails and texts are never written to logs.

use crate::model::correction::{Correction, CorrectionId, CorrectionStatus};
use crate::model::poi::PoiId;
use crate::repo::correction_repo::{CorrectionListQuery, CorrectionRepository};
use crate::repo::{RepoError, RepoResult};
use log::info;

/// Submission form for one correction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrectionSubmission {
    pub poi_id: Option<PoiId>,
    pub email: String,
    pub description: String,
    pub url: Option<String>,
    pub address: Option<String>,
}

pub struct CorrectionService<R: CorrectionRepository> {
    repo: R,
}

impl<R: CorrectionRepository> CorrectionService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Stores a submission in the `novy` state and returns the stored record.
    pub fn submit(&self, submission: CorrectionSubmission) -> RepoResult<Correction> {
        let mut correction = Correction::new(submission.email, submission.description);
        correction.poi_id = submission.poi_id;
        correction.url = submission.url.filter(|url| !url.trim().is_empty());
        correction.address = submission.address.filter(|address| !address.trim().is_empty());

        let id = self.repo.create_correction(&correction)?;
        info!(
            "event=correction_submit module=service status=ok id={id} has_poi={}",
            correction.poi_id.is_some()
        );
        Ok(correction)
    }

    /// Moves a correction to `status`; any state may follow any other.
    pub fn set_status(&self, id: CorrectionId, status: CorrectionStatus) -> RepoResult<Correction> {
        self.repo.set_correction_status(id, status)?;
        info!("event=correction_status module=service status=ok id={id} new_status={status}");
        self.repo
            .get_correction(id)?
            .ok_or(RepoError::NotFound {
                kind: "correction",
                id,
            })
    }

    /// Same as `set_status`, taking the stored status code.
    pub fn set_status_code(&self, id: CorrectionId, code: &str) -> RepoResult<Correction> {
        let status = code.parse::<CorrectionStatus>()?;
        self.set_status(id, status)
    }

    /// Unprocessed (`novy`) corrections in submission order.
    pub fn inbox(&self) -> RepoResult<Vec<Correction>> {
        self.list(&CorrectionListQuery {
            status: Some(CorrectionStatus::New),
            ..CorrectionListQuery::default()
        })
    }

    pub fn list(&self, query: &CorrectionListQuery) -> RepoResult<Vec<Correction>> {
        self.repo.list_corrections(query)
    }

    pub fn get(&self, id: CorrectionId) -> RepoResult<Option<Correction>> {
        self.repo.get_correction(id)
    }
}
