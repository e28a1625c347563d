//! Timetable endpoints and the repeat-days bulk create.

use super::{require_role, require_session, ApiClient, ApiError};
use crate::auth::AuthContext;
use crate::bulk::BulkOutcome;
use crate::types::{AdminStats, Day, EntryPayload, RecordId, Role, TimetableEntry, TimetableFilter};
use crate::validation::{validate_record, SchemaName};
use reqwest::Method;
use tracing::{info, warn};

const OPERATION_FAILED: &str = "Operation failed";
const LOAD_FAILED: &str = "Failed to load timetable";

impl ApiClient {
    /// Entries for one semester and section.
    pub async fn list_timetables(
        &self,
        auth: &AuthContext,
        filter: TimetableFilter,
    ) -> Result<Vec<TimetableEntry>, ApiError> {
        self.get_json(
            auth,
            &["timetables"],
            &[
                ("semester", filter.semester.as_str()),
                ("section", filter.section.as_str()),
            ],
            LOAD_FAILED,
        )
        .await
    }

    /// Every entry across all semesters and sections.
    pub async fn list_all_timetables(
        &self,
        auth: &AuthContext,
    ) -> Result<Vec<TimetableEntry>, ApiError> {
        self.get_json(auth, &["timetables"], &[], LOAD_FAILED).await
    }

    /// Entries held in `venue`, across all classes.
    ///
    /// The backend has no venue filter, so the full list is fetched and
    /// filtered here.
    pub async fn list_lab_timetable(
        &self,
        auth: &AuthContext,
        venue: &str,
    ) -> Result<Vec<TimetableEntry>, ApiError> {
        let mut entries = self.list_all_timetables(auth).await?;
        entries.retain(|entry| entry.venue == venue);
        Ok(entries)
    }

    pub async fn create_timetable(
        &self,
        auth: &AuthContext,
        entry: &EntryPayload,
    ) -> Result<(), ApiError> {
        check_entry_write(auth, entry)?;
        self.send_json(auth, Method::POST, &["timetables"], entry, OPERATION_FAILED)
            .await?;
        Ok(())
    }

    pub async fn update_timetable(
        &self,
        auth: &AuthContext,
        id: &RecordId,
        entry: &EntryPayload,
    ) -> Result<(), ApiError> {
        check_entry_write(auth, entry)?;
        self.send_json(
            auth,
            Method::PUT,
            &["timetables", id.as_str()],
            entry,
            OPERATION_FAILED,
        )
        .await?;
        Ok(())
    }

    pub async fn delete_timetable(&self, auth: &AuthContext, id: &RecordId) -> Result<(), ApiError> {
        require_role(auth, Role::can_edit_timetable)?;
        self.send_empty(
            auth,
            Method::DELETE,
            &["timetables", id.as_str()],
            OPERATION_FAILED,
        )
        .await
    }

    /// Creates one entry per day, in order, one request at a time.
    ///
    /// A failing day does not stop the remaining days. Local validation and
    /// role errors apply to every day alike and are returned before any
    /// request is sent.
    ///
    /// # Arguments
    /// * `auth` - Caller's session
    /// * `template` - Entry body; its `day` is replaced per request
    /// * `days` - Days to create on, in request order
    ///
    /// # Returns
    /// * `Ok(BulkOutcome)` - Days created and days that failed with reasons
    /// * `Err(ApiError)` - If nothing could be attempted
    pub async fn create_on_days(
        &self,
        auth: &AuthContext,
        template: &EntryPayload,
        days: &[Day],
    ) -> Result<BulkOutcome, ApiError> {
        check_entry_write(auth, template)?;

        let mut outcome = BulkOutcome::default();
        for day in days {
            let payload = EntryPayload {
                day: *day,
                ..template.clone()
            };
            match self
                .send_json(auth, Method::POST, &["timetables"], &payload, OPERATION_FAILED)
                .await
            {
                Ok(_) => outcome.record_success(*day),
                Err(e) => {
                    warn!(day = %day, error = %e, "Entry creation failed for day");
                    outcome.record_failure(*day, e.user_message());
                }
            }
        }

        info!(
            created = outcome.created.len(),
            failed = outcome.failures.len(),
            "Bulk entry creation finished"
        );
        Ok(outcome)
    }

    /// Dashboard counters.
    pub async fn admin_stats(&self, auth: &AuthContext) -> Result<AdminStats, ApiError> {
        require_session(auth)?;
        self.get_json(auth, &["admin", "stats"], &[], "Failed to load stats")
            .await
    }
}

fn check_entry_write(auth: &AuthContext, entry: &EntryPayload) -> Result<(), ApiError> {
    require_role(auth, Role::can_edit_timetable)?;
    if let Some(errors) = validate_record(entry, SchemaName::TimetableEntry) {
        return Err(errors.into());
    }
    Ok(())
}
