//! The timetable currently on screen and the add/edit submission flow.

use crate::auth::AuthContext;
use crate::bulk::BulkOutcome;
use crate::cache::SnapshotCache;
use crate::client::{ApiClient, ApiError};
use crate::grid::{GridLayout, GridResolver};
use crate::types::{Day, EntryDraft, RecordId, TimetableEntry, TimetableFilter, TimetableQuery};
use crate::validation::{validate, SchemaName};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What a successful submission did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// An existing entry was replaced
    Updated,
    /// New entries were requested for one or more days
    Created(BulkOutcome),
}

/// One query's entries plus the operations that change them.
///
/// The snapshot is replaced wholesale on every refresh; whichever response
/// arrives last is what the view shows.
pub struct TimetableView {
    client: ApiClient,
    cache: Arc<SnapshotCache>,
    query: TimetableQuery,
    entries: Arc<Vec<TimetableEntry>>,
}

impl TimetableView {
    /// A view with an empty snapshot. Call [`TimetableView::refresh`] to load it.
    pub fn new(client: ApiClient, cache: Arc<SnapshotCache>, query: TimetableQuery) -> Self {
        Self {
            client,
            cache,
            query,
            entries: Arc::new(Vec::new()),
        }
    }

    pub fn query(&self) -> &TimetableQuery {
        &self.query
    }

    pub fn entries(&self) -> &[TimetableEntry] {
        &self.entries
    }

    pub fn resolver(&self) -> GridResolver<'_> {
        GridResolver::new(&self.entries)
    }

    pub fn layout(&self) -> GridLayout<'_> {
        self.resolver().layout()
    }

    /// Switches to another query and loads it.
    pub async fn set_query(
        &mut self,
        auth: &AuthContext,
        query: TimetableQuery,
    ) -> Result<usize, ApiError> {
        self.query = query;
        self.refresh(auth).await
    }

    pub async fn set_filter(
        &mut self,
        auth: &AuthContext,
        filter: TimetableFilter,
    ) -> Result<usize, ApiError> {
        self.set_query(auth, TimetableQuery::Class(filter)).await
    }

    /// Loads the snapshot, from cache when still fresh.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of entries now shown
    pub async fn refresh(&mut self, auth: &AuthContext) -> Result<usize, ApiError> {
        if let Some(cached) = self.cache.get(&self.query) {
            debug!(query = %self.query, "Snapshot cache hit");
            self.entries = cached;
            return Ok(self.entries.len());
        }
        self.reload(auth).await
    }

    /// Loads the snapshot from the backend, bypassing the cache.
    pub async fn reload(&mut self, auth: &AuthContext) -> Result<usize, ApiError> {
        let entries = match &self.query {
            TimetableQuery::Class(filter) => self.client.list_timetables(auth, *filter).await?,
            TimetableQuery::Lab(venue) => self.client.list_lab_timetable(auth, venue).await?,
        };
        info!(query = %self.query, count = entries.len(), "Loaded timetable");
        self.entries = self.cache.insert(self.query.clone(), entries);
        Ok(self.entries.len())
    }

    /// A blank draft for an empty cell of this view.
    pub fn new_draft(&self, day: Day, period: u8) -> EntryDraft {
        match &self.query {
            TimetableQuery::Class(filter) => EntryDraft::for_cell(*filter, day, period),
            TimetableQuery::Lab(venue) => EntryDraft::for_lab_cell(venue, day, period),
        }
    }

    /// Validates and saves a draft, then reloads the view.
    ///
    /// A draft with an id replaces that entry. Without one, an entry is
    /// created on the draft's day and on every repeat day, in order; a day
    /// that fails is reported in the outcome and does not stop the rest.
    ///
    /// # Returns
    /// * `Ok(SubmitOutcome)` - What was written
    /// * `Err(ApiError)` - Validation, permission, or update failure;
    ///   nothing was written
    pub async fn submit(
        &mut self,
        auth: &AuthContext,
        mut draft: EntryDraft,
    ) -> Result<SubmitOutcome, ApiError> {
        let schema = SchemaName::TimetableEntry;
        let mut data = serde_json::to_value(&draft).unwrap_or(Value::Null);
        if let Value::Object(fields) = &mut data {
            schema.schema().apply_defaults(fields);
        }
        if let Some(errors) = validate(&data, schema) {
            return Err(errors.into());
        }

        draft.recompute_times();

        let outcome = match &draft.id {
            Some(id) => {
                self.client
                    .update_timetable(auth, id, &draft.payload_for(draft.day))
                    .await?;
                SubmitOutcome::Updated
            }
            None => {
                let outcome = self
                    .client
                    .create_on_days(auth, &draft.payload_for(draft.day), &draft.creation_days())
                    .await?;
                if !outcome.is_complete_success() {
                    warn!(summary = %outcome.summary(), "Some days could not be created");
                }
                SubmitOutcome::Created(outcome)
            }
        };

        let wrote = match &outcome {
            SubmitOutcome::Updated => true,
            SubmitOutcome::Created(bulk) => bulk.wrote_anything(),
        };
        if wrote {
            self.after_write(auth, Some(TimetableFilter::new(draft.semester, draft.section)))
                .await;
        }
        Ok(outcome)
    }

    /// Deletes an entry and reloads the view.
    pub async fn delete(&mut self, auth: &AuthContext, id: &RecordId) -> Result<(), ApiError> {
        let filter = self
            .entries
            .iter()
            .find(|e| &e.id == id)
            .map(|e| TimetableFilter::new(e.semester, e.section));
        self.client.delete_timetable(auth, id).await?;
        self.after_write(auth, filter).await;
        Ok(())
    }

    /// Drops every snapshot the write may have changed and reloads this one.
    ///
    /// The write already succeeded, so a failed reload only leaves the
    /// view stale.
    async fn after_write(&mut self, auth: &AuthContext, written: Option<TimetableFilter>) {
        if let Some(filter) = written {
            self.cache.invalidate(&TimetableQuery::Class(filter));
        }
        self.cache.invalidate(&self.query);
        self.cache.invalidate_labs();

        if let Err(e) = self.reload(auth).await {
            warn!(query = %self.query, error = %e, "Reload after write failed");
        }
    }
}
