//! Profile editor
//!
//! Application service behind the multi-step profile setup: loads the schema
//! and user record, applies edits, recomputes completion, and saves.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::application::operation::{CompletionFlash, OperationState, RequestSequencer};
use crate::application::session::Session;
use crate::domain::aggregates::{PhotoError, PhotoSlots};
use crate::domain::events::{DomainEvent, ProfileEvent};
use crate::domain::schema::{find_field, FieldInputError, SectionDefinition};
use crate::domain::services::{CompletionCalculator, CompletionReport, FormNormalizer, PayloadTransformer};
use crate::domain::value_objects::{Record, UserId, WorkingFormState};
use crate::ports::outbound::{ApiError, ProfileApi, VerificationReceipt};

/// Backend key holding the uploaded photo URLs in slot order
pub const PHOTOS_KEY: &str = "photos";
/// Backend key holding the primary photo URL
pub const PRIMARY_PHOTO_KEY: &str = "profilePhoto";

#[derive(Debug, Default)]
struct EditorState {
    schema: Option<Vec<SectionDefinition>>,
    form: WorkingFormState,
    photos: PhotoSlots,
    report: CompletionReport,
    saved_completion: u8,
    load: OperationState,
    save: OperationState,
    verification: OperationState,
    flash: Option<CompletionFlash>,
    events: Vec<DomainEvent>,
}

impl EditorState {
    fn schema(&self) -> Result<&[SectionDefinition], EditorError> {
        self.schema.as_deref().ok_or(EditorError::NotLoaded)
    }

    /// Recompute completion and raise the flash when it went up
    fn recompute(&mut self, now: DateTime<Utc>) -> Result<CompletionReport, EditorError> {
        let report = CompletionCalculator::calculate(self.schema()?, &self.form, &self.photos);
        if report.overall > self.report.overall {
            self.flash = Some(CompletionFlash::new(report.overall, now));
        }
        debug!(overall = report.overall, "completion recomputed");
        self.report = report.clone();
        Ok(report)
    }
}

/// Result of a load request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied(CompletionReport),
    /// A newer load was issued while this one was in flight; its data was discarded
    Stale,
}

/// Result of a successful save
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveOutcome {
    pub completion: u8,
    pub verification: Option<VerificationReceipt>,
}

pub struct ProfileEditor {
    api: Arc<dyn ProfileApi>,
    user_id: UserId,
    state: Mutex<EditorState>,
    sequencer: RequestSequencer,
}

impl ProfileEditor {
    pub fn new(api: Arc<dyn ProfileApi>, user_id: UserId) -> Self {
        Self {
            api,
            user_id,
            state: Mutex::new(EditorState::default()),
            sequencer: RequestSequencer::new(),
        }
    }

    pub fn for_session(api: Arc<dyn ProfileApi>, session: &Session) -> Self {
        Self::new(api, session.user_id().clone())
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Fetch schema and user record and seed the working state.
    ///
    /// Only the most recently issued load applies its result.
    pub async fn load(&self) -> Result<LoadOutcome, EditorError> {
        let ticket = self.sequencer.issue();
        self.state.lock().load.begin();

        let fetched = tokio::try_join!(self.api.fetch_schema(), self.api.fetch_user(&self.user_id));

        if !self.sequencer.is_current(ticket) {
            debug!(ticket, "discarding stale profile load");
            return Ok(LoadOutcome::Stale);
        }

        let mut state = self.state.lock();
        let (schema, record) = match fetched {
            Ok(fetched) => fetched,
            Err(err) => {
                warn!(user_id = %self.user_id, error = %err, "profile load failed");
                state.load.fail(err.to_string());
                return Err(EditorError::SchemaUnavailable(err));
            }
        };

        state.form = FormNormalizer::seed(&schema, &record);
        state.photos = photos_from_record(&record);
        state.report = CompletionCalculator::calculate(&schema, &state.form, &state.photos);
        state.saved_completion = state.report.overall;
        state.schema = Some(schema);
        state.flash = None;
        state.load.succeed();

        info!(user_id = %self.user_id, completion = state.report.overall, "profile loaded");
        Ok(LoadOutcome::Applied(state.report.clone()))
    }

    /// Store a value under a field name and recompute completion
    pub fn set_field(&self, name: &str, value: Value) -> Result<CompletionReport, EditorError> {
        let mut state = self.state.lock();
        state.schema()?;
        state.form.set(name, value);
        state.recompute(Utc::now())
    }

    /// Parse raw input according to the field's type, then store it
    pub fn set_input(&self, name: &str, input: &str) -> Result<CompletionReport, EditorError> {
        let value = {
            let state = self.state.lock();
            let field = find_field(state.schema()?, name)
                .ok_or_else(|| EditorError::UnknownField(name.to_string()))?;
            field.kind.accepts(input).map_err(|source| EditorError::InvalidInput {
                field: name.to_string(),
                source,
            })?
        };
        self.set_field(name, value)
    }

    pub fn set_photo(&self, slot_id: u8, url: &str) -> Result<CompletionReport, EditorError> {
        self.with_photos(|photos| photos.set_photo(slot_id, url))
    }

    pub fn clear_photo(&self, slot_id: u8) -> Result<CompletionReport, EditorError> {
        self.with_photos(|photos| photos.clear_photo(slot_id))
    }

    pub fn make_primary(&self, slot_id: u8) -> Result<CompletionReport, EditorError> {
        self.with_photos(|photos| photos.make_primary(slot_id))
    }

    pub fn completion(&self) -> Result<CompletionReport, EditorError> {
        let state = self.state.lock();
        state.schema()?;
        Ok(state.report.clone())
    }

    pub fn schema(&self) -> Result<Vec<SectionDefinition>, EditorError> {
        self.state.lock().schema().map(<[SectionDefinition]>::to_vec)
    }

    pub fn form(&self) -> WorkingFormState {
        self.state.lock().form.clone()
    }

    pub fn photos(&self) -> PhotoSlots {
        self.state.lock().photos.clone()
    }

    pub fn load_state(&self) -> OperationState {
        self.state.lock().load.clone()
    }

    pub fn save_state(&self) -> OperationState {
        self.state.lock().save.clone()
    }

    pub fn verification_state(&self) -> OperationState {
        self.state.lock().verification.clone()
    }

    /// The completion notice if it has not expired yet
    pub fn flash(&self, now: DateTime<Utc>) -> Option<CompletionFlash> {
        let mut state = self.state.lock();
        if state.flash.as_ref().is_some_and(|flash| !flash.is_visible(now)) {
            state.flash = None;
        }
        state.flash.clone()
    }

    /// Get and clear accumulated domain events
    pub fn take_events(&self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.state.lock().events)
    }

    /// Transform the working state and submit it.
    ///
    /// A second save while one is in flight is refused. Reaching 100% from
    /// below (or retrying a failed verification at 100%) submits the profile
    /// for verification.
    pub async fn save(&self) -> Result<SaveOutcome, EditorError> {
        let (payload, completion, needs_verification) = {
            let mut state = self.state.lock();
            let schema = state.schema()?;
            let mut payload = PayloadTransformer::transform(schema, &state.form);
            attach_photos(&mut payload, &state.photos);

            if !state.save.begin() {
                return Err(EditorError::Busy);
            }

            let completion = state.report.overall;
            let needs_verification =
                completion == 100 && (state.saved_completion < 100 || state.verification.is_failed());
            (payload, completion, needs_verification)
        };

        if let Err(err) = self.api.update_user(&self.user_id, payload).await {
            warn!(user_id = %self.user_id, error = %err, "profile save failed");
            self.state.lock().save.fail(err.to_string());
            return Err(EditorError::Submission(err));
        }

        {
            let mut state = self.state.lock();
            state.save.succeed();
            state.saved_completion = completion;
            state.events.push(DomainEvent::Profile(ProfileEvent::Saved {
                user_id: self.user_id.clone(),
                completion,
                saved_at: Utc::now(),
            }));
        }
        info!(user_id = %self.user_id, completion, "profile saved");

        let verification = if needs_verification {
            Some(self.submit_verification().await?)
        } else {
            None
        };

        Ok(SaveOutcome { completion, verification })
    }

    async fn submit_verification(&self) -> Result<VerificationReceipt, EditorError> {
        if !self.state.lock().verification.begin() {
            return Err(EditorError::Busy);
        }

        match self.api.submit_verification(&self.user_id).await {
            Ok(receipt) => {
                let mut state = self.state.lock();
                state.verification.succeed();
                state.events.push(DomainEvent::Profile(ProfileEvent::VerificationSubmitted {
                    user_id: self.user_id.clone(),
                    submitted_at: receipt.submitted_at.unwrap_or_else(Utc::now),
                }));
                info!(user_id = %self.user_id, status = %receipt.status, "verification submitted");
                Ok(receipt)
            }
            Err(err) => {
                warn!(user_id = %self.user_id, error = %err, "verification submission failed");
                self.state.lock().verification.fail(err.to_string());
                Err(EditorError::Verification(err))
            }
        }
    }

    fn with_photos(
        &self,
        change: impl FnOnce(&mut PhotoSlots) -> Result<(), PhotoError>,
    ) -> Result<CompletionReport, EditorError> {
        let mut state = self.state.lock();
        state.schema()?;
        change(&mut state.photos)?;
        state.recompute(Utc::now())
    }
}

/// Slots from the record; `photos` is read by position, so `null` entries
/// keep later photos in their own slots
fn photos_from_record(record: &Record) -> PhotoSlots {
    let positions: Vec<Option<&str>> = record
        .get(PHOTOS_KEY)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| item.as_str().filter(|url| !url.trim().is_empty()))
                .collect()
        })
        .unwrap_or_default();
    let primary = record.get(PRIMARY_PHOTO_KEY).and_then(Value::as_str);
    PhotoSlots::from_positions(positions, primary)
}

fn attach_photos(payload: &mut Record, photos: &PhotoSlots) {
    let positions = photos
        .positions()
        .into_iter()
        .map(|url| url.map_or(Value::Null, Value::String))
        .collect();
    payload.insert(PHOTOS_KEY.to_string(), Value::Array(positions));
    payload.insert(
        PRIMARY_PHOTO_KEY.to_string(),
        photos.primary_url().map_or(Value::Null, Value::from),
    );
}

#[derive(Debug, Error)]
pub enum EditorError {
    /// The form cannot render without its schema and record
    #[error("profile form is unavailable: {0}")]
    SchemaUnavailable(#[source] ApiError),

    #[error("profile has not been loaded")]
    NotLoaded,

    #[error("another save is already in progress")]
    Busy,

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("invalid value for {field}: {source}")]
    InvalidInput {
        field: String,
        #[source]
        source: FieldInputError,
    },

    #[error(transparent)]
    Photo(#[from] PhotoError),

    /// The working state is kept so the save can be retried
    #[error("could not save profile: {0}")]
    Submission(#[source] ApiError),

    #[error("profile saved but verification could not be submitted: {0}")]
    Verification(#[source] ApiError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{FieldDefinition, FieldKind};
    use crate::infrastructure::memory::InMemoryProfileApi;
    use serde_json::json;
    use std::time::Duration;

    fn schema() -> Vec<SectionDefinition> {
        vec![
            SectionDefinition::new(
                "basic",
                "Basic",
                vec![
                    FieldDefinition::new("fullName", "Full Name", FieldKind::Text).required(),
                    FieldDefinition::new("dob", "Date of Birth", FieldKind::Date).required(),
                ],
            ),
            SectionDefinition::new(
                "family",
                "Family",
                vec![FieldDefinition::new("surnames", "Relative Surnames", FieldKind::Text)],
            ),
            SectionDefinition::new("photos", "Photos", vec![]),
        ]
    }

    fn user() -> UserId {
        UserId::from_string("u-asha")
    }

    fn backend() -> Arc<InMemoryProfileApi> {
        let api = InMemoryProfileApi::new(schema());
        api.insert_user(
            &user(),
            json!({
                "name": "Asha Rao",
                "dob": "1995-04-12",
                "subscription": { "plan": "gold" },
                "photos": ["https://img/a.jpg"]
            })
            .as_object()
            .cloned()
            .unwrap(),
        );
        Arc::new(api)
    }

    async fn loaded(api: Arc<InMemoryProfileApi>) -> ProfileEditor {
        let editor = ProfileEditor::new(api, user());
        editor.load().await.unwrap();
        editor
    }

    #[tokio::test]
    async fn test_load_seeds_state_and_completion() {
        let editor = loaded(backend()).await;
        let form = editor.form();
        assert_eq!(form.get("fullName"), Some(&json!("Asha Rao")));
        assert_eq!(editor.photos().primary_url(), Some("https://img/a.jpg"));

        // basic 2/2, family 0/1, photo unit 1/1
        let report = editor.completion().unwrap();
        assert_eq!(report.overall, 75);
        assert_eq!(editor.load_state(), OperationState::Succeeded);
    }

    #[tokio::test]
    async fn test_edits_before_load_are_refused() {
        let editor = ProfileEditor::new(backend(), user());
        assert!(matches!(editor.set_field("dob", json!("1995-04-12")), Err(EditorError::NotLoaded)));
        assert!(matches!(editor.save().await, Err(EditorError::NotLoaded)));
    }

    #[tokio::test]
    async fn test_load_failure_blocks_form() {
        let api = backend();
        api.fail_next(ApiError::Transport("offline".into()));
        let editor = ProfileEditor::new(api, user());
        assert!(matches!(editor.load().await, Err(EditorError::SchemaUnavailable(_))));
        assert!(editor.load_state().is_failed());
        assert!(matches!(editor.completion(), Err(EditorError::NotLoaded)));
    }

    #[tokio::test]
    async fn test_set_input_uses_field_kind() {
        let editor = loaded(backend()).await;
        assert!(matches!(
            editor.set_input("dob", "12/04/1995"),
            Err(EditorError::InvalidInput { .. })
        ));
        assert!(matches!(editor.set_input("height", "170"), Err(EditorError::UnknownField(_))));
        editor.set_input("surnames", "Kulkarni, Patil").unwrap();
        assert_eq!(editor.form().get("surnames"), Some(&json!("Kulkarni, Patil")));
    }

    #[tokio::test]
    async fn test_flash_on_progress() {
        let editor = loaded(backend()).await;
        assert!(editor.flash(Utc::now()).is_none());

        let report = editor.set_field("surnames", json!("Kulkarni")).unwrap();
        assert_eq!(report.overall, 100);
        let flash = editor.flash(Utc::now()).unwrap();
        assert_eq!(flash.percent, 100);
        assert!(editor.flash(flash.expires_at).is_none());
    }

    #[tokio::test]
    async fn test_save_sends_backend_payload() {
        let api = backend();
        let editor = loaded(api.clone()).await;
        editor.set_field("dob", Value::Null).unwrap();
        editor.save().await.unwrap();

        let stored = api.user(&user()).unwrap();
        assert_eq!(stored.get("name"), Some(&json!("Asha Rao")));
        assert_eq!(stored.get("dob"), Some(&Value::Null));
        assert_eq!(stored.get(PRIMARY_PHOTO_KEY), Some(&json!("https://img/a.jpg")));
        assert_eq!(stored.get("subscription"), Some(&json!({ "plan": "gold" })));
        assert!(!stored.contains_key("fullName"));
        assert_eq!(editor.save_state(), OperationState::Succeeded);
    }

    #[tokio::test]
    async fn test_reaching_full_completion_submits_verification_once() {
        let api = backend();
        let editor = loaded(api.clone()).await;
        editor.set_field("surnames", json!("Kulkarni, Patil, ")).unwrap();

        let outcome = editor.save().await.unwrap();
        assert_eq!(outcome.completion, 100);
        assert!(outcome.verification.is_some());
        assert_eq!(api.verification_count(), 1);
        assert_eq!(
            api.user(&user()).unwrap().get("relativeSurnames"),
            Some(&json!(["Kulkarni", "Patil"]))
        );

        let again = editor.save().await.unwrap();
        assert!(again.verification.is_none());
        assert_eq!(api.verification_count(), 1);

        let events = editor.take_events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[1], DomainEvent::Profile(ProfileEvent::VerificationSubmitted { .. })));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_working_state() {
        let api = backend();
        let editor = loaded(api.clone()).await;
        editor.set_field("surnames", json!("Joshi")).unwrap();

        api.fail_next(ApiError::Rejected { status: 500, message: "boom".into() });
        assert!(matches!(editor.save().await, Err(EditorError::Submission(_))));
        assert!(editor.save_state().is_failed());
        assert_eq!(editor.form().get("surnames"), Some(&json!("Joshi")));
        assert_eq!(api.verification_count(), 0);

        let outcome = editor.save().await.unwrap();
        assert!(outcome.verification.is_some());
    }

    #[tokio::test]
    async fn test_concurrent_save_is_refused() {
        let api = backend();
        let editor = loaded(api.clone()).await;
        api.set_delay(Duration::from_millis(50));

        let (first, second) = tokio::join!(editor.save(), editor.save());
        assert!(first.is_ok());
        assert!(matches!(second, Err(EditorError::Busy)));
    }

    #[tokio::test]
    async fn test_stale_load_is_discarded() {
        let api = backend();
        let editor = ProfileEditor::new(api.clone(), user());
        api.set_delay(Duration::from_millis(50));

        let slow = editor.load();
        let fast = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            api.set_delay(Duration::ZERO);
            editor.load().await
        };
        let (slow, fast) = tokio::join!(slow, fast);

        assert_eq!(slow.unwrap(), LoadOutcome::Stale);
        assert!(matches!(fast.unwrap(), LoadOutcome::Applied(_)));
    }

    #[tokio::test]
    async fn test_photo_slots_survive_reload() {
        let api = backend();
        let editor = loaded(api.clone()).await;
        editor.set_photo(3, "https://img/c.jpg").unwrap();
        editor.make_primary(3).unwrap();
        editor.save().await.unwrap();

        assert_eq!(
            api.user(&user()).unwrap().get(PHOTOS_KEY),
            Some(&json!(["https://img/a.jpg", null, "https://img/c.jpg", null]))
        );

        let reloaded = loaded(api).await;
        let photos = reloaded.photos();
        assert_eq!(photos.get(1).unwrap().url.as_deref(), Some("https://img/a.jpg"));
        assert_eq!(photos.get(2).unwrap().url, None);
        assert_eq!(photos.get(3).unwrap().url.as_deref(), Some("https://img/c.jpg"));
        assert!(photos.get(3).unwrap().is_primary);
        assert_eq!(photos, editor.photos());
    }

    #[tokio::test]
    async fn test_failed_verification_is_retried_on_next_save() {
        let api = backend();
        let editor = loaded(api.clone()).await;
        editor.set_field("surnames", json!("Kulkarni")).unwrap();

        api.fail_next_verification(ApiError::Transport("timeout".into()));
        assert!(matches!(editor.save().await, Err(EditorError::Verification(_))));
        assert!(editor.verification_state().is_failed());
        assert_eq!(editor.save_state(), OperationState::Succeeded);
        assert_eq!(api.verification_count(), 0);
        assert_eq!(
            api.user(&user()).unwrap().get("relativeSurnames"),
            Some(&json!(["Kulkarni"]))
        );

        let outcome = editor.save().await.unwrap();
        assert_eq!(outcome.completion, 100);
        assert!(outcome.verification.is_some());
        assert_eq!(editor.verification_state(), OperationState::Succeeded);
        assert_eq!(api.verification_count(), 1);

        let again = editor.save().await.unwrap();
        assert!(again.verification.is_none());
        assert_eq!(api.verification_count(), 1);
    }

    #[tokio::test]
    async fn test_photo_edits_recompute() {
        let editor = loaded(backend()).await;
        let report = editor.clear_photo(1).unwrap();
        assert_eq!(report.section("photos").unwrap().percent, 0);
        assert!(matches!(editor.make_primary(9), Err(EditorError::Photo(PhotoError::UnknownSlot(9)))));
        editor.set_photo(3, "https://img/c.jpg").unwrap();
        assert_eq!(editor.photos().primary_url(), Some("https://img/c.jpg"));
    }
}
