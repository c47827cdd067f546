//! Create/update form shared by both flows.
//!
//! A form is `Closed` until opened, holds a private [`Draft`] while `Open`,
//! and is `Submitting` only for the duration of the remote call:
//!
//! ```text
//! Closed --open--> Open --submit--> Submitting --ok--> Closed
//!                   ^                    |
//!                   +------failure-------+
//! ```
//!
//! Validation failures never leave `Open` and make no remote call.

pub mod mode;
pub mod selector;
pub mod validate;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::context::{UserApi, UserContext};
use crate::error::{Result, UsersError};
use crate::locations::Locations;
use crate::notify::Notifier;
use crate::types::{Draft, Field, User};

pub use mode::{CreateMode, FormMode, UpdateMode};
pub use selector::RegionSelector;
pub use validate::{validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Closed,
    Open,
    Submitting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Saved remotely; the form is closed and its draft discarded.
    Saved { message: String },
    /// Rejected before any remote call; the form stays open.
    Invalid(ValidationError),
    /// The remote call failed; the form stays open with its draft intact.
    Failed { message: String },
}

pub struct FormMachine<'a, A, M> {
    ctx: &'a UserContext<A>,
    notifier: &'a dyn Notifier,
    mode: M,
    state: FormState,
    draft: Draft,
    selector: RegionSelector<'a>,
    subscription: Option<watch::Receiver<Vec<User>>>,
}

impl<'a, A: UserApi, M: FormMode> FormMachine<'a, A, M> {
    pub fn new(
        ctx: &'a UserContext<A>,
        locations: &'a Locations,
        notifier: &'a dyn Notifier,
        mode: M,
    ) -> Self {
        Self {
            ctx,
            notifier,
            draft: mode.initial_draft(),
            mode,
            state: FormState::Closed,
            selector: RegionSelector::new(locations),
            subscription: None,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> FormState {
        self.state
    }

    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        self.state != FormState::Closed
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn mode(&self) -> &M {
        &self.mode
    }

    pub fn context(&self) -> &'a UserContext<A> {
        self.ctx
    }

    pub fn selector(&self) -> &RegionSelector<'a> {
        &self.selector
    }

    pub fn commune_options(&self) -> &'a [String] {
        self.selector.candidates()
    }

    pub fn commune_enabled(&self) -> bool {
        self.selector.commune_enabled()
    }

    pub fn open(&mut self) -> Result<()> {
        if self.state != FormState::Closed {
            return Ok(());
        }

        if self.mode.tracks_record() {
            self.mode.resync(&self.ctx.users());
            self.subscription = Some(self.ctx.subscribe());
        }
        self.load_initial_draft();
        self.state = FormState::Open;
        debug!(region = %self.draft.region, "form opened");
        Ok(())
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> Result<()> {
        self.require_open()?;
        self.draft.set(field, value);
        Ok(())
    }

    pub fn select_region(&mut self, region: &str) -> Result<()> {
        self.require_open()?;
        self.selector.select_region(region);
        self.draft.region = region.to_string();
        self.draft.commune.clear();
        Ok(())
    }

    pub fn select_commune(&mut self, commune: &str) -> Result<()> {
        self.require_open()?;
        self.selector.select_commune(commune);
        self.draft.commune = commune.to_string();
        Ok(())
    }

    /// Close without saving. The draft goes back to the mode's initial one.
    pub fn cancel(&mut self) -> Result<()> {
        if self.state != FormState::Closed {
            self.close();
            debug!("form cancelled");
        }
        Ok(())
    }

    /// Apply pending changes to the tracked record. Only resets the draft
    /// when the edited record itself changed.
    pub fn sync(&mut self) -> bool {
        if self.state != FormState::Open {
            return false;
        }
        let Some(rx) = self.subscription.as_mut() else {
            return false;
        };
        if !rx.has_changed().unwrap_or(false) {
            return false;
        }

        let users = rx.borrow_and_update().clone();
        if !self.mode.resync(&users) {
            return false;
        }

        debug!("tracked record changed remotely, draft reset");
        self.load_initial_draft();
        true
    }

    pub async fn submit(&mut self) -> Result<SubmitOutcome> {
        self.require_open()?;

        if let Err(e) = validate(&self.draft) {
            debug!(error = %e, "draft rejected");
            self.notifier.error(&e.to_string());
            return Ok(SubmitOutcome::Invalid(e));
        }

        let in_flight = InFlight::enter(&mut self.state);
        let result = self.mode.persist(self.ctx, &self.draft).await;

        match result {
            Ok(reply) if reply.ok => {
                if let Err(e) = self.ctx.get_users().await {
                    warn!(error = %e, "saved but failed to refresh user list");
                }
                info!(message = %reply.message, "user saved");
                self.notifier.success(&reply.message);
                in_flight.finish(FormState::Closed);
                self.close();
                Ok(SubmitOutcome::Saved {
                    message: reply.message,
                })
            }
            Ok(reply) => {
                warn!(message = %reply.message, "save rejected by server");
                self.notifier.error(&reply.message);
                in_flight.finish(FormState::Open);
                Ok(SubmitOutcome::Failed {
                    message: reply.message,
                })
            }
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, "save failed");
                self.notifier.error(&message);
                in_flight.finish(FormState::Open);
                Ok(SubmitOutcome::Failed { message })
            }
        }
    }

    /// `Submitting` is never observable here: `submit` holds `&mut self`
    /// until the state is settled again.
    fn require_open(&self) -> Result<()> {
        match self.state {
            FormState::Open => Ok(()),
            FormState::Closed | FormState::Submitting => Err(UsersError::FormNotOpen),
        }
    }

    fn load_initial_draft(&mut self) {
        self.draft = self.mode.initial_draft();
        self.selector.prime(&self.draft.region, &self.draft.commune);
    }

    fn close(&mut self) {
        self.state = FormState::Closed;
        self.draft = self.mode.initial_draft();
        self.selector.reset();
        self.subscription = None;
    }
}

/// Marks a form as submitting. If the submit future is dropped before the
/// remote call resolves, the form falls back to `Open`.
struct InFlight<'s> {
    state: &'s mut FormState,
}

impl<'s> InFlight<'s> {
    fn enter(state: &'s mut FormState) -> Self {
        *state = FormState::Submitting;
        Self { state }
    }

    fn finish(self, next: FormState) {
        *self.state = next;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if *self.state == FormState::Submitting {
            *self.state = FormState::Open;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ApiMessage;
    use crate::testing::{sample_user, valid_draft, Note, RecordingNotifier, Reply, StubApi};

    fn fill(form: &mut FormMachine<'_, StubApi, impl FormMode>, draft: &Draft) {
        form.set_field(Field::Name, draft.name.as_str()).unwrap();
        form.set_field(Field::Email, draft.email.as_str()).unwrap();
        form.set_field(Field::Phone, draft.phone.as_str()).unwrap();
        form.select_region(&draft.region).unwrap();
        form.select_commune(&draft.commune).unwrap();
    }

    #[tokio::test]
    async fn test_create_success_closes_and_refreshes_once() {
        let locations = Locations::embedded().unwrap();
        let notifier = RecordingNotifier::default();
        let ctx = UserContext::new(StubApi::new(vec![sample_user("1")]));
        let mut form = FormMachine::new(&ctx, &locations, &notifier, CreateMode);

        form.open().unwrap();
        fill(&mut form, &valid_draft());
        let outcome = form.submit().await.unwrap();

        assert_eq!(
            outcome,
            SubmitOutcome::Saved {
                message: "saved".to_string()
            }
        );
        assert_eq!(form.state(), FormState::Closed);
        assert!(!form.is_open());
        assert_eq!(form.draft(), &Draft::default());
        assert_eq!(ctx.api().create_calls(), 1);
        assert_eq!(ctx.api().list_calls(), 1);
        assert_eq!(ctx.api().last_draft(), Some(valid_draft()));
        assert_eq!(notifier.notes(), vec![Note::Success("saved".to_string())]);
        assert_eq!(ctx.users().len(), 1);
    }

    #[tokio::test]
    async fn test_create_server_rejection_keeps_draft() {
        let locations = Locations::embedded().unwrap();
        let notifier = RecordingNotifier::default();
        let api = StubApi::new(vec![])
            .replying(Reply::Message(ApiMessage::failed("duplicate email")));
        let ctx = UserContext::new(api);
        let mut form = FormMachine::new(&ctx, &locations, &notifier, CreateMode);

        form.open().unwrap();
        fill(&mut form, &valid_draft());
        let outcome = form.submit().await.unwrap();

        assert_eq!(
            outcome,
            SubmitOutcome::Failed {
                message: "duplicate email".to_string()
            }
        );
        assert_eq!(form.state(), FormState::Open);
        assert_eq!(form.draft(), &valid_draft());
        assert_eq!(ctx.api().list_calls(), 0);
        assert_eq!(
            notifier.notes(),
            vec![Note::Error("duplicate email".to_string())]
        );
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_form_open_for_retry() {
        let locations = Locations::embedded().unwrap();
        let notifier = RecordingNotifier::default();
        let api = StubApi::new(vec![]).replying(Reply::Transport("down".to_string()));
        let ctx = UserContext::new(api);
        let mut form = FormMachine::new(&ctx, &locations, &notifier, CreateMode);

        form.open().unwrap();
        fill(&mut form, &valid_draft());
        let outcome = form.submit().await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Failed { ref message } if message.contains("down")));
        assert_eq!(form.state(), FormState::Open);

        ctx.api().set_reply(Reply::Message(ApiMessage::ok("created")));
        let outcome = form.submit().await.unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome::Saved {
                message: "created".to_string()
            }
        );
        assert_eq!(ctx.api().create_calls(), 2);
        assert_eq!(ctx.api().list_calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_draft_makes_no_remote_call() {
        let locations = Locations::embedded().unwrap();
        let notifier = RecordingNotifier::default();
        let ctx = UserContext::new(StubApi::new(vec![]));
        let mut form = FormMachine::new(&ctx, &locations, &notifier, CreateMode);

        form.open().unwrap();
        form.set_field(Field::Name, "Ana").unwrap();
        let outcome = form.submit().await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Invalid(ValidationError::MissingField));
        assert_eq!(form.state(), FormState::Open);
        assert_eq!(ctx.api().create_calls(), 0);
        assert_eq!(
            notifier.notes(),
            vec![Note::Error("required fields missing".to_string())]
        );
    }

    #[tokio::test]
    async fn test_bad_phone_reported_after_email() {
        let locations = Locations::embedded().unwrap();
        let notifier = RecordingNotifier::default();
        let ctx = UserContext::new(StubApi::new(vec![]));
        let mut form = FormMachine::new(&ctx, &locations, &notifier, CreateMode);

        let mut draft = valid_draft();
        draft.phone = "712345678".to_string();
        form.open().unwrap();
        fill(&mut form, &draft);

        let outcome = form.submit().await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Invalid(ValidationError::InvalidPhone));
        assert_eq!(ctx.api().create_calls(), 0);
    }

    #[tokio::test]
    async fn test_submit_on_closed_form() {
        let locations = Locations::embedded().unwrap();
        let notifier = RecordingNotifier::default();
        let ctx = UserContext::new(StubApi::new(vec![]));
        let mut form = FormMachine::new(&ctx, &locations, &notifier, CreateMode);

        assert!(matches!(form.submit().await, Err(UsersError::FormNotOpen)));
        assert!(matches!(
            form.set_field(Field::Name, "x"),
            Err(UsersError::FormNotOpen)
        ));
    }

    #[tokio::test]
    async fn test_cancel_discards_create_draft() {
        let locations = Locations::embedded().unwrap();
        let notifier = RecordingNotifier::default();
        let ctx = UserContext::new(StubApi::new(vec![]));
        let mut form = FormMachine::new(&ctx, &locations, &notifier, CreateMode);

        form.open().unwrap();
        fill(&mut form, &valid_draft());
        form.cancel().unwrap();

        assert_eq!(form.state(), FormState::Closed);
        assert_eq!(form.draft(), &Draft::default());
        assert!(form.commune_options().is_empty());

        form.open().unwrap();
        assert_eq!(form.draft(), &Draft::default());
        assert!(!form.commune_enabled());
        assert!(notifier.notes().is_empty());
        assert_eq!(ctx.api().create_calls(), 0);
    }

    #[tokio::test]
    async fn test_region_change_clears_draft_commune() {
        let locations = Locations::embedded().unwrap();
        let notifier = RecordingNotifier::default();
        let ctx = UserContext::new(StubApi::new(vec![]));
        let mut form = FormMachine::new(&ctx, &locations, &notifier, CreateMode);

        form.open().unwrap();
        form.select_region("Metropolitana").unwrap();
        form.select_commune("Santiago").unwrap();
        form.select_region("Metropolitana").unwrap();

        assert_eq!(form.draft().commune, "");
        assert_eq!(form.selector().commune(), "");
        assert_eq!(form.commune_options(), locations.communes("Metropolitana"));
    }

    #[tokio::test]
    async fn test_update_open_primes_communes_from_user_region() {
        let locations = Locations::embedded().unwrap();
        let notifier = RecordingNotifier::default();
        let ctx = UserContext::new(StubApi::new(vec![]));
        let user = sample_user("7");
        let mut form = FormMachine::new(&ctx, &locations, &notifier, UpdateMode::new(user.clone()));

        form.open().unwrap();

        assert!(form.commune_enabled());
        assert_eq!(form.commune_options(), locations.communes("Valparaíso"));
        assert!(form.selector().is_candidate(&form.draft().commune));
        assert_eq!(form.draft(), &Draft::from(&user));
    }

    #[tokio::test]
    async fn test_update_submits_through_update_call() {
        let locations = Locations::embedded().unwrap();
        let notifier = RecordingNotifier::default();
        let ctx = UserContext::new(StubApi::new(vec![sample_user("7")]));
        let mut form = FormMachine::new(&ctx, &locations, &notifier, UpdateMode::new(sample_user("7")));

        form.open().unwrap();
        form.set_field(Field::Phone, "223456789").unwrap();
        let outcome = form.submit().await.unwrap();

        assert!(matches!(outcome, SubmitOutcome::Saved { .. }));
        assert_eq!(ctx.api().update_calls(), 1);
        assert_eq!(ctx.api().create_calls(), 0);
        let sent = ctx.api().last_draft().unwrap();
        assert_eq!(sent.id.as_ref().map(|id| id.0.as_str()), Some("7"));
        assert_eq!(sent.phone, "223456789");
    }

    #[tokio::test]
    async fn test_update_resyncs_only_for_its_record() {
        let locations = Locations::embedded().unwrap();
        let notifier = RecordingNotifier::default();
        let ctx = UserContext::new(StubApi::new(vec![sample_user("7"), sample_user("8")]));
        ctx.get_users().await.unwrap();
        let mut form = FormMachine::new(&ctx, &locations, &notifier, UpdateMode::new(sample_user("7")));

        form.open().unwrap();
        form.set_field(Field::Name, "Edited").unwrap();

        let mut other = sample_user("8");
        other.name = "Changed elsewhere".to_string();
        ctx.api().set_users(vec![sample_user("7"), other]);
        ctx.get_users().await.unwrap();
        assert!(!form.sync());
        assert_eq!(form.draft().name, "Edited");

        let mut mine = sample_user("7");
        mine.region = "Metropolitana".to_string();
        mine.commune = "Providencia".to_string();
        ctx.api().set_users(vec![mine.clone()]);
        ctx.get_users().await.unwrap();
        assert!(form.sync());
        assert_eq!(form.draft(), &Draft::from(&mine));
        assert_eq!(form.commune_options(), locations.communes("Metropolitana"));
    }

    #[tokio::test]
    async fn test_sync_after_close_is_noop() {
        let locations = Locations::embedded().unwrap();
        let notifier = RecordingNotifier::default();
        let ctx = UserContext::new(StubApi::new(vec![]));
        let mut form = FormMachine::new(&ctx, &locations, &notifier, UpdateMode::new(sample_user("7")));

        form.open().unwrap();
        form.cancel().unwrap();
        let mut changed = sample_user("7");
        changed.name = "Changed".to_string();
        ctx.api().set_users(vec![changed]);
        ctx.get_users().await.unwrap();
        assert!(!form.sync());
    }

    #[tokio::test]
    async fn test_dropped_submit_returns_to_open() {
        let locations = Locations::embedded().unwrap();
        let notifier = RecordingNotifier::default();
        let ctx = UserContext::new(PendingApi);
        let mut form = FormMachine::new(&ctx, &locations, &notifier, CreateMode);

        form.open().unwrap();
        form.set_field(Field::Name, "Ana Pérez").unwrap();
        form.set_field(Field::Email, "ana@example.com").unwrap();
        form.set_field(Field::Phone, "912345678").unwrap();
        form.select_region("Metropolitana").unwrap();
        form.select_commune("Santiago").unwrap();

        tokio::select! {
            biased;
            _ = form.submit() => panic!("pending call resolved"),
            _ = std::future::ready(()) => {}
        }

        assert_eq!(form.state(), FormState::Open);
        assert_eq!(form.draft(), &valid_draft());
        assert!(notifier.notes().is_empty());
    }

    struct PendingApi;

    #[async_trait::async_trait]
    impl UserApi for PendingApi {
        async fn list_users(&self) -> Result<Vec<User>> {
            Ok(Vec::new())
        }

        async fn create_user(&self, _draft: &Draft) -> Result<crate::context::ApiMessage> {
            std::future::pending().await
        }

        async fn update_user(&self, _draft: &Draft) -> Result<crate::context::ApiMessage> {
            std::future::pending().await
        }
    }
}
