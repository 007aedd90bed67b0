//! # Registration
//!
//! Validate a draft, insert it once, tell the user how it went.
//!
//! ```text
//! Idle -> Submitting -> Success -> Idle
//!                    -> Failed  -> Idle
//! ```
//!
//! A successful insert resets the draft; a failed one keeps it so the user can
//! try again. Nothing is retried automatically and nothing is deduplicated: two
//! drafts submitted separately become two rows.
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    database::RecordStore,
    models::Entity,
    notify::{Notice, Notifier},
    schema::{BrandForm, FieldErrors, Form, KocForm},
};

pub const SUCCESS_TITLE: &str = "Đăng ký thành công!";
pub const FAILURE_TITLE: &str = "Lỗi đăng ký";
pub const GENERIC_FAILURE: &str = "Có lỗi xảy ra, vui lòng thử lại.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitState {
    #[default]
    Idle,
    Submitting,
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Created(Uuid),
    Invalid(FieldErrors),
    Failed(String),
    /// A submission is already in flight; the button is disabled.
    Busy,
}

/// Which tab the register page opens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegisterTab {
    #[default]
    Koc,
    Brand,
}

impl RegisterTab {
    /// Anything but `brand` opens the KOC tab.
    pub fn from_query(kind: Option<&str>) -> Self {
        match kind {
            Some("brand") => RegisterTab::Brand,
            _ => RegisterTab::Koc,
        }
    }
}

/// Holds the state at `Submitting` and puts it back to `Idle` when dropped, so a
/// submit future that is cancelled mid-insert does not leave the form locked.
struct InFlight<'a> {
    state: &'a mut SubmitState,
}

impl<'a> InFlight<'a> {
    fn begin(state: &'a mut SubmitState) -> Self {
        *state = SubmitState::Submitting;
        Self { state }
    }

    fn settle(&mut self, state: SubmitState) {
        *self.state = state;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.state = SubmitState::Idle;
    }
}

fn success_message(noun: &str) -> String {
    format!("Thông tin {noun} của bạn đã được ghi nhận. Admin sẽ liên hệ sớm.")
}

pub struct Registration<F: Form> {
    draft: F,
    state: SubmitState,
}

impl<F: Form> Default for Registration<F> {
    fn default() -> Self {
        Self {
            draft: F::default(),
            state: SubmitState::Idle,
        }
    }
}

impl<F: Form> Registration<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_draft(draft: F) -> Self {
        Self {
            draft,
            state: SubmitState::Idle,
        }
    }

    pub fn draft(&self) -> &F {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut F {
        &mut self.draft
    }

    pub fn state(&self) -> SubmitState {
        self.state
    }

    /// Whether the submit control accepts a click.
    pub fn can_submit(&self) -> bool {
        self.state != SubmitState::Submitting
    }

    pub async fn submit<S, N>(&mut self, store: &S, notifier: &N) -> SubmitOutcome
    where
        S: RecordStore,
        N: Notifier + ?Sized,
    {
        if !self.can_submit() {
            return SubmitOutcome::Busy;
        }

        let record = match self.draft.validate() {
            Ok(record) => record,
            Err(errors) => return SubmitOutcome::Invalid(errors),
        };

        let entity = <F::Entity as Entity>::NOUN;
        let mut flight = InFlight::begin(&mut self.state);

        match store.insert::<F::Entity>(&record).await {
            Ok(id) => {
                info!("Registered {entity} {id}");
                flight.settle(SubmitState::Success);
                notifier.notify(Notice::success(SUCCESS_TITLE, success_message(entity)));
                self.draft.reset();
                SubmitOutcome::Created(id)
            }
            Err(e) => {
                warn!("Failed to register {entity}: {e}");
                flight.settle(SubmitState::Failed);
                let message = e.user_message().unwrap_or_else(|| GENERIC_FAILURE.to_string());
                notifier.notify(Notice::error(FAILURE_TITLE, message.clone()));
                SubmitOutcome::Failed(message)
            }
        }
    }
}

pub type KocRegistration = Registration<KocForm>;

pub type BrandRegistration = Registration<BrandForm>;
