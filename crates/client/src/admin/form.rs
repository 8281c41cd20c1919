//! Edit-form state shared by the admin views.

use thiserror::Error;

/// Where an admin form is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormState {
    /// List only; no draft open.
    #[default]
    Viewing,
    /// A draft is open and can be changed.
    Editing,
    /// The draft has been sent; the submit control is disabled.
    Submitting,
}

/// Whether a draft creates a new record or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftTarget<Id> {
    New,
    Existing(Id),
}

/// Form action not allowed in the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("no draft is open")]
    NotEditing,
    #[error("a submission is already in progress")]
    AlreadySubmitting,
}

/// Draft plus state machine for one admin form.
///
/// `Viewing -> Editing -> Submitting -> Viewing`. Leaving `Submitting` always
/// lands in `Viewing`, whether the request succeeded or not; a failure leaves
/// its message in [`EditForm::last_error`].
#[derive(Debug, Clone)]
pub struct EditForm<D, Id> {
    state: FormState,
    draft: Option<(DraftTarget<Id>, D)>,
    last_error: Option<String>,
}

impl<D: Clone, Id: Clone> EditForm<D, Id> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: FormState::Viewing,
            draft: None,
            last_error: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> FormState {
        self.state
    }

    /// Open a blank draft for a new record.
    ///
    /// # Errors
    ///
    /// Returns `FormError::AlreadySubmitting` while a submission is pending.
    pub fn begin_create(&mut self, draft: D) -> Result<(), FormError> {
        self.open(DraftTarget::New, draft)
    }

    /// Open a draft prefilled from an existing record.
    ///
    /// # Errors
    ///
    /// Returns `FormError::AlreadySubmitting` while a submission is pending.
    pub fn begin_edit(&mut self, id: Id, draft: D) -> Result<(), FormError> {
        self.open(DraftTarget::Existing(id), draft)
    }

    fn open(&mut self, target: DraftTarget<Id>, draft: D) -> Result<(), FormError> {
        if self.state == FormState::Submitting {
            return Err(FormError::AlreadySubmitting);
        }
        self.draft = Some((target, draft));
        self.state = FormState::Editing;
        self.last_error = None;
        Ok(())
    }

    #[must_use]
    pub fn draft(&self) -> Option<&D> {
        self.draft.as_ref().map(|(_, draft)| draft)
    }

    #[must_use]
    pub fn target(&self) -> Option<&DraftTarget<Id>> {
        self.draft.as_ref().map(|(target, _)| target)
    }

    /// Mutable access to the draft while editing.
    pub fn draft_mut(&mut self) -> Option<&mut D> {
        if self.state != FormState::Editing {
            return None;
        }
        self.draft.as_mut().map(|(_, draft)| draft)
    }

    /// Close the draft without submitting. Ignored while submitting.
    pub fn cancel(&mut self) {
        if self.state == FormState::Editing {
            self.draft = None;
            self.state = FormState::Viewing;
        }
    }

    /// Move to `Submitting` and hand out what should be sent.
    ///
    /// # Errors
    ///
    /// Returns `FormError::AlreadySubmitting` if a submission is pending, or
    /// `FormError::NotEditing` if no draft is open.
    pub fn start_submit(&mut self) -> Result<(DraftTarget<Id>, D), FormError> {
        match self.state {
            FormState::Submitting => Err(FormError::AlreadySubmitting),
            FormState::Viewing => Err(FormError::NotEditing),
            FormState::Editing => {
                let (target, draft) = self.draft.clone().ok_or(FormError::NotEditing)?;
                self.state = FormState::Submitting;
                Ok((target, draft))
            }
        }
    }

    /// Back out of `Submitting` before anything was sent, keeping the draft
    /// open so it can be corrected.
    pub fn reject(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
        if self.state == FormState::Submitting {
            self.state = FormState::Editing;
        }
    }

    /// Settle a submission. Always returns to `Viewing`.
    pub fn finish(&mut self, error: Option<String>) {
        self.last_error = error;
        self.draft = None;
        self.state = FormState::Viewing;
    }

    /// Message of the last failed submission.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

impl<D: Clone, Id: Clone> Default for EditForm<D, Id> {
    fn default() -> Self {
        Self::new()
    }
}
