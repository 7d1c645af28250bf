//! Medicine-list screen state as a tagged union.
//!
//! One enum instead of a bag of independently-nullable fields: a dialog
//! cannot be open while an error banner claims it just saved, because no
//! variant encodes that combination.

use serde::{Deserialize, Serialize};

use super::Medicine;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum UiState {
    /// Nothing in flight; the list is just being browsed.
    #[default]
    Idle,
    /// Add-medicine dialog open with a blank form.
    AddingNew,
    /// Edit dialog open for an existing medicine.
    Editing(Medicine),
    /// A save failed; message is shown until dismissed.
    ShowingError(String),
    /// A save completed; holds the saved medicine until the caller has
    /// armed its reminders, then is cleared back to `Idle`.
    JustSaved(Medicine),
}

impl UiState {
    pub fn open_add_dialog(&mut self) {
        *self = UiState::AddingNew;
    }

    pub fn open_edit_dialog(&mut self, medicine: Medicine) {
        *self = UiState::Editing(medicine);
    }

    pub fn save_succeeded(&mut self, saved: Medicine) {
        *self = UiState::JustSaved(saved);
    }

    pub fn save_failed(&mut self, message: impl Into<String>) {
        *self = UiState::ShowingError(message.into());
    }

    /// Close any dialog or banner without saving.
    pub fn dismiss(&mut self) {
        *self = UiState::Idle;
    }

    /// Take the just-saved medicine, transitioning back to `Idle`.
    /// Returns `None` when there is nothing pending.
    pub fn take_saved(&mut self) -> Option<Medicine> {
        match std::mem::take(self) {
            UiState::JustSaved(medicine) => Some(medicine),
            other => {
                *self = other;
                None
            }
        }
    }

    pub fn is_dialog_open(&self) -> bool {
        matches!(self, UiState::AddingNew | UiState::Editing(_))
    }
}
