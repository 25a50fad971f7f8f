//! Tracker form and record list, built into the element tree
//!
//! The renderer mounts into the element carrying [`MOUNT_POINT_ID`], builds
//! the static form once in [`Renderer::init`] and rebuilds the record list
//! after every change. Buttons carry an [`Action`]; the host calls
//! [`Renderer::click`] with the node the user activated.

use crate::dom::{Document, ElementBuilder, NodeId};
use crate::error::{Result, TrackerError};
use crate::storage::KeyValueStore;
use crate::tracker::{amount, CalorieTracker, RecordId, RecordKind};

pub const MOUNT_POINT_ID: &str = "calorie-tracker-container";

pub const TITLE: &str = "Calorie Tracker";
pub const INPUT_PLACEHOLDER: &str = "Enter calories";
pub const ADD_GAINED_LABEL: &str = "Add Gained Calories";
pub const ADD_BURNED_LABEL: &str = "Add Burned Calories";
pub const EDIT_LABEL: &str = "Edit";
pub const DELETE_LABEL: &str = "Delete";
pub const EMPTY_TEXT: &str = "No calorie records found.";
pub const INVALID_AMOUNT_MESSAGE: &str = "Please enter a valid calorie amount!";
pub const EDIT_PROMPT_LABEL: &str = "Enter new amount";

/// What a clickable element does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add(RecordKind),
    Edit(RecordId),
    Delete(RecordId),
}

/// Synchronous question to the user; `None` means cancelled
pub trait Prompt {
    fn prompt(&mut self, label: &str, seed: &str) -> Option<String>;
}

/// An edit waiting for the user's answer
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEdit {
    pub record: RecordId,
    pub label: &'static str,
    pub seed: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Click {
    /// The action ran to completion
    Handled,
    /// The host must ask the user, then call [`Renderer::finish_edit`]
    Prompt(PendingEdit),
    /// Nothing to do: no action on the node, or the record is gone
    Ignored,
}

#[derive(Debug, Clone, Copy)]
struct Form {
    input: NodeId,
    err_message: NodeId,
    details: NodeId,
}

#[derive(Debug, Clone, Copy)]
enum RenderState {
    Uninitialized,
    Initialized(Form),
}

pub struct Renderer<S> {
    doc: Document<Action>,
    container: NodeId,
    tracker: CalorieTracker<S>,
    state: RenderState,
}

impl<S: KeyValueStore> Renderer<S> {
    /// Attach to the mount point of `doc`
    pub fn mount(doc: Document<Action>, tracker: CalorieTracker<S>) -> Result<Self> {
        let container = doc
            .get_element_by_id(MOUNT_POINT_ID)
            .ok_or_else(|| TrackerError::MountPointMissing(MOUNT_POINT_ID.to_string()))?;

        Ok(Self {
            doc,
            container,
            tracker,
            state: RenderState::Uninitialized,
        })
    }

    pub fn document(&self) -> &Document<Action> {
        &self.doc
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn tracker(&self) -> &CalorieTracker<S> {
        &self.tracker
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state, RenderState::Initialized(_))
    }

    fn form(&self) -> Result<Form> {
        match self.state {
            RenderState::Initialized(form) => Ok(form),
            RenderState::Uninitialized => Err(TrackerError::NotInitialized),
        }
    }

    /// Build the static form and render the list once
    pub fn init(&mut self) -> Result<()> {
        if self.is_initialized() {
            return Err(TrackerError::AlreadyInitialized);
        }

        let doc = &mut self.doc;
        let content = ElementBuilder::create(doc, "div")
            .styles(&["content"])
            .append_to(self.container)
            .build();

        ElementBuilder::create(doc, "h1")
            .text(TITLE)
            .styles(&["title-custom"])
            .append_to(content);

        let input = ElementBuilder::create(doc, "input")
            .styles(&["inp"])
            .input_type("number")
            .name("amount")
            .placeholder(INPUT_PLACEHOLDER)
            .append_to(content)
            .build();

        let err_message = ElementBuilder::create(doc, "p")
            .styles(&["err-message"])
            .append_to(content)
            .build();

        ElementBuilder::create(doc, "button")
            .text(ADD_GAINED_LABEL)
            .onclick(Action::Add(RecordKind::Gained))
            .styles(&["tracker-button"])
            .append_to(content);

        ElementBuilder::create(doc, "button")
            .text(ADD_BURNED_LABEL)
            .onclick(Action::Add(RecordKind::Burned))
            .styles(&["tracker-button"])
            .append_to(content);

        let details = ElementBuilder::create(doc, "div")
            .id("divDetails")
            .styles(&["tracker-table"])
            .append_to(content)
            .build();

        self.state = RenderState::Initialized(Form {
            input,
            err_message,
            details,
        });
        tracing::debug!("Tracker form mounted");

        self.update_calorie_list()
    }

    /// Validation gate of the add path. Clears the previous message and
    /// sets it again when `value` is unusable.
    pub fn check_value(&mut self, value: Option<&str>) -> Result<bool> {
        let err_message = self.form()?.err_message;
        self.doc.set_text(err_message, "");

        let valid = value
            .and_then(amount::parse_strict)
            .map(|v| v > 0.0)
            .unwrap_or(false);
        if !valid {
            self.doc.set_text(err_message, INVALID_AMOUNT_MESSAGE);
        }
        Ok(valid)
    }

    /// Add the input's amount as `kind`. Returns whether a record was added.
    pub fn submit(&mut self, kind: RecordKind) -> Result<bool> {
        let input = self.form()?.input;
        let raw = ElementBuilder::select(&mut self.doc, input).get_value();
        if !self.check_value(Some(&raw))? {
            tracing::debug!("Rejected {} amount '{}'", kind, raw);
            return Ok(false);
        }

        let added = self.tracker.add(kind, &raw);
        if let Err(TrackerError::InvalidAmount(_)) = added {
            return Ok(false);
        }
        // The record is in memory even when the slot write failed
        self.set_input_value(None)?;
        self.update_calorie_list()?;
        added.map(|_| true)
    }

    /// Rebuild the record list from scratch
    pub fn update_calorie_list(&mut self) -> Result<()> {
        let details = self.form()?.details;
        self.doc.clear_children(details);

        if self.tracker.is_empty() {
            self.doc.set_text(details, EMPTY_TEXT);
            return Ok(());
        }

        let list = ElementBuilder::create(&mut self.doc, "ul")
            .styles(&["calorie-list"])
            .append_to(details)
            .build();

        for record in self.tracker.records() {
            let item = ElementBuilder::create(&mut self.doc, "li")
                .styles(&["calorie-item"])
                .append_to(list)
                .build();

            ElementBuilder::create(&mut self.doc, "span")
                .text(&record.label())
                .append_to(item);

            ElementBuilder::create(&mut self.doc, "button")
                .text(EDIT_LABEL)
                .styles(&["btn-edit"])
                .onclick(Action::Edit(record.id))
                .append_to(item);

            ElementBuilder::create(&mut self.doc, "button")
                .text(DELETE_LABEL)
                .styles(&["btn-delete"])
                .onclick(Action::Delete(record.id))
                .append_to(item);
        }
        Ok(())
    }

    /// Run the action attached to `node`
    pub fn click(&mut self, node: NodeId) -> Result<Click> {
        self.form()?;
        let action = match self.doc.get(node).and_then(|el| el.on_click) {
            Some(action) => action,
            None => return Ok(Click::Ignored),
        };

        match action {
            Action::Add(kind) => {
                self.submit(kind)?;
                Ok(Click::Handled)
            }
            Action::Edit(record) => match self.tracker.position(record) {
                Some(index) => {
                    let seed = self
                        .tracker
                        .get(index)
                        .map(|r| amount::format_amount(r.amount))
                        .unwrap_or_default();
                    Ok(Click::Prompt(PendingEdit {
                        record,
                        label: EDIT_PROMPT_LABEL,
                        seed,
                    }))
                }
                None => {
                    tracing::debug!("Edit of vanished record {}", record);
                    Ok(Click::Ignored)
                }
            },
            Action::Delete(record) => match self.tracker.remove_by_id(record) {
                Ok(_) => {
                    self.update_calorie_list()?;
                    Ok(Click::Handled)
                }
                Err(TrackerError::UnknownRecord(_)) => {
                    tracing::debug!("Delete of vanished record {}", record);
                    Ok(Click::Ignored)
                }
                Err(e) => {
                    self.update_calorie_list()?;
                    Err(e)
                }
            },
        }
    }

    /// Complete an edit. A cancelled prompt changes nothing; an unusable
    /// amount is dropped without a message.
    pub fn finish_edit(&mut self, pending: PendingEdit, answer: Option<String>) -> Result<()> {
        let answer = match answer {
            Some(answer) => answer,
            None => return Ok(()),
        };

        let result = self.tracker.edit_by_id(pending.record, &answer);
        self.update_calorie_list()?;
        match result {
            Ok(()) => Ok(()),
            Err(TrackerError::InvalidAmount(raw)) => {
                tracing::debug!("Ignoring edit of {} to '{}'", pending.record, raw);
                Ok(())
            }
            Err(TrackerError::UnknownRecord(id)) => {
                tracing::debug!("Edit target {} is gone", id);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Click `node`, answering any prompt through `prompt`
    pub fn click_with(&mut self, node: NodeId, prompt: &mut impl Prompt) -> Result<Click> {
        match self.click(node)? {
            Click::Prompt(pending) => {
                let answer = prompt.prompt(pending.label, &pending.seed);
                self.finish_edit(pending, answer)?;
                Ok(Click::Handled)
            }
            other => Ok(other),
        }
    }

    pub fn input(&self) -> Result<NodeId> {
        Ok(self.form()?.input)
    }

    pub fn input_value(&self) -> Result<String> {
        let input = self.form()?.input;
        Ok(self.doc.get(input).map(|el| el.value.clone()).unwrap_or_default())
    }

    pub fn set_input_value(&mut self, value: Option<&str>) -> Result<()> {
        let input = self.form()?.input;
        ElementBuilder::select(&mut self.doc, input).set_value(value);
        Ok(())
    }

    pub fn error_message(&self) -> Result<String> {
        Ok(self.doc.text_content(self.form()?.err_message))
    }

    /// Text of every rendered list item, in order
    pub fn list_texts(&self) -> Result<Vec<String>> {
        let details = self.form()?.details;
        Ok(self
            .doc
            .descendants(details)
            .into_iter()
            .filter_map(|n| self.doc.get(n))
            .filter(|el| el.tag == "span")
            .map(|el| el.text.clone())
            .collect())
    }

    /// Whole text of the details area, the empty-state text included
    pub fn details_text(&self) -> Result<String> {
        Ok(self.doc.text_content(self.form()?.details))
    }

    /// Inputs and buttons of the mounted form in document order
    pub fn focusable(&self) -> Vec<NodeId> {
        self.doc.focusable(self.container)
    }

    /// Buttons carrying `class`, in list order
    pub fn buttons(&self, class: &str) -> Vec<NodeId> {
        self.doc.elements_by_class(self.container, class)
    }

    pub fn summary(&self) -> String {
        let totals = self.tracker.totals();
        format!(
            "Gained {} │ Burned {} │ Net {:+}",
            amount::format_amount(amount::round_total(totals.gained)),
            amount::format_amount(amount::round_total(totals.burned)),
            amount::round_total(totals.net())
        )
    }
}
