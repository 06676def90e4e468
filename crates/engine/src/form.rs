//! Modal create/edit form lifecycle.
//!
//! A form is `Open` while the user edits it, `Submitting` while its single
//! request is in flight and `Closed` once the request succeeded (or the user
//! cancelled). Failures bring it back to `Open` with the error attached.
use std::collections::BTreeMap;
use std::future::Future;
use std::marker::PhantomData;

use tracing::{debug, warn};

use crate::error::{EngineError, ServiceError, ValidationErrors};

pub type FormValues = BTreeMap<&'static str, String>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldDef {
    pub key: &'static str,
    pub label: &'static str,
    pub required: bool,
    pub placeholder: &'static str,
}

impl FieldDef {
    pub const fn required(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            required: true,
            placeholder: "",
        }
    }

    pub const fn optional(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            required: false,
            placeholder: "",
        }
    }

    pub const fn hint(mut self, placeholder: &'static str) -> Self {
        self.placeholder = placeholder;
        self
    }
}

/// Field layout and validation of one kind of form.
pub trait FormModel {
    type Payload: Send + 'static;

    const TITLE: &'static str;

    fn fields() -> &'static [FieldDef];

    fn initial_values() -> FormValues {
        Self::fields()
            .iter()
            .map(|field| (field.key, String::new()))
            .collect()
    }

    /// Turn the draft into a request payload. Only called once every
    /// required field is non-blank.
    fn validate(values: &FormValues) -> Result<Self::Payload, ValidationErrors>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormPhase {
    Open,
    Submitting,
    Closed,
}

#[derive(Debug)]
pub struct ModalForm<F: FormModel> {
    values: FormValues,
    focus: usize,
    phase: FormPhase,
    field_errors: ValidationErrors,
    error: Option<String>,
    _model: PhantomData<F>,
}

impl<F: FormModel> Default for ModalForm<F> {
    fn default() -> Self {
        Self::open()
    }
}

impl<F: FormModel> ModalForm<F> {
    pub fn open() -> Self {
        Self::with_values(F::initial_values())
    }

    /// Open pre-filled, e.g. to edit an existing record.
    pub fn with_values(values: FormValues) -> Self {
        Self {
            values,
            focus: 0,
            phase: FormPhase::Open,
            field_errors: ValidationErrors::new(),
            error: None,
            _model: PhantomData,
        }
    }

    pub fn title(&self) -> &'static str {
        F::TITLE
    }

    pub fn fields(&self) -> &'static [FieldDef] {
        F::fields()
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase != FormPhase::Closed
    }

    pub fn value(&self, key: &str) -> &str {
        self.values.get(key).map_or("", String::as_str)
    }

    pub fn set_value(&mut self, key: &'static str, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    pub fn field_error(&self, key: &str) -> Option<&str> {
        self.field_errors.get(key)
    }

    pub fn field_errors(&self) -> &ValidationErrors {
        &self.field_errors
    }

    /// Message of the last failed request.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn focused_field(&self) -> Option<&'static FieldDef> {
        F::fields().get(self.focus)
    }

    pub fn focus_next(&mut self) {
        let len = F::fields().len();
        if len > 0 {
            self.focus = (self.focus + 1) % len;
        }
    }

    pub fn focus_prev(&mut self) {
        let len = F::fields().len();
        if len > 0 {
            self.focus = (self.focus + len - 1) % len;
        }
    }

    pub fn input(&mut self, ch: char) {
        if let Some(field) = self.focused_field() {
            self.values.entry(field.key).or_default().push(ch);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.focused_field()
            && let Some(value) = self.values.get_mut(field.key)
        {
            value.pop();
        }
    }

    pub fn cancel(&mut self) {
        self.phase = FormPhase::Closed;
    }

    /// Validate the draft and move to `Submitting`.
    ///
    /// Returns `None` when the form is not open or the draft is invalid; the
    /// field errors are then available through [`Self::field_error`].
    pub fn prepare(&mut self) -> Option<F::Payload> {
        if self.phase != FormPhase::Open {
            return None;
        }
        match self.validate() {
            Ok(payload) => {
                self.field_errors = ValidationErrors::new();
                self.error = None;
                self.phase = FormPhase::Submitting;
                Some(payload)
            }
            Err(errors) => {
                debug!(form = F::TITLE, errors = %errors, "form rejected before submit");
                self.field_errors = errors;
                None
            }
        }
    }

    /// Record the outcome of the request issued after [`Self::prepare`].
    ///
    /// On success `on_success` runs first, then the form closes. On failure
    /// the message is kept and the form stays open for another attempt.
    pub fn finish<R>(
        &mut self,
        result: Result<R, ServiceError>,
        on_success: impl FnOnce(&R),
    ) -> Result<R, ServiceError> {
        match result {
            Ok(response) => {
                on_success(&response);
                self.phase = FormPhase::Closed;
                Ok(response)
            }
            Err(err) => {
                warn!(form = F::TITLE, error = %err, "form submit failed");
                self.error = Some(err.to_string());
                self.phase = FormPhase::Open;
                Err(err)
            }
        }
    }

    /// Validate, send one request through `call`, and record its outcome.
    ///
    /// A form that is already submitting or closed sends nothing and answers
    /// [`EngineError::NotOpen`].
    pub async fn submit<R, C, Fut>(
        &mut self,
        call: C,
        on_success: impl FnOnce(&R),
    ) -> Result<R, EngineError>
    where
        C: FnOnce(F::Payload) -> Fut,
        Fut: Future<Output = Result<R, ServiceError>>,
    {
        if self.phase != FormPhase::Open {
            return Err(EngineError::NotOpen);
        }
        let Some(payload) = self.prepare() else {
            return Err(EngineError::Validation(self.field_errors.clone()));
        };
        let result = call(payload).await;
        Ok(self.finish(result, on_success)?)
    }

    fn validate(&self) -> Result<F::Payload, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for field in F::fields().iter().filter(|field| field.required) {
            if self.value(field.key).trim().is_empty() {
                errors.add(field.key, format!("{} is required", field.label));
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        F::validate(&self.values)
    }
}
