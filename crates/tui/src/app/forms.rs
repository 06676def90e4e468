//! Modal forms open over a section and what happens when they are sent.
use api_types::ItemId;
use engine::forms::{
    BroadcastForm, CreditsForm, LoanDisbursementForm, PayoutRequestForm, PayoutStatusForm,
    ProductMetadataForm, RepaymentForm, TripForm, VfdReceiptForm, WalletTopUpForm,
};
use engine::{
    FieldDef, FormModel, FormPhase, ModalForm, NavigationContext, RouteId, ServiceError,
};
use tracing::debug;

use super::{AppState, ToastState};

/// Draft editing surface shared by every form, whatever its payload.
pub trait FormView {
    fn title(&self) -> &'static str;
    fn fields(&self) -> &'static [FieldDef];
    fn value(&self, key: &str) -> &str;
    fn field_error(&self, key: &str) -> Option<&str>;
    fn error(&self) -> Option<&str>;
    fn focus(&self) -> usize;
    fn submitting(&self) -> bool;
    fn focus_next(&mut self);
    fn focus_prev(&mut self);
    fn input(&mut self, ch: char);
    fn backspace(&mut self);
}

impl<F: FormModel> FormView for ModalForm<F> {
    fn title(&self) -> &'static str {
        ModalForm::title(self)
    }

    fn fields(&self) -> &'static [FieldDef] {
        ModalForm::fields(self)
    }

    fn value(&self, key: &str) -> &str {
        ModalForm::value(self, key)
    }

    fn field_error(&self, key: &str) -> Option<&str> {
        ModalForm::field_error(self, key)
    }

    fn error(&self) -> Option<&str> {
        ModalForm::error(self)
    }

    fn focus(&self) -> usize {
        ModalForm::focus(self)
    }

    fn submitting(&self) -> bool {
        self.phase() == FormPhase::Submitting
    }

    fn focus_next(&mut self) {
        ModalForm::focus_next(self)
    }

    fn focus_prev(&mut self) {
        ModalForm::focus_prev(self)
    }

    fn input(&mut self, ch: char) {
        ModalForm::input(self, ch)
    }

    fn backspace(&mut self) {
        ModalForm::backspace(self)
    }
}

/// Form models that can sit in [`ActiveForm`].
pub trait FormSlot: FormModel + Sized {
    fn slot(form: &mut ActiveForm) -> Option<&mut ModalForm<Self>>;
}

macro_rules! active_forms {
    ($($variant:ident => $model:ty),* $(,)?) => {
        pub enum ActiveForm {
            $($variant(ModalForm<$model>),)*
        }

        impl ActiveForm {
            pub fn view(&self) -> &dyn FormView {
                match self {
                    $(Self::$variant(form) => form,)*
                }
            }

            pub fn view_mut(&mut self) -> &mut dyn FormView {
                match self {
                    $(Self::$variant(form) => form,)*
                }
            }
        }

        $(
            impl From<ModalForm<$model>> for ActiveForm {
                fn from(form: ModalForm<$model>) -> Self {
                    Self::$variant(form)
                }
            }

            impl FormSlot for $model {
                fn slot(form: &mut ActiveForm) -> Option<&mut ModalForm<Self>> {
                    match form {
                        ActiveForm::$variant(inner) => Some(inner),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }
            }
        )*
    };
}

active_forms! {
    Loan => LoanDisbursementForm,
    Repayment => RepaymentForm,
    Vfd => VfdReceiptForm,
    TopUp => WalletTopUpForm,
    Trip => TripForm,
    Broadcast => BroadcastForm,
    Credits => CreditsForm,
    ProductMetadata => ProductMetadataForm,
    Payout => PayoutStatusForm,
    PayoutRequest => PayoutRequestForm,
}

/// Open form plus the record it edits, if any.
pub struct FormState {
    pub form: ActiveForm,
    pub target: Option<ItemId>,
    /// Request in flight for this draft, if it was sent.
    pub submission: Option<u64>,
}

impl FormState {
    pub fn create(form: impl Into<ActiveForm>) -> Self {
        Self {
            form: form.into(),
            target: None,
            submission: None,
        }
    }

    pub fn edit(form: impl Into<ActiveForm>, target: ItemId) -> Self {
        Self {
            form: form.into(),
            target: Some(target),
            submission: None,
        }
    }
}

/// Close the loop on a submitted form.
///
/// A write the server accepted flags every route in `refetch`, whether or not
/// the form is still open. Only the draft that sent `submission` is settled:
/// on success it closes and `done` is toasted, on failure it stays open with
/// the server's message.
pub fn settle<F: FormSlot, R>(
    state: &mut AppState,
    nav: &mut NavigationContext,
    submission: u64,
    result: Result<R, ServiceError>,
    refetch: &[RouteId],
    done: &str,
) {
    if result.is_ok() {
        for route in refetch {
            nav.set_refetch(*route);
        }
    }
    let form = state
        .form
        .as_mut()
        .filter(|open| open.submission == Some(submission))
        .and_then(|open| F::slot(&mut open.form));
    let Some(form) = form else {
        debug!(form = F::TITLE, submission, "response for a closed form");
        state.toast = Some(match result {
            Ok(_) => ToastState::success(done),
            Err(err) => ToastState::error(err.to_string()),
        });
        return;
    };
    if form.finish(result, |_| {}).is_ok() {
        state.form = None;
        state.toast = Some(ToastState::success(done));
    }
}
