//! List, form and tracking logic of the dashboard, independent of any UI.
//!
//! The pieces fit together like this:
//!
//! - a [`ListView`] reads its route from the [`NavigationContext`] and says
//!   when a fetch is due and with which [`ListParams`];
//! - a [`ResourceStore`] runs that fetch against a [`ResourceService`] and
//!   keeps the latest result, discarding stale ones;
//! - a [`ModalForm`] validates a draft, sends one request and reports back so
//!   the caller can flag the affected routes for refetch.
pub use api_types::ItemId;
pub use captcha::{BYPASS_TOKEN, CaptchaGate, CaptchaMode};
pub use error::{EngineError, FailureStatus, ServiceError, ValidationErrors};
pub use form::{FieldDef, FormModel, FormPhase, FormValues, ModalForm};
pub use navigation::{NavigationContext, RouteId, RouteState};
pub use params::{
    DEFAULT_PAGE, DEFAULT_PER_PAGE, FilterParams, FilterValue, ListParams, ParamsPatch, SortOrder,
};
pub use store::{
    FetchOutcome, FetchTicket, ListState, ResourceItem, ResourceService, ResourceStore,
};
pub use tracking::{DEFAULT_POLL_INTERVAL, LocationPoller, LocationSource, LocationUpdate};
pub use view::{Column, ColumnSet, ListView, TableChange, ViewPhase};

pub mod forms;
pub mod geo;
pub mod resources;

mod captcha;
mod error;
mod form;
mod navigation;
mod params;
mod store;
mod tracking;
mod view;
