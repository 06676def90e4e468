mod actions;
mod forms;
mod screens;
mod tracking;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use api_types::ItemId;
use api_types::assistant::{AssistantStatistics, TopEntry};
use api_types::loan::LoanStatistics;
use api_types::payout::{Payout, PayoutRequest, PayoutRequestStatus, PayoutStatus};
use chrono_tz::Tz;
use client::Client;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use engine::forms::{
    BroadcastForm, CreditsForm, LoanDisbursementForm, PayoutRequestForm, PayoutStatusForm,
    ProductMetadataForm, RepaymentForm, TripForm, VfdReceiptForm, WalletTopUpForm,
};
use engine::resources::{AwaitingAnswer, OrderTab, PayoutView};
use engine::{
    CaptchaGate, CaptchaMode, LocationPoller, LocationUpdate, ModalForm, NavigationContext,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::{
    config::{AppConfig, Role},
    error::{AppError, Result},
    local_state::LocalState,
    ui::{
        self,
        keymap::{self, AppAction},
    },
};

pub use forms::{ActiveForm, FormState, FormView};
pub use screens::{ListScreen, ResourceScreen, Screens};
pub use tracking::TrackingState;

use screens::parse_filter;

const TOAST_TTL: Duration = Duration::from_secs(4);

/// State change computed off the UI loop, applied on it.
pub type Apply = Box<dyn FnOnce(&mut AppState, &mut NavigationContext) + Send>;

pub enum AppEvent {
    Apply(Apply),
    Unauthenticated,
}

pub type EventSender = UnboundedSender<AppEvent>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Main,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Loans,
    Repayments,
    Payouts,
    Trips,
    Tracking,
    Vfd,
    Wallet,
    Broadcasts,
    Assistant,
    SellerLoans,
    SellerRepayments,
    Orders,
    PayoutRequests,
    Products,
}

impl Section {
    pub fn label(self) -> &'static str {
        match self {
            Self::Loans => "Loans",
            Self::Repayments => "Repayments",
            Self::Payouts => "Payouts",
            Self::Trips => "Trips",
            Self::Tracking => "Tracking",
            Self::Vfd => "VFD",
            Self::Wallet => "Wallet",
            Self::Broadcasts => "Broadcasts",
            Self::Assistant => "AI Assistant",
            Self::SellerLoans => "My loans",
            Self::SellerRepayments => "My repayments",
            Self::Orders => "Orders",
            Self::PayoutRequests => "Withdrawals",
            Self::Products => "AI products",
        }
    }

    pub fn for_role(role: Role) -> &'static [Section] {
        match role {
            Role::Admin => &[
                Self::Loans,
                Self::Repayments,
                Self::Payouts,
                Self::Trips,
                Self::Tracking,
                Self::Vfd,
                Self::Wallet,
                Self::Broadcasts,
                Self::Assistant,
                Self::Orders,
                Self::PayoutRequests,
                Self::Products,
            ],
            Role::Seller => &[Self::SellerLoans, Self::SellerRepayments],
        }
    }

    pub fn home(role: Role) -> Self {
        match role {
            Role::Admin => Self::Loans,
            Role::Seller => Self::SellerLoans,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripsView {
    Trips,
    OptimizationLogs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct ToastState {
    pub message: String,
    pub level: ToastLevel,
    shown_at: Instant,
}

impl ToastState {
    fn new(message: impl Into<String>, level: ToastLevel) -> Self {
        Self {
            message: message.into(),
            level,
            shown_at: Instant::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, ToastLevel::Info)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, ToastLevel::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, ToastLevel::Error)
    }

    fn expired(&self) -> bool {
        self.shown_at.elapsed() >= TOAST_TTL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Token,
    Captcha,
}

#[derive(Debug, Default)]
pub struct LoginState {
    pub token: String,
    pub captcha: String,
    pub focus: LoginField,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Search,
    Filter,
}

#[derive(Debug, Clone)]
pub struct Prompt {
    pub kind: PromptKind,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    Delete(ItemId),
    CompleteTrip(ItemId),
    DeleteOrders(Vec<ItemId>),
}

#[derive(Debug, Clone)]
pub struct Confirm {
    pub action: ConfirmAction,
}

#[derive(Debug, Default)]
pub struct AssistantPanel {
    pub stats: Option<AssistantStatistics>,
    pub top_filters: Vec<TopEntry>,
    pub top_exclusions: Vec<TopEntry>,
    pub error: Option<String>,
}

pub struct AppState {
    pub screen: Screen,
    pub login: LoginState,
    pub role: Role,
    pub section: Section,
    pub screens: Screens,
    pub payout_view: PayoutView,
    pub payout_request_view: PayoutView,
    pub order_tab: OrderTab,
    /// Orders picked for the next bulk delete.
    pub marked_orders: BTreeSet<ItemId>,
    pub trips_view: TripsView,
    pub tracking: TrackingState,
    pub tracking_refresh: bool,
    pub assistant: AssistantPanel,
    pub seller_stats: Option<LoanStatistics>,
    pub form: Option<FormState>,
    /// Last submission id handed to a form.
    pub submissions: u64,
    pub prompt: Option<Prompt>,
    pub confirm: Option<Confirm>,
    pub toast: Option<ToastState>,
    pub base_url: String,
    pub tz: Tz,
    pub captcha_enabled: bool,
    pub poll_interval: Duration,
}

impl AppState {
    pub fn new(config: &AppConfig, client: &Client, captcha_enabled: bool, signed_in: bool) -> Self {
        Self {
            screen: if signed_in {
                Screen::Main
            } else {
                Screen::Login
            },
            login: LoginState::default(),
            role: config.role,
            section: Section::home(config.role),
            screens: Screens::new(client, config.per_page),
            payout_view: PayoutView::Pending,
            payout_request_view: PayoutView::Pending,
            order_tab: OrderTab::All,
            marked_orders: BTreeSet::new(),
            trips_view: TripsView::Trips,
            tracking: TrackingState::default(),
            tracking_refresh: false,
            assistant: AssistantPanel::default(),
            seller_stats: None,
            form: None,
            submissions: 0,
            prompt: None,
            confirm: None,
            toast: None,
            base_url: config.base_url.clone(),
            tz: config.tz(),
            captcha_enabled,
            poll_interval: config.poll_interval(),
        }
    }

    pub fn sections(&self) -> &'static [Section] {
        Section::for_role(self.role)
    }

    /// Table of the current section; `None` on the tracking board.
    pub fn active_list(&self) -> Option<&dyn ListScreen> {
        let screens = &self.screens;
        match self.section {
            Section::Loans => Some(&screens.loans),
            Section::Repayments => Some(&screens.repayments),
            Section::Payouts => Some(&screens.payouts),
            Section::Trips => match self.trips_view {
                TripsView::Trips => Some(&screens.trips),
                TripsView::OptimizationLogs => Some(&screens.optimization_logs),
            },
            Section::Tracking => None,
            Section::Vfd => Some(&screens.vfd_receipts),
            Section::Wallet => Some(&screens.wallet),
            Section::Broadcasts => Some(&screens.broadcasts),
            Section::Assistant => Some(&screens.assistant_logs),
            Section::SellerLoans => Some(&screens.seller_loans),
            Section::SellerRepayments => Some(&screens.seller_repayments),
            Section::Orders => Some(&screens.orders),
            Section::PayoutRequests => Some(&screens.payout_requests),
            Section::Products => Some(&screens.products),
        }
    }

    pub fn active_list_mut(&mut self) -> Option<&mut dyn ListScreen> {
        let screens = &mut self.screens;
        match self.section {
            Section::Loans => Some(&mut screens.loans),
            Section::Repayments => Some(&mut screens.repayments),
            Section::Payouts => Some(&mut screens.payouts),
            Section::Trips => match self.trips_view {
                TripsView::Trips => Some(&mut screens.trips),
                TripsView::OptimizationLogs => Some(&mut screens.optimization_logs),
            },
            Section::Tracking => None,
            Section::Vfd => Some(&mut screens.vfd_receipts),
            Section::Wallet => Some(&mut screens.wallet),
            Section::Broadcasts => Some(&mut screens.broadcasts),
            Section::Assistant => Some(&mut screens.assistant_logs),
            Section::SellerLoans => Some(&mut screens.seller_loans),
            Section::SellerRepayments => Some(&mut screens.seller_repayments),
            Section::Orders => Some(&mut screens.orders),
            Section::PayoutRequests => Some(&mut screens.payout_requests),
            Section::Products => Some(&mut screens.products),
        }
    }

    /// Payout rows the current view shows.
    pub fn visible_payouts(&self) -> Vec<&Payout> {
        self.payout_view
            .visible(self.screens.payouts.items())
            .collect()
    }

    pub fn selected_payout(&self) -> Option<&Payout> {
        selected_visible(self.payout_view, &self.screens.payouts)
    }

    pub fn visible_payout_requests(&self) -> Vec<&PayoutRequest> {
        self.payout_request_view
            .visible(self.screens.payout_requests.items())
            .collect()
    }

    pub fn selected_payout_request(&self) -> Option<&PayoutRequest> {
        selected_visible(self.payout_request_view, &self.screens.payout_requests)
    }

    /// Row the delete key acts on, in tables the server lets us delete from.
    pub fn deletable_id(&self) -> Option<ItemId> {
        let deletable = match self.section {
            Section::Loans | Section::Broadcasts => true,
            Section::Trips => self.trips_view == TripsView::Trips,
            _ => false,
        };
        if !deletable {
            return None;
        }
        self.active_list()?.selected_id()
    }

    /// Marked orders, or the selected one when nothing is marked.
    pub fn orders_to_delete(&self) -> Vec<ItemId> {
        if self.marked_orders.is_empty() {
            return self.screens.orders.selected_id().into_iter().collect();
        }
        self.marked_orders.iter().copied().collect()
    }
}

fn selected_visible<T: AwaitingAnswer>(view: PayoutView, screen: &ResourceScreen<T>) -> Option<&T> {
    let rows: Vec<&T> = view.visible(screen.items()).collect();
    let index = screen.selected.min(rows.len().saturating_sub(1));
    rows.get(index).copied()
}

pub struct App {
    config: AppConfig,
    client: Client,
    pub state: AppState,
    nav: NavigationContext,
    captcha: CaptchaGate,
    poller: LocationPoller<Client>,
    local: LocalState,
    events_tx: EventSender,
    events_rx: UnboundedReceiver<AppEvent>,
    locations_rx: UnboundedReceiver<LocationUpdate>,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig, captcha: CaptchaMode) -> Result<Self> {
        let local = LocalState::load(&config.state_file).unwrap_or_else(|err| {
            warn!(error = %err, path = %config.state_file, "local state unreadable, starting fresh");
            LocalState::default()
        });
        let token = config
            .token
            .clone()
            .filter(|token| !token.trim().is_empty())
            .or_else(|| local.token.clone());

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let hook_tx = events_tx.clone();
        let client = Client::builder()
            .base_url(&config.base_url)
            .token(token.clone())
            .timeout(config.request_timeout())
            .on_unauthenticated(move || {
                if hook_tx.send(AppEvent::Unauthenticated).is_err() {
                    debug!("ui loop gone, 401 not reported");
                }
            })
            .build()?;

        let (locations_tx, locations_rx) = mpsc::unbounded_channel();
        let poller = LocationPoller::new(
            Arc::new(client.clone()),
            config.poll_interval(),
            locations_tx,
        );

        let captcha = CaptchaGate::new(captcha);
        let state = AppState::new(&config, &client, captcha.mode().is_enabled(), token.is_some());
        let mut nav = NavigationContext::new(config.per_page);
        state.screens.payouts.view.on_filter(
            &mut nav,
            "status",
            state.payout_view.status_filter::<Payout>(),
            false,
        );
        state.screens.payout_requests.view.on_filter(
            &mut nav,
            "status",
            state.payout_request_view.status_filter::<PayoutRequest>(),
            false,
        );

        Ok(Self {
            config,
            client,
            state,
            nav,
            captcha,
            poller,
            local,
            events_tx,
            events_rx,
            locations_rx,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        if self.state.screen == Screen::Main {
            self.enter_section();
        }
        let result = self.event_loop(&mut terminal).await;
        self.poller.clear();
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(200);

        while !self.should_quit {
            self.drain_events();
            self.tick();

            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(tick_rate)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key).await?
                    }
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }
        }

        Ok(())
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                AppEvent::Apply(apply) => apply(&mut self.state, &mut self.nav),
                AppEvent::Unauthenticated => self.session_expired(),
            }
        }
        while let Ok(update) = self.locations_rx.try_recv() {
            self.state.tracking.apply(update);
        }
    }

    /// Once per loop: expire the toast, issue due fetches, keep the poller on
    /// the selected trip.
    fn tick(&mut self) {
        if self.state.toast.as_ref().is_some_and(ToastState::expired) {
            self.state.toast = None;
        }
        if self.state.screen != Screen::Main {
            return;
        }
        if let Some(list) = self.state.active_list_mut() {
            list.tick(&mut self.nav, &self.events_tx);
        }
        if self.state.section == Section::Tracking {
            if std::mem::take(&mut self.state.tracking_refresh) {
                self.load_active_trips();
            }
            match self.state.tracking.selected_id() {
                Some(trip_id) => self.poller.select(trip_id),
                None if self.poller.selected().is_some() => self.poller.clear(),
                None => {}
            }
        }
    }

    async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        let typing = self.state.screen == Screen::Login
            || self.state.form.is_some()
            || self.state.prompt.is_some();
        let action = keymap::map_key(key, typing);
        if action == AppAction::Quit {
            self.should_quit = true;
            return Ok(());
        }

        if self.state.screen == Screen::Login {
            self.handle_login_key(action).await;
            return Ok(());
        }
        if self.state.form.is_some() {
            self.handle_form_key(action);
            return Ok(());
        }
        if self.state.confirm.is_some() {
            self.handle_confirm_key(action);
            return Ok(());
        }
        if self.state.prompt.is_some() {
            self.handle_prompt_key(action);
            return Ok(());
        }

        match action {
            AppAction::NextField => self.step_section(true),
            AppAction::PrevField => self.step_section(false),
            AppAction::Up => self.select(false),
            AppAction::Down => self.select(true),
            AppAction::Left => {
                if let Some(list) = self.state.active_list_mut() {
                    list.columns_mut().focus_prev();
                }
            }
            AppAction::Right => {
                if let Some(list) = self.state.active_list_mut() {
                    list.columns_mut().focus_next();
                }
            }
            AppAction::Input(ch) => self.handle_command(ch).await,
            _ => {}
        }

        Ok(())
    }

    async fn handle_login_key(&mut self, action: AppAction) {
        let login = &mut self.state.login;
        match action {
            AppAction::NextField | AppAction::PrevField | AppAction::Up | AppAction::Down => {
                if self.state.captcha_enabled {
                    login.focus = match login.focus {
                        LoginField::Token => LoginField::Captcha,
                        LoginField::Captcha => LoginField::Token,
                    };
                }
            }
            AppAction::Backspace => {
                login_field(login).pop();
            }
            AppAction::Input(ch) => login_field(login).push(ch),
            AppAction::Cancel => login.message = None,
            AppAction::Submit => self.submit_login().await,
            _ => {}
        }
    }

    async fn submit_login(&mut self) {
        let token = self.state.login.token.trim().to_string();
        if token.is_empty() {
            self.state.login.message = Some("Paste an API token.".to_string());
            return;
        }
        if self.captcha.mode().is_enabled() {
            self.captcha.solve(self.state.login.captcha.trim());
        }
        if self.captcha.token().is_none() {
            self.state.login.message = Some("Solve the captcha first.".to_string());
            return;
        }
        self.captcha.reset();

        self.client.set_token(Some(token.clone())).await;
        self.local.token = Some(token);
        self.persist_local();
        info!("api token accepted");

        self.state.login = LoginState::default();
        self.state.screen = Screen::Main;
        self.enter_section();
    }

    async fn sign_out(&mut self) {
        self.client.set_token(None).await;
        self.local.token = None;
        self.persist_local();
        self.leave_section();
        self.state.screen = Screen::Login;
        info!("signed out");
    }

    fn session_expired(&mut self) {
        if self.state.screen == Screen::Login {
            return;
        }
        warn!("api answered 401, asking for a new token");
        self.local.token = None;
        self.persist_local();
        self.leave_section();
        self.state.form = None;
        self.state.screen = Screen::Login;
        self.state.login.message = Some("Session expired. Paste a new token.".to_string());
    }

    fn persist_local(&mut self) {
        if let Err(err) = self.local.save(&self.config.state_file) {
            warn!(error = %err, path = %self.config.state_file, "could not save local state");
            self.state.toast = Some(ToastState::error(format!("Could not save token: {err}")));
        }
    }

    fn handle_form_key(&mut self, action: AppAction) {
        let Some(open) = self.state.form.as_mut() else {
            return;
        };
        let form = open.form.view_mut();
        match action {
            AppAction::Cancel => self.state.form = None,
            AppAction::NextField | AppAction::Down => form.focus_next(),
            AppAction::PrevField | AppAction::Up => form.focus_prev(),
            AppAction::Backspace => form.backspace(),
            AppAction::Input(ch) => form.input(ch),
            AppAction::Submit => self.submit_form(),
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, action: AppAction) {
        let Some(confirm) = self.state.confirm.take() else {
            return;
        };
        if action != AppAction::Input('y') {
            return;
        }
        match confirm.action {
            ConfirmAction::Delete(id) => {
                if let Some(list) = self.state.active_list() {
                    list.delete(id, &self.events_tx);
                }
            }
            ConfirmAction::CompleteTrip(id) => self.complete_trip(id),
            ConfirmAction::DeleteOrders(ids) => self.delete_orders(ids),
        }
    }

    fn handle_prompt_key(&mut self, action: AppAction) {
        let Some(prompt) = self.state.prompt.as_mut() else {
            return;
        };
        match action {
            AppAction::Cancel => self.state.prompt = None,
            AppAction::Backspace => {
                prompt.text.pop();
            }
            AppAction::Input(ch) => prompt.text.push(ch),
            AppAction::Submit => {
                if let Some(prompt) = self.state.prompt.take() {
                    self.apply_prompt(prompt);
                }
            }
            _ => {}
        }
    }

    fn apply_prompt(&mut self, prompt: Prompt) {
        let Some(list) = self.state.active_list() else {
            return;
        };
        let view = list.view();
        let rejected = match prompt.kind {
            PromptKind::Search => {
                view.on_search(&mut self.nav, &prompt.text);
                false
            }
            PromptKind::Filter => match parse_filter(&prompt.text) {
                Some((key, value)) => {
                    view.on_filter(&mut self.nav, &key, value, true);
                    false
                }
                None => true,
            },
        };
        if rejected {
            self.state.toast = Some(ToastState::error("Filters look like key=value"));
        }
    }

    async fn handle_command(&mut self, ch: char) {
        match ch {
            '1'..='9' => {
                let index = ch as usize - '1' as usize;
                if let Some(section) = self.state.sections().get(index).copied() {
                    self.switch_section(section);
                }
            }
            ']' => self.step_section(true),
            '[' => self.step_section(false),
            'j' => self.select(true),
            'k' => self.select(false),
            'L' => self.sign_out().await,
            _ if self.state.section == Section::Tracking => self.tracking_command(ch),
            _ => self.list_command(ch),
        }
    }

    fn tracking_command(&mut self, ch: char) {
        match ch {
            'r' => self.load_active_trips(),
            'C' => {
                if let Some(id) = self.state.tracking.selected_id() {
                    self.state.confirm = Some(Confirm {
                        action: ConfirmAction::CompleteTrip(id),
                    });
                }
            }
            _ => {}
        }
    }

    fn list_command(&mut self, ch: char) {
        let section = self.state.section;
        match ch {
            '/' => {
                let text = self
                    .state
                    .active_list()
                    .and_then(|list| self.nav.route(list.view().route()))
                    .and_then(|route| route.search.clone())
                    .unwrap_or_default();
                self.state.prompt = Some(Prompt {
                    kind: PromptKind::Search,
                    text,
                });
            }
            'f' => {
                self.state.prompt = Some(Prompt {
                    kind: PromptKind::Filter,
                    text: String::new(),
                })
            }
            'c' => self.clear_filters(),
            'r' => self.refresh(),
            'a' => self.open_create_form(),
            'x' if section == Section::Orders => {
                let ids = self.state.orders_to_delete();
                if !ids.is_empty() {
                    self.state.confirm = Some(Confirm {
                        action: ConfirmAction::DeleteOrders(ids),
                    });
                }
            }
            'x' => {
                if let Some(id) = self.state.deletable_id() {
                    self.state.confirm = Some(Confirm {
                        action: ConfirmAction::Delete(id),
                    });
                }
            }
            ' ' if section == Section::Orders => {
                if let Some(id) = self.state.screens.orders.selected_id() {
                    if !self.state.marked_orders.remove(&id) {
                        self.state.marked_orders.insert(id);
                    }
                }
            }
            't' if section == Section::Orders => {
                self.state.order_tab = self.state.order_tab.next();
                self.apply_order_tab(true);
            }
            'P' if matches!(section, Section::Loans | Section::SellerLoans) => {
                let loan_id = match section {
                    Section::Loans => self.state.screens.loans.selected_item().map(|l| l.id),
                    _ => self.state.screens.seller_loans.selected_item().map(|l| l.id),
                };
                let Some(loan_id) = loan_id else {
                    return;
                };
                let mut form = ModalForm::<RepaymentForm>::open();
                form.set_value("loan_id", loan_id.to_string());
                self.state.form = Some(FormState::create(form));
            }
            'e' if section == Section::Payouts => self.answer_payout(),
            'e' if section == Section::PayoutRequests => self.answer_payout_request(),
            'e' if section == Section::Products => self.edit_product_metadata(),
            'v' if section == Section::Payouts => {
                self.state.payout_view = self.state.payout_view.toggle();
                self.state.screens.payouts.selected = 0;
                self.state.screens.payouts.view.on_filter(
                    &mut self.nav,
                    "status",
                    self.state.payout_view.status_filter::<Payout>(),
                    true,
                );
            }
            'v' if section == Section::PayoutRequests => {
                self.state.payout_request_view = self.state.payout_request_view.toggle();
                self.state.screens.payout_requests.selected = 0;
                self.state.screens.payout_requests.view.on_filter(
                    &mut self.nav,
                    "status",
                    self.state.payout_request_view.status_filter::<PayoutRequest>(),
                    true,
                );
            }
            'l' if section == Section::Trips => {
                if let Some(list) = self.state.active_list_mut() {
                    list.unmount();
                }
                self.state.trips_view = match self.state.trips_view {
                    TripsView::Trips => TripsView::OptimizationLogs,
                    TripsView::OptimizationLogs => TripsView::Trips,
                };
            }
            'O' if section == Section::Trips && self.state.trips_view == TripsView::Trips => {
                if let Some(trip) = self.state.screens.trips.selected_item() {
                    self.optimize_trip(trip.id);
                }
            }
            'R' if section == Section::Broadcasts => {
                if let Some(broadcast) = self.state.screens.broadcasts.selected_item() {
                    self.resend_broadcast(broadcast.id);
                }
            }
            'u' if section == Section::Assistant => {
                let mut form = ModalForm::<CreditsForm>::open();
                let user_id = self
                    .state
                    .screens
                    .assistant_logs
                    .selected_item()
                    .and_then(|log| log.user.as_ref())
                    .and_then(|user| user.id);
                if let Some(user_id) = user_id {
                    form.set_value("user_id", user_id.to_string());
                }
                self.state.form = Some(FormState::create(form));
            }
            _ => self.table_command(ch),
        }
    }

    fn table_command(&mut self, ch: char) {
        let Some(list) = self.state.active_list_mut() else {
            return;
        };
        match ch {
            'n' => {
                list.next_page(&mut self.nav);
            }
            'p' => {
                list.prev_page(&mut self.nav);
            }
            '+' => {
                list.cycle_per_page(&mut self.nav);
            }
            'o' => {
                list.cycle_sort(&mut self.nav);
            }
            '<' => list.columns_mut().focus_prev(),
            '>' => list.columns_mut().focus_next(),
            'h' => {
                let columns = list.columns_mut();
                if let Some(key) = columns.focused().map(|column| column.key) {
                    columns.toggle(key);
                }
            }
            _ => {}
        }
    }

    fn clear_filters(&mut self) {
        if let Some(list) = self.state.active_list() {
            list.view().clear_filters(&mut self.nav);
        }
        match self.state.section {
            Section::Payouts => self.state.screens.payouts.view.on_filter(
                &mut self.nav,
                "status",
                self.state.payout_view.status_filter::<Payout>(),
                false,
            ),
            Section::PayoutRequests => self.state.screens.payout_requests.view.on_filter(
                &mut self.nav,
                "status",
                self.state.payout_request_view.status_filter::<PayoutRequest>(),
                false,
            ),
            Section::Orders => self.apply_order_tab(false),
            _ => {}
        }
    }

    /// Push the order tab's filters; marks from another tab are dropped.
    fn apply_order_tab(&mut self, reset_page: bool) {
        let orders = &mut self.state.screens.orders;
        orders.selected = 0;
        for (key, value) in self.state.order_tab.filters() {
            orders.view.on_filter(&mut self.nav, key, value, reset_page);
        }
        self.state.marked_orders.clear();
    }

    fn refresh(&mut self) {
        if let Some(list) = self.state.active_list() {
            list.view().request_refetch(&mut self.nav);
        }
        self.enter_section();
    }

    fn open_create_form(&mut self) {
        let form = match self.state.section {
            Section::Loans => FormState::create(ModalForm::<LoanDisbursementForm>::open()),
            Section::Repayments | Section::SellerRepayments => {
                FormState::create(ModalForm::<RepaymentForm>::open())
            }
            Section::Trips => FormState::create(ModalForm::<TripForm>::open()),
            Section::Vfd => FormState::create(ModalForm::<VfdReceiptForm>::open()),
            Section::Wallet => FormState::create(ModalForm::<WalletTopUpForm>::open()),
            Section::Broadcasts => FormState::create(ModalForm::<BroadcastForm>::open()),
            _ => return,
        };
        self.state.form = Some(form);
    }

    fn answer_payout(&mut self) {
        let Some(payout) = self.state.selected_payout() else {
            return;
        };
        if payout.status != PayoutStatus::Pending {
            self.state.toast = Some(ToastState::info("Only pending payouts can be answered"));
            return;
        }
        let id = payout.id;
        self.state.form = Some(FormState::edit(ModalForm::<PayoutStatusForm>::open(), id));
    }

    fn answer_payout_request(&mut self) {
        let Some(request) = self.state.selected_payout_request() else {
            return;
        };
        if request.status != PayoutRequestStatus::Processed {
            self.state.toast = Some(ToastState::info("This request was already answered"));
            return;
        }
        let id = request.id;
        self.state.form = Some(FormState::edit(ModalForm::<PayoutRequestForm>::open(), id));
    }

    fn edit_product_metadata(&mut self) {
        let Some(product) = self.state.screens.products.selected_item() else {
            return;
        };
        let mut form = ModalForm::<ProductMetadataForm>::open();
        form.set_value("product_id", product.id.to_string());
        if let Some(calories) = product.calories {
            form.set_value("calories", format!("{calories:.0}"));
        }
        form.set_value("ingredient_tags", product.ingredient_tags.join(", "));
        form.set_value("allergen_flags", product.allergen_flags.join(", "));
        if let Some(image) = &product.representative_image {
            form.set_value("representative_image", image.clone());
        }
        self.state.form = Some(FormState::edit(form, product.id));
    }

    fn step_section(&mut self, forward: bool) {
        let sections = self.state.sections();
        let Some(current) = sections.iter().position(|s| *s == self.state.section) else {
            return;
        };
        let next = if forward {
            (current + 1) % sections.len()
        } else {
            (current + sections.len() - 1) % sections.len()
        };
        self.switch_section(sections[next]);
    }

    fn switch_section(&mut self, section: Section) {
        if section == self.state.section {
            return;
        }
        self.leave_section();
        self.state.section = section;
        self.enter_section();
    }

    fn leave_section(&mut self) {
        if let Some(list) = self.state.active_list_mut() {
            list.unmount();
        }
        if self.state.section == Section::Tracking {
            self.poller.clear();
        }
        self.state.prompt = None;
        self.state.confirm = None;
    }

    /// Load the panels that are not list views; lists fetch on the next tick.
    fn enter_section(&mut self) {
        match self.state.section {
            Section::Tracking => self.load_active_trips(),
            Section::Assistant => self.load_assistant(),
            Section::SellerLoans => self.load_seller_stats(),
            _ => {}
        }
    }

    fn select(&mut self, forward: bool) {
        if self.state.section == Section::Tracking {
            if forward {
                self.state.tracking.select_next();
            } else {
                self.state.tracking.select_prev();
            }
            return;
        }
        if let Some(list) = self.state.active_list_mut() {
            if forward {
                list.select_next();
            } else {
                list.select_prev();
            }
        }
    }

}

fn login_field(login: &mut LoginState) -> &mut String {
    match login.focus {
        LoginField::Token => &mut login.token,
        LoginField::Captcha => &mut login.captcha,
    }
}
