//! One table per resource, all driven by the same list engine.
use std::future::Future;

use api_types::assistant::{AiProduct, AssistantLog};
use api_types::broadcast::Broadcast;
use api_types::loan::{Loan, Repayment, SellerLoan};
use api_types::order::Order;
use api_types::payout::{Payout, PayoutRequest};
use api_types::trip::{OptimizationLog, Trip};
use api_types::vfd::VfdReceipt;
use api_types::wallet::WalletHistory;
use api_types::{ItemId, Meta};
use client::{Client, RestResource, paths};
use engine::{
    ColumnSet, DEFAULT_PAGE, FetchOutcome, FilterValue, ListParams, ListView, NavigationContext,
    ResourceItem, ResourceService, ResourceStore, RouteId, SortOrder, TableChange,
};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{AppEvent, AppState, EventSender, ToastState};
use crate::config::Role;
use crate::ui::columns::TableRow;

pub const PAGE_SIZES: [u32; 4] = [10, 20, 50, 100];

pub mod routes {
    use engine::RouteId;

    pub const LOANS: RouteId = RouteId::new("loans");
    pub const REPAYMENTS: RouteId = RouteId::new("loan-repayments");
    pub const SELLER_LOANS: RouteId = RouteId::new("seller-loans");
    pub const SELLER_REPAYMENTS: RouteId = RouteId::new("seller-repayments");
    pub const PAYOUTS: RouteId = RouteId::new("payouts");
    pub const TRIPS: RouteId = RouteId::new("trips");
    pub const OPTIMIZATION_LOGS: RouteId = RouteId::new("trip-optimization-logs");
    pub const VFD_RECEIPTS: RouteId = RouteId::new("vfd-receipts");
    pub const WALLET: RouteId = RouteId::new("wallet-histories");
    pub const BROADCASTS: RouteId = RouteId::new("broadcasts");
    pub const ASSISTANT_LOGS: RouteId = RouteId::new("ai-assistant-logs");
    pub const ORDERS: RouteId = RouteId::new("orders");
    pub const PAYOUT_REQUESTS: RouteId = RouteId::new("payout-requests");
    pub const PRODUCTS: RouteId = RouteId::new("ai-products");

    /// Tables a recorded repayment changes, per role.
    pub const ADMIN_REPAYMENT: &[RouteId] = &[LOANS, REPAYMENTS];
    pub const SELLER_REPAYMENT: &[RouteId] = &[SELLER_LOANS, SELLER_REPAYMENTS];
}

/// Run `request` on the runtime and hand its output to `finish` on the UI loop.
pub fn spawn_request<R, Fut, Finish>(events: &EventSender, request: Fut, finish: Finish)
where
    R: Send + 'static,
    Fut: Future<Output = R> + Send + 'static,
    Finish: FnOnce(&mut AppState, &mut NavigationContext, R) + Send + 'static,
{
    let events = events.clone();
    tokio::spawn(async move {
        let output = request.await;
        let apply = Box::new(move |state: &mut AppState, nav: &mut NavigationContext| {
            finish(state, nav, output)
        });
        if events.send(AppEvent::Apply(apply)).is_err() {
            debug!("ui loop gone, response dropped");
        }
    });
}

type Locate<T> = fn(&mut AppState) -> &mut ResourceScreen<T>;

/// Table, list store and column layout of one resource.
pub struct ResourceScreen<T> {
    pub view: ListView,
    pub store: ResourceStore<T>,
    pub columns: ColumnSet,
    pub selected: usize,
    service: RestResource<T>,
    locate: Locate<T>,
}

impl<T: TableRow> ResourceScreen<T> {
    pub fn new(route: RouteId, service: RestResource<T>, per_page: u32, locate: Locate<T>) -> Self {
        Self {
            view: ListView::new(route),
            store: ResourceStore::new(route.as_str(), ListParams::new(DEFAULT_PAGE, per_page)),
            columns: ColumnSet::new(T::columns()),
            selected: 0,
            service,
            locate,
        }
    }
}

impl<T> ResourceScreen<T> {
    pub fn with_page_sync(mut self) -> Self {
        self.store = self.store.with_page_sync();
        self
    }

    pub fn items(&self) -> &[T] {
        &self.store.state().items
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.items().get(self.selected)
    }

    pub fn service(&self) -> &RestResource<T> {
        &self.service
    }

    fn clamp_selection(&mut self) {
        let len = self.items().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

/// What the key handlers need from any resource table.
pub trait ListScreen {
    fn view(&self) -> &ListView;
    fn meta(&self) -> Meta;
    fn columns(&self) -> &ColumnSet;
    fn columns_mut(&mut self) -> &mut ColumnSet;
    fn selected_id(&self) -> Option<ItemId>;
    fn select_next(&mut self);
    fn select_prev(&mut self);

    /// Issue the fetch the view asks for, if any.
    fn tick(&mut self, nav: &mut NavigationContext, events: &EventSender);

    /// Leave the screen: late responses are ignored, the next visit refetches.
    fn unmount(&mut self);

    fn delete(&self, id: ItemId, events: &EventSender);

    fn next_page(&self, nav: &mut NavigationContext) -> bool {
        let state = nav.open(self.view().route()).clone();
        if u64::from(state.page) >= self.meta().page_count() {
            return false;
        }
        self.view().on_table_change(
            nav,
            TableChange {
                page: state.page + 1,
                per_page: state.per_page,
                sort: state.column.zip(state.sort),
            },
        );
        true
    }

    fn prev_page(&self, nav: &mut NavigationContext) -> bool {
        let state = nav.open(self.view().route()).clone();
        if state.page <= DEFAULT_PAGE {
            return false;
        }
        self.view().on_table_change(
            nav,
            TableChange {
                page: state.page - 1,
                per_page: state.per_page,
                sort: state.column.zip(state.sort),
            },
        );
        true
    }

    /// Step through [`PAGE_SIZES`]; the table goes back to page 1.
    fn cycle_per_page(&self, nav: &mut NavigationContext) -> u32 {
        let state = nav.open(self.view().route()).clone();
        let per_page = PAGE_SIZES
            .iter()
            .copied()
            .find(|size| *size > state.per_page)
            .unwrap_or(PAGE_SIZES[0]);
        self.view().on_table_change(
            nav,
            TableChange {
                page: DEFAULT_PAGE,
                per_page,
                sort: state.column.zip(state.sort),
            },
        );
        per_page
    }

    /// Cycle the sort of the focused column: ascending, descending, none.
    fn cycle_sort(&self, nav: &mut NavigationContext) -> bool {
        let Some(column) = self.columns().focused().filter(|c| c.sortable) else {
            return false;
        };
        let state = nav.open(self.view().route()).clone();
        let current = state
            .sort
            .filter(|_| state.column.as_deref() == Some(column.key));
        let sort = SortOrder::cycle(current).map(|order| (column.key.to_string(), order));
        self.view().on_table_change(
            nav,
            TableChange {
                page: state.page,
                per_page: state.per_page,
                sort,
            },
        );
        true
    }
}

impl<T> ListScreen for ResourceScreen<T>
where
    T: ResourceItem + DeserializeOwned + Send + 'static,
{
    fn view(&self) -> &ListView {
        &self.view
    }

    fn meta(&self) -> Meta {
        self.store.state().meta
    }

    fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    fn columns_mut(&mut self) -> &mut ColumnSet {
        &mut self.columns
    }

    fn selected_id(&self) -> Option<ItemId> {
        self.selected_item().map(ResourceItem::id)
    }

    fn select_next(&mut self) {
        let len = self.items().len();
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn tick(&mut self, nav: &mut NavigationContext, events: &EventSender) {
        let Some(params) = self.view.next_fetch(nav) else {
            return;
        };
        let ticket = self.store.begin_fetch(params);
        let service = self.service.clone();
        let locate = self.locate;
        spawn_request(
            events,
            async move {
                let result = service.list(ticket.params()).await;
                (ticket, result)
            },
            move |state, _nav, (ticket, result)| {
                let screen = locate(state);
                if screen.store.complete(ticket, result) == FetchOutcome::Applied {
                    screen.view.settled();
                    screen.clamp_selection();
                }
            },
        );
    }

    fn unmount(&mut self) {
        self.store.detach();
        self.view.unmount();
        self.selected = 0;
    }

    fn delete(&self, id: ItemId, events: &EventSender) {
        let service = self.service.clone();
        let locate = self.locate;
        let name = self.store.name();
        spawn_request(
            events,
            async move { service.delete(id).await },
            move |state, nav, result| match result {
                Ok(()) => {
                    state.toast = Some(ToastState::success(format!("Deleted #{id}")));
                    locate(state).view.request_refetch(nav);
                }
                Err(err) => {
                    warn!(store = name, id, error = %err, "delete failed");
                    state.toast = Some(ToastState::error(err.to_string()));
                }
            },
        );
    }
}

mod locate {
    use super::*;

    pub fn loans(state: &mut AppState) -> &mut ResourceScreen<Loan> {
        &mut state.screens.loans
    }

    pub fn repayments(state: &mut AppState) -> &mut ResourceScreen<Repayment> {
        &mut state.screens.repayments
    }

    pub fn seller_loans(state: &mut AppState) -> &mut ResourceScreen<SellerLoan> {
        &mut state.screens.seller_loans
    }

    pub fn seller_repayments(state: &mut AppState) -> &mut ResourceScreen<Repayment> {
        &mut state.screens.seller_repayments
    }

    pub fn payouts(state: &mut AppState) -> &mut ResourceScreen<Payout> {
        &mut state.screens.payouts
    }

    pub fn trips(state: &mut AppState) -> &mut ResourceScreen<Trip> {
        &mut state.screens.trips
    }

    pub fn optimization_logs(state: &mut AppState) -> &mut ResourceScreen<OptimizationLog> {
        &mut state.screens.optimization_logs
    }

    pub fn vfd_receipts(state: &mut AppState) -> &mut ResourceScreen<VfdReceipt> {
        &mut state.screens.vfd_receipts
    }

    pub fn wallet(state: &mut AppState) -> &mut ResourceScreen<WalletHistory> {
        &mut state.screens.wallet
    }

    pub fn broadcasts(state: &mut AppState) -> &mut ResourceScreen<Broadcast> {
        &mut state.screens.broadcasts
    }

    pub fn assistant_logs(state: &mut AppState) -> &mut ResourceScreen<AssistantLog> {
        &mut state.screens.assistant_logs
    }

    pub fn orders(state: &mut AppState) -> &mut ResourceScreen<Order> {
        &mut state.screens.orders
    }

    pub fn payout_requests(state: &mut AppState) -> &mut ResourceScreen<PayoutRequest> {
        &mut state.screens.payout_requests
    }

    pub fn products(state: &mut AppState) -> &mut ResourceScreen<AiProduct> {
        &mut state.screens.products
    }
}

pub struct Screens {
    pub loans: ResourceScreen<Loan>,
    pub repayments: ResourceScreen<Repayment>,
    pub seller_loans: ResourceScreen<SellerLoan>,
    pub seller_repayments: ResourceScreen<Repayment>,
    pub payouts: ResourceScreen<Payout>,
    pub trips: ResourceScreen<Trip>,
    pub optimization_logs: ResourceScreen<OptimizationLog>,
    pub vfd_receipts: ResourceScreen<VfdReceipt>,
    pub wallet: ResourceScreen<WalletHistory>,
    pub broadcasts: ResourceScreen<Broadcast>,
    pub assistant_logs: ResourceScreen<AssistantLog>,
    pub orders: ResourceScreen<Order>,
    pub payout_requests: ResourceScreen<PayoutRequest>,
    pub products: ResourceScreen<AiProduct>,
}

impl Screens {
    pub fn new(client: &Client, per_page: u32) -> Self {
        Self {
            loans: ResourceScreen::new(
                routes::LOANS,
                RestResource::new(client.clone(), paths::LOANS),
                per_page,
                locate::loans,
            ),
            repayments: ResourceScreen::new(
                routes::REPAYMENTS,
                RestResource::new(client.clone(), paths::LOAN_REPAYMENTS),
                per_page,
                locate::repayments,
            ),
            seller_loans: ResourceScreen::new(
                routes::SELLER_LOANS,
                RestResource::new(client.clone(), paths::SELLER_LOANS),
                per_page,
                locate::seller_loans,
            ),
            seller_repayments: ResourceScreen::new(
                routes::SELLER_REPAYMENTS,
                RestResource::new(client.clone(), paths::SELLER_REPAYMENTS),
                per_page,
                locate::seller_repayments,
            ),
            payouts: ResourceScreen::new(
                routes::PAYOUTS,
                RestResource::new(client.clone(), paths::PAYOUTS),
                per_page,
                locate::payouts,
            ),
            trips: ResourceScreen::new(
                routes::TRIPS,
                RestResource::new(client.clone(), paths::TRIPS),
                per_page,
                locate::trips,
            ),
            optimization_logs: ResourceScreen::new(
                routes::OPTIMIZATION_LOGS,
                RestResource::new(client.clone(), paths::TRIP_OPTIMIZATION_LOGS),
                per_page,
                locate::optimization_logs,
            ),
            vfd_receipts: ResourceScreen::new(
                routes::VFD_RECEIPTS,
                RestResource::new(client.clone(), paths::VFD_RECEIPTS),
                per_page,
                locate::vfd_receipts,
            ),
            wallet: ResourceScreen::new(
                routes::WALLET,
                RestResource::new(client.clone(), paths::WALLET_HISTORIES),
                per_page,
                locate::wallet,
            )
            .with_page_sync(),
            broadcasts: ResourceScreen::new(
                routes::BROADCASTS,
                RestResource::new(client.clone(), paths::BROADCASTS),
                per_page,
                locate::broadcasts,
            ),
            assistant_logs: ResourceScreen::new(
                routes::ASSISTANT_LOGS,
                RestResource::new(client.clone(), paths::AI_ASSISTANT_LOGS),
                per_page,
                locate::assistant_logs,
            ),
            orders: ResourceScreen::new(
                routes::ORDERS,
                RestResource::new(client.clone(), paths::ORDERS),
                per_page,
                locate::orders,
            ),
            payout_requests: ResourceScreen::new(
                routes::PAYOUT_REQUESTS,
                RestResource::new(client.clone(), paths::PAYOUT_REQUESTS),
                per_page,
                locate::payout_requests,
            ),
            products: ResourceScreen::new(
                routes::PRODUCTS,
                RestResource::new(client.clone(), paths::PRODUCTS),
                per_page,
                locate::products,
            ),
        }
    }
}

impl Screens {
    /// Endpoint a repayment is recorded against, and the tables to refetch
    /// once it lands.
    pub fn repayment_target(&self, role: Role) -> (&RestResource<Repayment>, &'static [RouteId]) {
        match role {
            Role::Admin => (self.repayments.service(), routes::ADMIN_REPAYMENT),
            Role::Seller => (self.seller_repayments.service(), routes::SELLER_REPAYMENT),
        }
    }
}

/// Parse the filter prompt: `key=value`, `key=a,b` for a list, `key=` to drop
/// the key.
pub fn parse_filter(input: &str) -> Option<(String, Option<FilterValue>)> {
    let (key, value) = input.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let value = value.trim();
    let value = if value.is_empty() {
        None
    } else if value.contains(',') {
        Some(FilterValue::List(
            value
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect(),
        ))
    } else if let Ok(number) = value.parse::<i64>() {
        Some(FilterValue::Integer(number))
    } else {
        match value {
            "true" => Some(FilterValue::Bool(true)),
            "false" => Some(FilterValue::Bool(false)),
            text => Some(FilterValue::text(text)),
        }
    };
    Some((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use api_types::ListResponse;

    use super::*;

    fn screen() -> ResourceScreen<Loan> {
        let client = Client::builder().base_url("http://127.0.0.1:9").build().unwrap();
        ResourceScreen::new(
            routes::LOANS,
            RestResource::new(client, paths::LOANS),
            10,
            locate::loans,
        )
    }

    fn with_total(screen: &mut ResourceScreen<Loan>, total: u64) {
        let mut store: ResourceStore<Loan> = ResourceStore::new("loans", ListParams::default());
        let ticket = store.begin_fetch(ListParams::default());
        store.complete(
            ticket,
            Ok(ListResponse {
                data: Vec::new(),
                meta: Meta {
                    current_page: 1,
                    per_page: 10,
                    total,
                },
            }),
        );
        screen.store = store;
    }

    #[test]
    fn paging_stops_at_the_last_page() {
        let mut screen = screen();
        with_total(&mut screen, 25);
        let mut nav = NavigationContext::new(10);

        assert!(!screen.prev_page(&mut nav));
        assert!(screen.next_page(&mut nav));
        assert!(screen.next_page(&mut nav));
        assert!(!screen.next_page(&mut nav));
        assert_eq!(nav.route(routes::LOANS).unwrap().page, 3);
        assert!(screen.prev_page(&mut nav));
        assert_eq!(nav.route(routes::LOANS).unwrap().page, 2);
    }

    #[test]
    fn page_size_cycles_and_resets_page() {
        let mut screen = screen();
        with_total(&mut screen, 500);
        let mut nav = NavigationContext::new(10);
        screen.next_page(&mut nav);

        assert_eq!(screen.cycle_per_page(&mut nav), 20);
        let state = nav.route(routes::LOANS).unwrap();
        assert_eq!((state.page, state.per_page), (1, 20));

        screen.cycle_per_page(&mut nav);
        screen.cycle_per_page(&mut nav);
        assert_eq!(screen.cycle_per_page(&mut nav), 10);
    }

    #[test]
    fn sort_follows_the_focused_column() {
        let mut screen = screen();
        let mut nav = NavigationContext::new(10);

        // first column is the sortable id
        assert!(screen.cycle_sort(&mut nav));
        let state = nav.route(routes::LOANS).unwrap().clone();
        assert_eq!(state.column.as_deref(), Some("id"));
        assert_eq!(state.sort, Some(SortOrder::Ascending));

        screen.cycle_sort(&mut nav);
        assert_eq!(nav.route(routes::LOANS).unwrap().sort, Some(SortOrder::Descending));

        screen.cycle_sort(&mut nav);
        let state = nav.route(routes::LOANS).unwrap();
        assert_eq!(state.sort, None);
        assert_eq!(state.column, None);

        // "Seller" is not sortable
        screen.columns.focus_next();
        assert!(!screen.cycle_sort(&mut nav));
    }

    #[test]
    fn sellers_record_repayments_on_their_own_endpoint() {
        let client = Client::builder().base_url("http://127.0.0.1:9").build().unwrap();
        let screens = Screens::new(&client, 10);

        let (service, refetch) = screens.repayment_target(Role::Seller);
        assert_eq!(service.path(), paths::SELLER_REPAYMENTS);
        assert!(refetch.contains(&routes::SELLER_LOANS));
        assert!(!refetch.contains(&routes::LOANS));

        let (service, refetch) = screens.repayment_target(Role::Admin);
        assert_eq!(service.path(), paths::LOAN_REPAYMENTS);
        assert_eq!(refetch, &[routes::LOANS, routes::REPAYMENTS]);
    }

    #[test]
    fn filter_prompt_syntax() {
        assert_eq!(
            parse_filter("status=active"),
            Some(("status".to_string(), Some(FilterValue::text("active"))))
        );
        assert_eq!(
            parse_filter("user_id = 42"),
            Some(("user_id".to_string(), Some(FilterValue::Integer(42))))
        );
        assert_eq!(
            parse_filter("groups=sellers, drivers"),
            Some((
                "groups".to_string(),
                Some(FilterValue::List(vec![
                    "sellers".to_string(),
                    "drivers".to_string()
                ]))
            ))
        );
        assert_eq!(
            parse_filter("optimized=true"),
            Some(("optimized".to_string(), Some(FilterValue::Bool(true))))
        );
        assert_eq!(parse_filter("status="), Some(("status".to_string(), None)));
        assert_eq!(parse_filter("no equals sign"), None);
        assert_eq!(parse_filter("=x"), None);
    }
}
