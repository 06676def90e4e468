//! Engine-side knowledge of the dashboard records.
use api_types::ItemId;
use api_types::assistant::{AiProduct, AssistantLog};
use api_types::broadcast::Broadcast;
use api_types::loan::{Loan, Repayment, SellerLoan};
use api_types::order::{Order, OrderStatus};
use api_types::payout::{Payout, PayoutRequest, PayoutRequestStatus, PayoutStatus};
use api_types::trip::{OptimizationLog, Trip};
use api_types::vfd::VfdReceipt;
use api_types::wallet::WalletHistory;

use crate::params::FilterValue;
use crate::store::ResourceItem;

macro_rules! resource_item {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ResourceItem for $ty {
                fn id(&self) -> ItemId {
                    self.id
                }
            }
        )+
    };
}

resource_item!(
    Loan,
    SellerLoan,
    Repayment,
    Payout,
    Trip,
    OptimizationLog,
    VfdReceipt,
    WalletHistory,
    Broadcast,
    AssistantLog,
    AiProduct,
    Order,
    PayoutRequest,
);

/// Money requests that wait in a queue until an admin answers them.
pub trait AwaitingAnswer {
    /// Status the server filters the waiting queue by.
    const WAITING_STATUS: &'static str;

    fn is_waiting(&self) -> bool;
    fn amount(&self) -> f64;
}

impl AwaitingAnswer for Payout {
    const WAITING_STATUS: &'static str = "pending";

    fn is_waiting(&self) -> bool {
        self.status == PayoutStatus::Pending
    }

    fn amount(&self) -> f64 {
        self.price
    }
}

impl AwaitingAnswer for PayoutRequest {
    const WAITING_STATUS: &'static str = "processed";

    fn is_waiting(&self) -> bool {
        self.status == PayoutRequestStatus::Processed
    }

    fn amount(&self) -> f64 {
        self.price
    }
}

/// The two screens of a payout queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayoutView {
    /// Requests still waiting for an answer.
    Pending,
    /// Everything already answered.
    History,
}

impl PayoutView {
    pub fn toggle(self) -> Self {
        match self {
            Self::Pending => Self::History,
            Self::History => Self::Pending,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::History => "history",
        }
    }

    /// Filter the server is asked for.
    pub fn status_filter<T: AwaitingAnswer>(self) -> Option<FilterValue> {
        match self {
            Self::Pending => Some(FilterValue::text(T::WAITING_STATUS)),
            Self::History => None,
        }
    }

    /// Rows of the current page this view shows.
    pub fn visible<'a, T: AwaitingAnswer>(self, rows: &'a [T]) -> impl Iterator<Item = &'a T> + 'a {
        rows.iter().filter(move |row| match self {
            Self::Pending => row.is_waiting(),
            Self::History => !row.is_waiting(),
        })
    }
}

/// Sum of the waiting requests on the current page.
pub fn pending_total<T: AwaitingAnswer>(rows: &[T]) -> f64 {
    PayoutView::Pending.visible(rows).map(AwaitingAnswer::amount).sum()
}

/// Status tabs above the order list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderTab {
    All,
    Status(OrderStatus),
    /// Soft-deleted orders.
    Deleted,
}

impl OrderTab {
    pub fn all() -> Vec<OrderTab> {
        let mut tabs = vec![Self::All];
        tabs.extend(OrderStatus::ALL.into_iter().map(Self::Status));
        tabs.push(Self::Deleted);
        tabs
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Status(status) => status.as_str(),
            Self::Deleted => "deleted",
        }
    }

    pub fn next(self) -> Self {
        let tabs = Self::all();
        let index = tabs.iter().position(|tab| *tab == self).unwrap_or(0);
        tabs[(index + 1) % tabs.len()]
    }

    /// `status` and `deleted_at` filters this tab sends.
    pub fn filters(self) -> [(&'static str, Option<FilterValue>); 2] {
        let (status, deleted) = match self {
            Self::All => (None, None),
            Self::Status(status) => (Some(FilterValue::text(status.as_str())), None),
            Self::Deleted => (None, Some(FilterValue::text("deleted_at"))),
        };
        [("status", status), ("deleted_at", deleted)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payout(id: ItemId, price: f64, status: PayoutStatus) -> Payout {
        Payout {
            id,
            created_by: None,
            price,
            status,
            cause: None,
            answer: None,
            currency: None,
            created_at: None,
        }
    }

    fn request(id: ItemId, price: f64, status: PayoutRequestStatus) -> PayoutRequest {
        PayoutRequest {
            id,
            user: None,
            price,
            status,
            note: None,
            currency: None,
            created_at: None,
        }
    }

    #[test]
    fn history_hides_pending_rows() {
        let rows = vec![
            payout(1, 100.0, PayoutStatus::Pending),
            payout(2, 50.0, PayoutStatus::Accepted),
            payout(3, 25.0, PayoutStatus::Canceled),
        ];
        let ids: Vec<_> = PayoutView::History.visible(&rows).map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert!(PayoutView::History.status_filter::<Payout>().is_none());
    }

    #[test]
    fn pending_total_sums_page() {
        let rows = vec![
            payout(1, 100.0, PayoutStatus::Pending),
            payout(2, 50.5, PayoutStatus::Pending),
            payout(3, 999.0, PayoutStatus::Accepted),
        ];
        assert_eq!(pending_total(&rows), 150.5);
        assert_eq!(
            PayoutView::Pending.status_filter::<Payout>(),
            Some(FilterValue::text("pending"))
        );
    }

    #[test]
    fn payout_requests_wait_as_processed() {
        let rows = vec![
            request(1, 40.0, PayoutRequestStatus::Processed),
            request(2, 10.0, PayoutRequestStatus::Paid),
            request(3, 2.5, PayoutRequestStatus::Processed),
        ];
        assert_eq!(
            PayoutView::Pending.status_filter::<PayoutRequest>(),
            Some(FilterValue::text("processed"))
        );
        assert_eq!(pending_total(&rows), 42.5);
        let answered: Vec<_> = PayoutView::History.visible(&rows).map(|r| r.id).collect();
        assert_eq!(answered, vec![2]);
    }

    #[test]
    fn order_tabs_cycle_and_filter() {
        let tabs = OrderTab::all();
        assert_eq!(tabs.len(), 9);
        assert_eq!(OrderTab::All.next(), OrderTab::Status(OrderStatus::New));
        assert_eq!(OrderTab::Deleted.next(), OrderTab::All);

        let [status, deleted] = OrderTab::Status(OrderStatus::Ready).filters();
        assert_eq!(status, ("status", Some(FilterValue::text("ready"))));
        assert_eq!(deleted, ("deleted_at", None));

        let [status, deleted] = OrderTab::Deleted.filters();
        assert_eq!(status.1, None);
        assert_eq!(deleted.1, Some(FilterValue::text("deleted_at")));
        assert!(OrderTab::All.filters().iter().all(|(_, value)| value.is_none()));
    }
}
