//! Wire types shared by the dashboard client and the console.
//!
//! Every list endpoint answers with the `{ data, meta }` envelope described by
//! [`ListResponse`]; single-record endpoints answer with `{ data }` (or, on a
//! few legacy routes, with the bare record), see [`ItemResponse`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Backend-assigned record identifier.
pub type ItemId = u64;

/// Parses the timestamp formats the backend emits.
///
/// Accepts RFC3339 (`2024-05-01T10:00:00.000000Z`), the Laravel default
/// `2024-05-01 10:00:00` (read as UTC) and bare dates.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Lenient deserializers: amounts arrive either as JSON numbers or as decimal
/// strings (`"1500.00"`), timestamps in several formats.
mod lenient {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, de};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    pub(crate) fn f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Option::<NumberOrString>::deserialize(deserializer)? {
            Some(NumberOrString::Number(value)) => Ok(value),
            Some(NumberOrString::Text(text)) if text.trim().is_empty() => Ok(0.0),
            Some(NumberOrString::Text(text)) => text.trim().parse().map_err(de::Error::custom),
            None => Ok(0.0),
        }
    }

    pub(crate) fn opt_f64<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<f64>, D::Error> {
        match Option::<NumberOrString>::deserialize(deserializer)? {
            Some(NumberOrString::Number(value)) => Ok(Some(value)),
            Some(NumberOrString::Text(text)) if text.trim().is_empty() => Ok(None),
            Some(NumberOrString::Text(text)) => {
                text.trim().parse().map(Some).map_err(de::Error::custom)
            }
            None => Ok(None),
        }
    }

    pub(crate) fn opt_datetime<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(super::parse_timestamp))
    }

    pub(crate) fn opt_date<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<chrono::NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .as_deref()
            .and_then(super::parse_timestamp)
            .map(|dt| dt.date_naive()))
    }
}

/// `YYYY-MM-DD HH:MM:SS`, the format write endpoints expect for local times.
pub mod wire_datetime {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(de::Error::custom)
    }
}

/// Pagination metadata of a list response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub current_page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl Default for Meta {
    fn default() -> Self {
        Self {
            current_page: 1,
            per_page: 10,
            total: 0,
        }
    }
}

impl Meta {
    /// Number of pages implied by `total`; at least one.
    pub fn page_count(&self) -> u64 {
        if self.per_page == 0 {
            return 1;
        }
        self.total.div_ceil(u64::from(self.per_page)).max(1)
    }
}

/// Every shape the list endpoints return, read in one pass so a malformed row
/// or `meta` reports its own error.
///
/// `meta` wins when present. Otherwise the Laravel paginator fields beside
/// `data` are used, and a bare `{ data }` describes itself.
#[derive(Deserialize)]
struct RawList<T> {
    data: Vec<T>,
    #[serde(default)]
    meta: Option<Meta>,
    #[serde(default)]
    current_page: Option<u32>,
    #[serde(default)]
    per_page: Option<u32>,
    #[serde(default)]
    total: Option<u64>,
}

/// `{ data: [...], meta: { current_page, per_page, total } }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "RawList<T>",
    bound(deserialize = "T: Deserialize<'de>", serialize = "T: Serialize")
)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub meta: Meta,
}

impl<T> From<RawList<T>> for ListResponse<T> {
    fn from(raw: RawList<T>) -> Self {
        let len = raw.data.len();
        let page_len = u32::try_from(len).unwrap_or(u32::MAX).max(1);
        let meta = match raw.meta {
            Some(meta) => meta,
            None => Meta {
                current_page: raw.current_page.unwrap_or(1),
                per_page: raw.per_page.unwrap_or(page_len),
                total: raw.total.unwrap_or(len as u64),
            },
        };
        Self {
            data: raw.data,
            meta,
        }
    }
}

/// A single record, either enveloped in `{ data }` or bare.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ItemResponse<T> {
    Enveloped { data: T },
    Bare(T),
}

impl<T> ItemResponse<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Enveloped { data } | Self::Bare(data) => data,
        }
    }
}

/// Generic acknowledgement returned by action endpoints
/// (`optimize`, `resend`, `complete`, ...).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionAck {
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body of a failed request.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error).filter(|m| !m.trim().is_empty())
    }
}

/// Nested user object embedded in most records.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRef {
    #[serde(default)]
    pub id: Option<ItemId>,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
}

impl UserRef {
    pub fn display_name(&self) -> String {
        let name = [self.firstname.as_deref(), self.lastname.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            self.id
                .map(|id| format!("#{id}"))
                .unwrap_or_else(|| "-".to_string())
        } else {
            name
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRef {
    #[serde(default)]
    pub symbol: Option<String>,
    /// `before` or `after` the amount.
    #[serde(default)]
    pub position: Option<String>,
}

pub mod loan {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum LoanStatus {
        Active,
        Repaid,
        Defaulted,
        #[serde(other)]
        Unknown,
    }

    impl LoanStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Active => "active",
                Self::Repaid => "repaid",
                Self::Defaulted => "defaulted",
                Self::Unknown => "unknown",
            }
        }
    }

    /// Loan as seen by an admin.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Loan {
        pub id: ItemId,
        #[serde(default)]
        pub user: Option<UserRef>,
        #[serde(default, deserialize_with = "lenient::f64")]
        pub amount: f64,
        #[serde(default, deserialize_with = "lenient::f64")]
        pub interest_rate: f64,
        #[serde(default, deserialize_with = "lenient::f64")]
        pub repayment_amount: f64,
        #[serde(default)]
        pub disbursed_by_user: Option<UserRef>,
        #[serde(default, deserialize_with = "lenient::opt_datetime")]
        pub disbursed_at: Option<DateTime<Utc>>,
        #[serde(default, deserialize_with = "lenient::opt_date")]
        pub due_date: Option<NaiveDate>,
        pub status: LoanStatus,
    }

    /// Loan as seen by the seller who owes it.
    ///
    /// Kept apart from [`Loan`]: the seller endpoint adds `remaining_amount`
    /// and the two schemas are not guaranteed to stay aligned.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct SellerLoan {
        pub id: ItemId,
        #[serde(default, deserialize_with = "lenient::f64")]
        pub amount: f64,
        #[serde(default, deserialize_with = "lenient::f64")]
        pub interest_rate: f64,
        #[serde(default, deserialize_with = "lenient::f64")]
        pub repayment_amount: f64,
        #[serde(default, deserialize_with = "lenient::f64")]
        pub remaining_amount: f64,
        #[serde(default, deserialize_with = "lenient::opt_datetime")]
        pub disbursed_at: Option<DateTime<Utc>>,
        #[serde(default, deserialize_with = "lenient::opt_date")]
        pub due_date: Option<NaiveDate>,
        pub status: LoanStatus,
    }

    /// Disbursement request.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct LoanNew {
        pub user_id: ItemId,
        pub amount: f64,
        pub interest_rate: f64,
        pub due_date: NaiveDate,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub note: Option<String>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PaymentMethod {
        Wallet,
        MobileMoney,
        Cash,
        Card,
        #[serde(other)]
        Other,
    }

    impl PaymentMethod {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Wallet => "wallet",
                Self::MobileMoney => "mobile_money",
                Self::Cash => "cash",
                Self::Card => "card",
                Self::Other => "other",
            }
        }

        pub fn parse(raw: &str) -> Option<Self> {
            match raw.trim().to_lowercase().as_str() {
                "wallet" => Some(Self::Wallet),
                "mobile_money" | "mobile money" => Some(Self::MobileMoney),
                "cash" => Some(Self::Cash),
                "card" => Some(Self::Card),
                _ => None,
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Repayment {
        pub id: ItemId,
        pub loan_id: ItemId,
        #[serde(default)]
        pub user: Option<UserRef>,
        #[serde(default, deserialize_with = "lenient::f64")]
        pub amount: f64,
        #[serde(default)]
        pub payment_method: Option<PaymentMethod>,
        #[serde(default, deserialize_with = "lenient::opt_datetime")]
        pub paid_at: Option<DateTime<Utc>>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct RepaymentNew {
        pub loan_id: ItemId,
        pub amount: f64,
        pub payment_method: PaymentMethod,
        #[serde(with = "crate::wire_datetime")]
        pub paid_at: NaiveDateTime,
    }

    /// Seller loan analytics summary.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct LoanStatistics {
        #[serde(default)]
        pub total_loans: u64,
        #[serde(default)]
        pub active_loans: u64,
        #[serde(default, deserialize_with = "lenient::f64")]
        pub total_amount: f64,
        #[serde(default, deserialize_with = "lenient::f64")]
        pub total_repaid: f64,
        #[serde(default, deserialize_with = "lenient::f64")]
        pub outstanding: f64,
    }
}

pub mod payout {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PayoutStatus {
        Pending,
        Accepted,
        Canceled,
        #[serde(other)]
        Unknown,
    }

    impl PayoutStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Pending => "pending",
                Self::Accepted => "accepted",
                Self::Canceled => "canceled",
                Self::Unknown => "unknown",
            }
        }

        pub fn parse(raw: &str) -> Option<Self> {
            match raw.trim().to_lowercase().as_str() {
                "pending" => Some(Self::Pending),
                "accepted" => Some(Self::Accepted),
                "canceled" | "cancelled" => Some(Self::Canceled),
                _ => None,
            }
        }
    }

    /// Seller payout request.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Payout {
        pub id: ItemId,
        #[serde(default, rename = "createdBy")]
        pub created_by: Option<UserRef>,
        #[serde(default, deserialize_with = "lenient::f64")]
        pub price: f64,
        pub status: PayoutStatus,
        #[serde(default)]
        pub cause: Option<String>,
        #[serde(default)]
        pub answer: Option<String>,
        #[serde(default)]
        pub currency: Option<CurrencyRef>,
        #[serde(default, deserialize_with = "lenient::opt_datetime")]
        pub created_at: Option<DateTime<Utc>>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct PayoutStatusUpdate {
        pub status: PayoutStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub answer: Option<String>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PayoutRequestStatus {
        /// Waiting for the admin to pay or reject it.
        Processed,
        Paid,
        Rejected,
        Canceled,
        #[serde(other)]
        Unknown,
    }

    impl PayoutRequestStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Processed => "processed",
                Self::Paid => "paid",
                Self::Rejected => "rejected",
                Self::Canceled => "canceled",
                Self::Unknown => "unknown",
            }
        }

        pub fn parse(raw: &str) -> Option<Self> {
            match raw.trim().to_lowercase().as_str() {
                "processed" => Some(Self::Processed),
                "paid" => Some(Self::Paid),
                "rejected" => Some(Self::Rejected),
                "canceled" | "cancelled" => Some(Self::Canceled),
                _ => None,
            }
        }
    }

    /// Withdrawal a user asked for from their wallet balance.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct PayoutRequest {
        pub id: ItemId,
        #[serde(default)]
        pub user: Option<UserRef>,
        #[serde(default, deserialize_with = "lenient::f64")]
        pub price: f64,
        pub status: PayoutRequestStatus,
        #[serde(default)]
        pub note: Option<String>,
        #[serde(default)]
        pub currency: Option<CurrencyRef>,
        #[serde(default, deserialize_with = "lenient::opt_datetime")]
        pub created_at: Option<DateTime<Utc>>,
    }

    /// Pay or reject a payout request.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct PayoutRequestAnswer {
        pub status: PayoutRequestStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub note: Option<String>,
    }
}

pub mod order {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum OrderStatus {
        New,
        Accepted,
        Cooking,
        Ready,
        OnAWay,
        Delivered,
        Canceled,
        #[serde(other)]
        Unknown,
    }

    impl OrderStatus {
        pub const ALL: [OrderStatus; 7] = [
            Self::New,
            Self::Accepted,
            Self::Cooking,
            Self::Ready,
            Self::OnAWay,
            Self::Delivered,
            Self::Canceled,
        ];

        pub fn as_str(self) -> &'static str {
            match self {
                Self::New => "new",
                Self::Accepted => "accepted",
                Self::Cooking => "cooking",
                Self::Ready => "ready",
                Self::OnAWay => "on_a_way",
                Self::Delivered => "delivered",
                Self::Canceled => "canceled",
                Self::Unknown => "unknown",
            }
        }
    }

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct PaymentSystem {
        #[serde(default)]
        pub tag: Option<String>,
    }

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct OrderTransaction {
        #[serde(default)]
        pub status: Option<String>,
        #[serde(default)]
        pub payment_system: Option<PaymentSystem>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Order {
        pub id: ItemId,
        #[serde(default)]
        pub user: Option<UserRef>,
        pub status: OrderStatus,
        #[serde(default)]
        pub deliveryman: Option<UserRef>,
        #[serde(default)]
        pub delivery_type: Option<String>,
        #[serde(default)]
        pub order_details_count: u64,
        #[serde(default, deserialize_with = "lenient::f64")]
        pub total_price: f64,
        #[serde(default)]
        pub currency: Option<CurrencyRef>,
        #[serde(default)]
        pub transaction: Option<OrderTransaction>,
        #[serde(default, deserialize_with = "lenient::opt_datetime")]
        pub created_at: Option<DateTime<Utc>>,
        #[serde(default)]
        pub delivery_date: Option<String>,
        #[serde(default, deserialize_with = "lenient::opt_datetime")]
        pub deleted_at: Option<DateTime<Utc>>,
    }
}

pub mod trip {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TripStatus {
        Planned,
        InProgress,
        Completed,
        Cancelled,
        #[serde(other)]
        Unknown,
    }

    impl TripStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Planned => "planned",
                Self::InProgress => "in_progress",
                Self::Completed => "completed",
                Self::Cancelled => "cancelled",
                Self::Unknown => "unknown",
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum StopStatus {
        Pending,
        Arrived,
        Skipped,
        #[serde(other)]
        Unknown,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TripStop {
        #[serde(default)]
        pub id: Option<ItemId>,
        #[serde(default)]
        pub address: Option<String>,
        #[serde(default, deserialize_with = "lenient::f64")]
        pub lat: f64,
        #[serde(default, deserialize_with = "lenient::f64")]
        pub lng: f64,
        #[serde(default = "pending_stop")]
        pub status: StopStatus,
    }

    fn pending_stop() -> StopStatus {
        StopStatus::Pending
    }

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct Vehicle {
        #[serde(default)]
        pub model: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Trip {
        pub id: ItemId,
        #[serde(default)]
        pub name: Option<String>,
        pub status: TripStatus,
        #[serde(default)]
        pub optimized: bool,
        #[serde(default)]
        pub driver: Option<UserRef>,
        #[serde(default)]
        pub vehicle: Option<Vehicle>,
        #[serde(default)]
        pub start_address: Option<String>,
        #[serde(default, deserialize_with = "lenient::opt_f64")]
        pub start_lat: Option<f64>,
        #[serde(default, deserialize_with = "lenient::opt_f64")]
        pub start_lng: Option<f64>,
        #[serde(default, deserialize_with = "lenient::opt_datetime")]
        pub scheduled_at: Option<DateTime<Utc>>,
        #[serde(default, deserialize_with = "lenient::opt_datetime")]
        pub started_at: Option<DateTime<Utc>>,
        #[serde(default)]
        pub locations: Vec<TripStop>,
    }

    impl Trip {
        pub fn label(&self) -> String {
            self.name
                .clone()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| format!("Trip #{}", self.id))
        }

        pub fn stops_with(&self, status: StopStatus) -> usize {
            self.locations
                .iter()
                .filter(|stop| stop.status == status)
                .count()
        }
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TripStopNew {
        pub address: String,
        pub lat: f64,
        pub lng: f64,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TripNew {
        pub name: String,
        pub start_address: String,
        pub start_lat: f64,
        pub start_lng: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub scheduled_at: Option<DateTime<Utc>>,
        pub locations: Vec<TripStopNew>,
    }

    /// Last reported driver position for an active trip.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct DriverLocation {
        #[serde(deserialize_with = "lenient::f64")]
        pub lat: f64,
        #[serde(deserialize_with = "lenient::f64")]
        pub lng: f64,
        #[serde(default, deserialize_with = "lenient::opt_f64")]
        pub bearing: Option<f64>,
        #[serde(default, deserialize_with = "lenient::opt_datetime")]
        pub updated_at: Option<DateTime<Utc>>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct OptimizationLog {
        pub id: ItemId,
        #[serde(default)]
        pub trip_id: Option<ItemId>,
        #[serde(default, deserialize_with = "lenient::opt_f64")]
        pub distance_before: Option<f64>,
        #[serde(default, deserialize_with = "lenient::opt_f64")]
        pub distance_after: Option<f64>,
        #[serde(default)]
        pub duration_ms: Option<u64>,
        #[serde(default, deserialize_with = "lenient::opt_datetime")]
        pub created_at: Option<DateTime<Utc>>,
    }
}

pub mod vfd {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum VfdReceiptType {
        Delivery,
        Subscription,
        #[serde(other)]
        Other,
    }

    impl VfdReceiptType {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Delivery => "delivery",
                Self::Subscription => "subscription",
                Self::Other => "other",
            }
        }

        pub fn parse(raw: &str) -> Option<Self> {
            match raw.trim().to_lowercase().as_str() {
                "delivery" => Some(Self::Delivery),
                "subscription" => Some(Self::Subscription),
                _ => None,
            }
        }
    }

    /// Tax-authority receipt (Virtual Fiscal Device).
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct VfdReceipt {
        pub id: ItemId,
        #[serde(default)]
        pub receipt_number: Option<String>,
        pub receipt_type: VfdReceiptType,
        #[serde(default, deserialize_with = "lenient::f64")]
        pub amount: f64,
        #[serde(default)]
        pub customer_name: Option<String>,
        #[serde(default)]
        pub customer_phone: Option<String>,
        #[serde(default)]
        pub status: Option<String>,
        #[serde(default)]
        pub receipt_url: Option<String>,
        #[serde(default, deserialize_with = "lenient::opt_datetime")]
        pub created_at: Option<DateTime<Utc>>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct VfdReceiptGenerate {
        pub receipt_type: VfdReceiptType,
        pub amount: f64,
        pub customer_name: String,
        pub customer_phone: String,
        pub customer_address: String,
    }
}

pub mod wallet {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct WalletHistory {
        pub id: ItemId,
        #[serde(default)]
        pub author: Option<UserRef>,
        #[serde(default)]
        pub user: Option<UserRef>,
        #[serde(default, rename = "type")]
        pub kind: Option<String>,
        #[serde(default, deserialize_with = "lenient::f64")]
        pub price: f64,
        #[serde(default)]
        pub note: Option<String>,
        #[serde(default)]
        pub status: Option<String>,
        #[serde(default, deserialize_with = "lenient::opt_datetime")]
        pub created_at: Option<DateTime<Utc>>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct WalletTopUp {
        pub price: f64,
    }
}

pub mod broadcast {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Broadcast {
        pub id: ItemId,
        #[serde(default)]
        pub title: Option<String>,
        #[serde(default)]
        pub groups: Vec<String>,
        #[serde(default)]
        pub recipients_count: Option<u64>,
        #[serde(default, deserialize_with = "lenient::opt_datetime")]
        pub created_at: Option<DateTime<Utc>>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct BroadcastSend {
        pub title: String,
        pub body: String,
        pub groups: Vec<String>,
        pub custom_emails: Vec<String>,
    }
}

pub mod assistant {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct RequestTypeCount {
        #[serde(rename = "type")]
        pub kind: String,
        pub count: u64,
    }

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct AssistantStatistics {
        #[serde(default)]
        pub total_requests: u64,
        #[serde(default)]
        pub successful_requests: u64,
        #[serde(default)]
        pub failed_requests: u64,
        #[serde(default)]
        pub today_requests: u64,
        #[serde(default)]
        pub request_types: Vec<RequestTypeCount>,
    }

    impl AssistantStatistics {
        /// Share of successful requests in percent, one decimal.
        pub fn success_rate(&self) -> f64 {
            if self.total_requests == 0 {
                return 0.0;
            }
            let rate = self.successful_requests as f64 / self.total_requests as f64 * 100.0;
            (rate * 10.0).round() / 10.0
        }
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct AssistantLog {
        pub id: ItemId,
        #[serde(default)]
        pub user: Option<UserRef>,
        #[serde(default)]
        pub request_type: Option<String>,
        #[serde(default)]
        pub successful: bool,
        #[serde(default)]
        pub input: Option<String>,
        #[serde(default, deserialize_with = "lenient::opt_datetime")]
        pub created_at: Option<DateTime<Utc>>,
    }

    /// Row of the top-filters / top-exclusions panels.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct TopEntry {
        #[serde(alias = "filter", alias = "exclusion")]
        pub name: String,
        pub count: u64,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct CreditsUpdate {
        pub credits: u64,
    }

    /// Product as the assistant sees it.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct AiProduct {
        pub id: ItemId,
        #[serde(default)]
        pub name: Option<String>,
        #[serde(default, deserialize_with = "lenient::opt_f64")]
        pub calories: Option<f64>,
        #[serde(default)]
        pub ingredient_tags: Vec<String>,
        #[serde(default)]
        pub allergen_flags: Vec<String>,
        #[serde(default)]
        pub representative_image: Option<String>,
        #[serde(default, deserialize_with = "lenient::f64")]
        pub popularity_score: f64,
    }

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct ProductMetadataUpdate {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub calories: Option<u32>,
        pub ingredient_tags: Vec<String>,
        pub allergen_flags: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub representative_image: Option<String>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_response_reads_enveloped_meta() {
        let raw = json!({
            "data": [{ "id": 1, "amount": "1500.00", "interest_rate": 5, "repayment_amount": 1575, "status": "active" }],
            "meta": { "current_page": 2, "per_page": 10, "total": 11 }
        });
        let res: ListResponse<loan::Loan> = serde_json::from_value(raw).unwrap();
        assert_eq!(res.meta.current_page, 2);
        assert_eq!(res.meta.total, 11);
        assert_eq!(res.data[0].amount, 1500.0);
        assert_eq!(res.data[0].status, loan::LoanStatus::Active);
    }

    #[test]
    fn list_response_reads_flattened_paginator() {
        let raw = json!({
            "data": [{ "id": 4, "successful": true }],
            "current_page": 3,
            "per_page": 15,
            "total": 31
        });
        let res: ListResponse<assistant::AssistantLog> = serde_json::from_value(raw).unwrap();
        assert_eq!(
            res.meta,
            Meta {
                current_page: 3,
                per_page: 15,
                total: 31
            }
        );
    }

    #[test]
    fn list_response_without_meta_describes_itself() {
        let raw = json!({ "data": [{ "id": 1, "status": "planned" }, { "id": 2, "status": "whatever" }] });
        let res: ListResponse<trip::Trip> = serde_json::from_value(raw).unwrap();
        assert_eq!(res.meta.total, 2);
        assert_eq!(res.meta.current_page, 1);
        assert_eq!(res.data[1].status, trip::TripStatus::Unknown);
    }

    #[test]
    fn list_response_reads_total_only_paginator() {
        let raw = json!({ "data": [{ "id": 1, "status": "planned" }], "total": 40 });
        let res: ListResponse<trip::Trip> = serde_json::from_value(raw).unwrap();
        assert_eq!(res.meta.total, 40);
        assert_eq!(res.meta.current_page, 1);
    }

    #[test]
    fn list_response_keeps_the_row_error() {
        let raw = json!({
            "data": [{ "id": "seven", "status": "planned" }],
            "meta": { "current_page": 1, "per_page": 10, "total": 1 }
        });
        let err = serde_json::from_value::<ListResponse<trip::Trip>>(raw)
            .unwrap_err()
            .to_string();
        assert!(err.contains("invalid type"), "got {err}");
        assert!(!err.contains("did not match any variant"), "got {err}");
    }

    #[test]
    fn list_response_rejects_broken_meta() {
        let raw = json!({
            "data": [],
            "meta": { "current_page": 1, "per_page": null, "total": 0 }
        });
        let err = serde_json::from_value::<ListResponse<trip::Trip>>(raw)
            .unwrap_err()
            .to_string();
        assert!(err.contains("invalid type: null"), "got {err}");
    }

    #[test]
    fn item_response_accepts_bare_and_enveloped() {
        let enveloped: ItemResponse<trip::DriverLocation> =
            serde_json::from_value(json!({ "data": { "lat": "-6.79", "lng": 39.21 } })).unwrap();
        let bare: ItemResponse<trip::DriverLocation> =
            serde_json::from_value(json!({ "lat": -6.79, "lng": "39.21" })).unwrap();
        assert_eq!(enveloped.into_inner(), bare.into_inner());
    }

    #[test]
    fn timestamps_accept_backend_formats() {
        let iso = parse_timestamp("2024-05-01T10:00:00.000000Z").unwrap();
        let laravel = parse_timestamp("2024-05-01 10:00:00").unwrap();
        assert_eq!(iso, laravel);
        assert!(parse_timestamp("2024-05-01").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn repayment_payload_uses_wire_datetime() {
        let payload = loan::RepaymentNew {
            loan_id: 7,
            amount: 250.0,
            payment_method: loan::PaymentMethod::MobileMoney,
            paid_at: NaiveDate::from_ymd_opt(2024, 3, 9)
                .unwrap()
                .and_hms_opt(14, 5, 0)
                .unwrap(),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["paid_at"], "2024-03-09 14:05:00");
        assert_eq!(value["payment_method"], "mobile_money");
    }

    #[test]
    fn success_rate_handles_empty_statistics() {
        let empty = assistant::AssistantStatistics::default();
        assert_eq!(empty.success_rate(), 0.0);

        let stats = assistant::AssistantStatistics {
            total_requests: 3,
            successful_requests: 2,
            ..Default::default()
        };
        assert_eq!(stats.success_rate(), 66.7);
    }

    #[test]
    fn page_count_rounds_up() {
        let meta = Meta {
            current_page: 1,
            per_page: 10,
            total: 25,
        };
        assert_eq!(meta.page_count(), 3);
        assert_eq!(Meta::default().page_count(), 1);
    }

    #[test]
    fn user_display_name_falls_back_to_id() {
        let user = UserRef {
            id: Some(9),
            ..Default::default()
        };
        assert_eq!(user.display_name(), "#9");
    }
}
