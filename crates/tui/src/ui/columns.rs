//! Table columns per resource and how each cell is printed.
//!
//! Column keys double as the `column` sort parameter, so they use the API's
//! field names.
use api_types::assistant::{AiProduct, AssistantLog};
use api_types::broadcast::Broadcast;
use api_types::loan::{Loan, Repayment, SellerLoan};
use api_types::order::Order;
use api_types::payout::{Payout, PayoutRequest};
use api_types::trip::{OptimizationLog, StopStatus, Trip};
use api_types::vfd::VfdReceipt;
use api_types::wallet::WalletHistory;
use api_types::{CurrencyRef, UserRef};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use engine::Column;

const MISSING: &str = "-";

/// Rendering settings shared by every cell.
#[derive(Debug, Clone, Copy)]
pub struct CellFormat {
    pub tz: Tz,
}

impl CellFormat {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn datetime(&self, value: Option<&DateTime<Utc>>) -> String {
        value
            .map(|at| at.with_timezone(&self.tz).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| MISSING.to_string())
    }

    pub fn date(&self, value: Option<&NaiveDate>) -> String {
        value
            .map(|day| day.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| MISSING.to_string())
    }
}

/// `1234567.5` -> `1,234,567.50`; whole amounts print without decimals.
pub fn amount(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let mut out = group_thousands(cents / 100);
    if cents % 100 != 0 {
        out.push_str(&format!(".{:02}", cents % 100));
    }
    if value < 0.0 && cents != 0 {
        out.insert(0, '-');
    }
    out
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}

fn priced(value: f64, currency: Option<&CurrencyRef>) -> String {
    let number = amount(value);
    let Some(symbol) = currency.and_then(|c| c.symbol.as_deref()) else {
        return number;
    };
    match currency.and_then(|c| c.position.as_deref()) {
        Some("after") => format!("{number} {symbol}"),
        _ => format!("{symbol} {number}"),
    }
}

fn text(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(MISSING)
        .to_string()
}

fn user(value: Option<&UserRef>) -> String {
    value
        .map(UserRef::display_name)
        .unwrap_or_else(|| MISSING.to_string())
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value
        .map(|value| value.to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

fn tags(values: &[String]) -> String {
    if values.is_empty() {
        MISSING.to_string()
    } else {
        values.join(", ")
    }
}

fn km(value: Option<f64>) -> String {
    value
        .map(|km| format!("{km:.1} km"))
        .unwrap_or_else(|| MISSING.to_string())
}

/// A record that can be shown as a table row.
pub trait TableRow {
    fn columns() -> Vec<Column>;
    fn cell(&self, key: &str, format: &CellFormat) -> String;
}

impl TableRow for Loan {
    fn columns() -> Vec<Column> {
        vec![
            Column::new("id", "ID").sortable(),
            Column::new("user", "Borrower"),
            Column::new("amount", "Amount").sortable(),
            Column::new("interest_rate", "Rate %"),
            Column::new("repayment_amount", "To repay").sortable(),
            Column::new("status", "Status").sortable(),
            Column::new("disbursed_by_user", "Disbursed by").hidden(),
            Column::new("disbursed_at", "Disbursed").sortable(),
            Column::new("due_date", "Due").sortable(),
        ]
    }

    fn cell(&self, key: &str, format: &CellFormat) -> String {
        match key {
            "id" => format!("#{}", self.id),
            "user" => user(self.user.as_ref()),
            "amount" => amount(self.amount),
            "interest_rate" => format!("{:.1}", self.interest_rate),
            "repayment_amount" => amount(self.repayment_amount),
            "status" => self.status.as_str().to_string(),
            "disbursed_by_user" => user(self.disbursed_by_user.as_ref()),
            "disbursed_at" => format.datetime(self.disbursed_at.as_ref()),
            "due_date" => format.date(self.due_date.as_ref()),
            _ => MISSING.to_string(),
        }
    }
}

impl TableRow for SellerLoan {
    fn columns() -> Vec<Column> {
        vec![
            Column::new("id", "ID").sortable(),
            Column::new("amount", "Amount").sortable(),
            Column::new("interest_rate", "Rate %"),
            Column::new("repayment_amount", "To repay"),
            Column::new("remaining_amount", "Remaining").sortable(),
            Column::new("status", "Status").sortable(),
            Column::new("disbursed_at", "Disbursed").sortable(),
            Column::new("due_date", "Due").sortable(),
        ]
    }

    fn cell(&self, key: &str, format: &CellFormat) -> String {
        match key {
            "id" => format!("#{}", self.id),
            "amount" => amount(self.amount),
            "interest_rate" => format!("{:.1}", self.interest_rate),
            "repayment_amount" => amount(self.repayment_amount),
            "remaining_amount" => amount(self.remaining_amount),
            "status" => self.status.as_str().to_string(),
            "disbursed_at" => format.datetime(self.disbursed_at.as_ref()),
            "due_date" => format.date(self.due_date.as_ref()),
            _ => MISSING.to_string(),
        }
    }
}

impl TableRow for Repayment {
    fn columns() -> Vec<Column> {
        vec![
            Column::new("id", "ID").sortable(),
            Column::new("loan_id", "Loan").sortable(),
            Column::new("user", "Payer"),
            Column::new("amount", "Amount").sortable(),
            Column::new("payment_method", "Method"),
            Column::new("paid_at", "Paid").sortable(),
        ]
    }

    fn cell(&self, key: &str, format: &CellFormat) -> String {
        match key {
            "id" => format!("#{}", self.id),
            "loan_id" => format!("#{}", self.loan_id),
            "user" => user(self.user.as_ref()),
            "amount" => amount(self.amount),
            "payment_method" => optional(self.payment_method.map(|m| m.as_str())),
            "paid_at" => format.datetime(self.paid_at.as_ref()),
            _ => MISSING.to_string(),
        }
    }
}

impl TableRow for Payout {
    fn columns() -> Vec<Column> {
        vec![
            Column::new("id", "ID").sortable(),
            Column::new("created_by", "Seller"),
            Column::new("price", "Amount").sortable(),
            Column::new("status", "Status"),
            Column::new("cause", "Cause"),
            Column::new("answer", "Answer"),
            Column::new("created_at", "Requested").sortable(),
        ]
    }

    fn cell(&self, key: &str, format: &CellFormat) -> String {
        match key {
            "id" => format!("#{}", self.id),
            "created_by" => user(self.created_by.as_ref()),
            "price" => priced(self.price, self.currency.as_ref()),
            "status" => self.status.as_str().to_string(),
            "cause" => text(self.cause.as_deref()),
            "answer" => text(self.answer.as_deref()),
            "created_at" => format.datetime(self.created_at.as_ref()),
            _ => MISSING.to_string(),
        }
    }
}

impl TableRow for Trip {
    fn columns() -> Vec<Column> {
        vec![
            Column::new("id", "ID").sortable(),
            Column::new("name", "Trip").sortable(),
            Column::new("status", "Status").sortable(),
            Column::new("driver", "Driver"),
            Column::new("vehicle", "Vehicle").hidden(),
            Column::new("locations", "Stops"),
            Column::new("optimized", "Optimized"),
            Column::new("scheduled_at", "Scheduled").sortable(),
        ]
    }

    fn cell(&self, key: &str, format: &CellFormat) -> String {
        match key {
            "id" => format!("#{}", self.id),
            "name" => self.label(),
            "status" => self.status.as_str().to_string(),
            "driver" => user(self.driver.as_ref()),
            "vehicle" => text(self.vehicle.as_ref().and_then(|v| v.model.as_deref())),
            "locations" => format!(
                "{}/{}",
                self.stops_with(StopStatus::Arrived),
                self.locations.len()
            ),
            "optimized" => if self.optimized { "yes" } else { "no" }.to_string(),
            "scheduled_at" => format.datetime(self.scheduled_at.as_ref()),
            _ => MISSING.to_string(),
        }
    }
}

impl TableRow for OptimizationLog {
    fn columns() -> Vec<Column> {
        vec![
            Column::new("id", "ID").sortable(),
            Column::new("trip_id", "Trip").sortable(),
            Column::new("distance_before", "Before"),
            Column::new("distance_after", "After"),
            Column::new("duration_ms", "Took"),
            Column::new("created_at", "At").sortable(),
        ]
    }

    fn cell(&self, key: &str, format: &CellFormat) -> String {
        match key {
            "id" => format!("#{}", self.id),
            "trip_id" => optional(self.trip_id.map(|id| format!("#{id}"))),
            "distance_before" => km(self.distance_before),
            "distance_after" => km(self.distance_after),
            "duration_ms" => optional(self.duration_ms.map(|ms| format!("{ms} ms"))),
            "created_at" => format.datetime(self.created_at.as_ref()),
            _ => MISSING.to_string(),
        }
    }
}

impl TableRow for VfdReceipt {
    fn columns() -> Vec<Column> {
        vec![
            Column::new("id", "ID").sortable(),
            Column::new("receipt_number", "Receipt").sortable(),
            Column::new("receipt_type", "Type"),
            Column::new("amount", "Amount").sortable(),
            Column::new("customer_name", "Customer"),
            Column::new("customer_phone", "Phone").hidden(),
            Column::new("status", "Status"),
            Column::new("created_at", "Issued").sortable(),
        ]
    }

    fn cell(&self, key: &str, format: &CellFormat) -> String {
        match key {
            "id" => format!("#{}", self.id),
            "receipt_number" => text(self.receipt_number.as_deref()),
            "receipt_type" => self.receipt_type.as_str().to_string(),
            "amount" => amount(self.amount),
            "customer_name" => text(self.customer_name.as_deref()),
            "customer_phone" => text(self.customer_phone.as_deref()),
            "status" => text(self.status.as_deref()),
            "created_at" => format.datetime(self.created_at.as_ref()),
            _ => MISSING.to_string(),
        }
    }
}

impl TableRow for WalletHistory {
    fn columns() -> Vec<Column> {
        vec![
            Column::new("id", "ID").sortable(),
            Column::new("user", "Wallet owner"),
            Column::new("type", "Type"),
            Column::new("price", "Amount").sortable(),
            Column::new("status", "Status"),
            Column::new("author", "By").hidden(),
            Column::new("note", "Note"),
            Column::new("created_at", "At").sortable(),
        ]
    }

    fn cell(&self, key: &str, format: &CellFormat) -> String {
        match key {
            "id" => format!("#{}", self.id),
            "user" => user(self.user.as_ref()),
            "type" => text(self.kind.as_deref()),
            "price" => amount(self.price),
            "status" => text(self.status.as_deref()),
            "author" => user(self.author.as_ref()),
            "note" => text(self.note.as_deref()),
            "created_at" => format.datetime(self.created_at.as_ref()),
            _ => MISSING.to_string(),
        }
    }
}

impl TableRow for Broadcast {
    fn columns() -> Vec<Column> {
        vec![
            Column::new("id", "ID").sortable(),
            Column::new("title", "Title").sortable(),
            Column::new("groups", "Groups"),
            Column::new("recipients_count", "Recipients"),
            Column::new("created_at", "Sent").sortable(),
        ]
    }

    fn cell(&self, key: &str, format: &CellFormat) -> String {
        match key {
            "id" => format!("#{}", self.id),
            "title" => text(self.title.as_deref()),
            "groups" => tags(&self.groups),
            "recipients_count" => optional(self.recipients_count),
            "created_at" => format.datetime(self.created_at.as_ref()),
            _ => MISSING.to_string(),
        }
    }
}

impl TableRow for AssistantLog {
    fn columns() -> Vec<Column> {
        vec![
            Column::new("id", "ID").sortable(),
            Column::new("user", "User"),
            Column::new("request_type", "Request").sortable(),
            Column::new("successful", "OK"),
            Column::new("input", "Input").hidden(),
            Column::new("created_at", "At").sortable(),
        ]
    }

    fn cell(&self, key: &str, format: &CellFormat) -> String {
        match key {
            "id" => format!("#{}", self.id),
            "user" => user(self.user.as_ref()),
            "request_type" => text(self.request_type.as_deref()),
            "successful" => if self.successful { "yes" } else { "no" }.to_string(),
            "input" => text(self.input.as_deref()),
            "created_at" => format.datetime(self.created_at.as_ref()),
            _ => MISSING.to_string(),
        }
    }
}

impl TableRow for PayoutRequest {
    fn columns() -> Vec<Column> {
        vec![
            Column::new("id", "ID").sortable(),
            Column::new("user", "User"),
            Column::new("price", "Amount").sortable(),
            Column::new("status", "Status"),
            Column::new("note", "Note"),
            Column::new("created_at", "Requested").sortable(),
        ]
    }

    fn cell(&self, key: &str, format: &CellFormat) -> String {
        match key {
            "id" => format!("#{}", self.id),
            "user" => user(self.user.as_ref()),
            "price" => priced(self.price, self.currency.as_ref()),
            "status" => self.status.as_str().to_string(),
            "note" => text(self.note.as_deref()),
            "created_at" => format.datetime(self.created_at.as_ref()),
            _ => MISSING.to_string(),
        }
    }
}

impl TableRow for Order {
    fn columns() -> Vec<Column> {
        vec![
            Column::new("id", "ID").sortable(),
            Column::new("user", "Client"),
            Column::new("total_price", "Total").sortable(),
            Column::new("status", "Status"),
            Column::new("order_details_count", "Items"),
            Column::new("payment", "Payment"),
            Column::new("deliveryman", "Deliveryman").hidden(),
            Column::new("delivery_type", "Delivery").hidden(),
            Column::new("created_at", "Created").sortable(),
        ]
    }

    fn cell(&self, key: &str, format: &CellFormat) -> String {
        match key {
            "id" => format!("#{}", self.id),
            "user" => user(self.user.as_ref()),
            "total_price" => priced(self.total_price, self.currency.as_ref()),
            "status" if self.deleted_at.is_some() => "deleted".to_string(),
            "status" => self.status.as_str().to_string(),
            "order_details_count" => self.order_details_count.to_string(),
            "payment" => text(
                self.transaction
                    .as_ref()
                    .and_then(|t| t.payment_system.as_ref())
                    .and_then(|p| p.tag.as_deref()),
            ),
            "deliveryman" => user(self.deliveryman.as_ref()),
            "delivery_type" => text(self.delivery_type.as_deref()),
            "created_at" => format.datetime(self.created_at.as_ref()),
            _ => MISSING.to_string(),
        }
    }
}

impl TableRow for AiProduct {
    fn columns() -> Vec<Column> {
        vec![
            Column::new("id", "ID").sortable(),
            Column::new("name", "Product"),
            Column::new("calories", "kcal"),
            Column::new("ingredient_tags", "Ingredients"),
            Column::new("allergen_flags", "Allergens"),
            Column::new("popularity_score", "Popularity").sortable(),
        ]
    }

    fn cell(&self, key: &str, _format: &CellFormat) -> String {
        match key {
            "id" => format!("#{}", self.id),
            "name" => text(self.name.as_deref()),
            "calories" => optional(self.calories.map(|kcal| format!("{kcal:.0}"))),
            "ingredient_tags" => tags(&self.ingredient_tags),
            "allergen_flags" => tags(&self.allergen_flags),
            "popularity_score" => format!("{:.2}", self.popularity_score),
            _ => MISSING.to_string(),
        }
    }
}
