//! Concrete forms of the dashboard.
use api_types::ItemId;
use api_types::assistant::{CreditsUpdate, ProductMetadataUpdate};
use api_types::broadcast::BroadcastSend;
use api_types::loan::{LoanNew, PaymentMethod, RepaymentNew};
use api_types::payout::{PayoutRequestAnswer, PayoutRequestStatus, PayoutStatus, PayoutStatusUpdate};
use api_types::trip::{TripNew, TripStopNew};
use api_types::vfd::{VfdReceiptGenerate, VfdReceiptType};
use api_types::wallet::WalletTopUp;
use chrono::{Days, Local, NaiveDate, NaiveDateTime};

use crate::error::ValidationErrors;
use crate::form::{FieldDef, FormModel, FormValues};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DEFAULT_LOAN_TERM_DAYS: u64 = 30;

fn text(values: &FormValues, key: &str) -> String {
    values.get(key).map(|v| v.trim().to_string()).unwrap_or_default()
}

fn optional_text(values: &FormValues, key: &str) -> Option<String> {
    Some(text(values, key)).filter(|v| !v.is_empty())
}

fn id(values: &FormValues, key: &'static str, errors: &mut ValidationErrors) -> ItemId {
    match text(values, key).parse::<ItemId>() {
        Ok(id) if id > 0 => id,
        _ => {
            errors.add(key, "must be a positive whole number");
            0
        }
    }
}

fn number(values: &FormValues, key: &'static str, errors: &mut ValidationErrors) -> f64 {
    match text(values, key).replace(',', "").parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            errors.add(key, "must be a number");
            0.0
        }
    }
}

fn positive(values: &FormValues, key: &'static str, errors: &mut ValidationErrors) -> f64 {
    let value = number(values, key, errors);
    if value <= 0.0 {
        errors.add(key, "must be greater than 0");
    }
    value
}

fn non_negative(values: &FormValues, key: &'static str, errors: &mut ValidationErrors) -> f64 {
    let value = number(values, key, errors);
    if value < 0.0 {
        errors.add(key, "must not be negative");
    }
    value
}

fn coordinate(
    values: &FormValues,
    key: &'static str,
    limit: f64,
    errors: &mut ValidationErrors,
) -> f64 {
    let value = number(values, key, errors);
    if value.abs() > limit {
        errors.add(key, format!("must be between -{limit} and {limit}"));
    }
    value
}

fn comma_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn looks_like_email(raw: &str) -> bool {
    raw.split_once('@')
        .is_some_and(|(user, domain)| !user.is_empty() && domain.contains('.'))
}

fn now_value() -> String {
    Local::now().naive_local().format(DATETIME_FORMAT).to_string()
}

/// Admin disburses a loan to a seller.
pub struct LoanDisbursementForm;

impl FormModel for LoanDisbursementForm {
    type Payload = LoanNew;

    const TITLE: &'static str = "Disburse loan";

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::required("user_id", "Seller ID"),
            FieldDef::required("amount", "Amount"),
            FieldDef::required("interest_rate", "Interest rate (%)"),
            FieldDef::required("due_date", "Due date").hint("YYYY-MM-DD"),
            FieldDef::optional("note", "Note"),
        ];
        FIELDS
    }

    fn initial_values() -> FormValues {
        let due = Local::now()
            .date_naive()
            .checked_add_days(Days::new(DEFAULT_LOAN_TERM_DAYS))
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default();
        FormValues::from([
            ("user_id", String::new()),
            ("amount", String::new()),
            ("interest_rate", "0".to_string()),
            ("due_date", due),
            ("note", String::new()),
        ])
    }

    fn validate(values: &FormValues) -> Result<Self::Payload, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let user_id = id(values, "user_id", &mut errors);
        let amount = positive(values, "amount", &mut errors);
        let interest_rate = non_negative(values, "interest_rate", &mut errors);
        let due_date = NaiveDate::parse_from_str(&text(values, "due_date"), DATE_FORMAT)
            .unwrap_or_else(|_| {
                errors.add("due_date", "expected YYYY-MM-DD");
                NaiveDate::MIN
            });
        errors.into_result(LoanNew {
            user_id,
            amount,
            interest_rate,
            due_date,
            note: optional_text(values, "note"),
        })
    }
}

/// Record a repayment against a loan.
pub struct RepaymentForm;

impl FormModel for RepaymentForm {
    type Payload = RepaymentNew;

    const TITLE: &'static str = "Record repayment";

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::required("loan_id", "Loan ID"),
            FieldDef::required("amount", "Amount"),
            FieldDef::required("payment_method", "Payment method")
                .hint("wallet, mobile_money, cash, card"),
            FieldDef::required("paid_at", "Paid at").hint("YYYY-MM-DD HH:MM:SS"),
        ];
        FIELDS
    }

    fn initial_values() -> FormValues {
        FormValues::from([
            ("loan_id", String::new()),
            ("amount", String::new()),
            ("payment_method", PaymentMethod::Wallet.as_str().to_string()),
            ("paid_at", now_value()),
        ])
    }

    fn validate(values: &FormValues) -> Result<Self::Payload, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let loan_id = id(values, "loan_id", &mut errors);
        let amount = positive(values, "amount", &mut errors);
        let payment_method = PaymentMethod::parse(&text(values, "payment_method"))
            .unwrap_or_else(|| {
                errors.add("payment_method", "unknown payment method");
                PaymentMethod::Other
            });
        let paid_at = NaiveDateTime::parse_from_str(&text(values, "paid_at"), DATETIME_FORMAT)
            .unwrap_or_else(|_| {
                errors.add("paid_at", "expected YYYY-MM-DD HH:MM:SS");
                NaiveDateTime::MIN
            });
        errors.into_result(RepaymentNew {
            loan_id,
            amount,
            payment_method,
            paid_at,
        })
    }
}

/// Issue a VFD receipt.
pub struct VfdReceiptForm;

impl FormModel for VfdReceiptForm {
    type Payload = VfdReceiptGenerate;

    const TITLE: &'static str = "Generate VFD receipt";

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::required("receipt_type", "Receipt type").hint("delivery or subscription"),
            FieldDef::required("amount", "Amount"),
            FieldDef::required("customer_name", "Customer name"),
            FieldDef::required("customer_phone", "Customer phone"),
            FieldDef::required("customer_address", "Customer address"),
        ];
        FIELDS
    }

    fn initial_values() -> FormValues {
        let mut values: FormValues = Self::fields().iter().map(|f| (f.key, String::new())).collect();
        values.insert("receipt_type", VfdReceiptType::Delivery.as_str().to_string());
        values
    }

    fn validate(values: &FormValues) -> Result<Self::Payload, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let receipt_type = VfdReceiptType::parse(&text(values, "receipt_type")).unwrap_or_else(|| {
            errors.add("receipt_type", "must be delivery or subscription");
            VfdReceiptType::Other
        });
        let amount = positive(values, "amount", &mut errors);
        let customer_phone = text(values, "customer_phone");
        if !customer_phone
            .chars()
            .all(|c| c.is_ascii_digit() || c == '+' || c == ' ')
        {
            errors.add("customer_phone", "digits only");
        }
        errors.into_result(VfdReceiptGenerate {
            receipt_type,
            amount,
            customer_name: text(values, "customer_name"),
            customer_phone,
            customer_address: text(values, "customer_address"),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WalletTopUpRequest {
    pub user_uuid: String,
    pub top_up: WalletTopUp,
}

/// Credit a user's wallet.
pub struct WalletTopUpForm;

impl FormModel for WalletTopUpForm {
    type Payload = WalletTopUpRequest;

    const TITLE: &'static str = "Top up wallet";

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::required("user_uuid", "User UUID"),
            FieldDef::required("price", "Amount"),
        ];
        FIELDS
    }

    fn validate(values: &FormValues) -> Result<Self::Payload, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let user_uuid = text(values, "user_uuid");
        if user_uuid.contains(char::is_whitespace) || user_uuid.contains('/') {
            errors.add("user_uuid", "not a valid identifier");
        }
        let price = positive(values, "price", &mut errors);
        errors.into_result(WalletTopUpRequest {
            user_uuid,
            top_up: WalletTopUp { price },
        })
    }
}

/// Plan a delivery trip. Stops are written `address@lat,lng` and separated by `;`.
pub struct TripForm;

impl TripForm {
    fn stops(raw: &str, errors: &mut ValidationErrors) -> Vec<TripStopNew> {
        let mut stops = Vec::new();
        for chunk in raw.split(';').map(str::trim).filter(|c| !c.is_empty()) {
            let parsed = chunk.rsplit_once('@').and_then(|(address, coords)| {
                let (lat, lng) = coords.split_once(',')?;
                let lat = lat.trim().parse::<f64>().ok()?;
                let lng = lng.trim().parse::<f64>().ok()?;
                let in_range = lat.abs() <= 90.0 && lng.abs() <= 180.0;
                (in_range && !address.trim().is_empty()).then(|| TripStopNew {
                    address: address.trim().to_string(),
                    lat,
                    lng,
                })
            });
            match parsed {
                Some(stop) => stops.push(stop),
                None => errors.add("stops", format!("cannot read stop \"{chunk}\"")),
            }
        }
        if stops.is_empty() {
            errors.add("stops", "at least one stop is required");
        }
        stops
    }
}

impl FormModel for TripForm {
    type Payload = TripNew;

    const TITLE: &'static str = "Create trip";

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::required("name", "Name"),
            FieldDef::required("start_address", "Start address"),
            FieldDef::required("start_lat", "Start latitude"),
            FieldDef::required("start_lng", "Start longitude"),
            FieldDef::optional("scheduled_at", "Scheduled at").hint("YYYY-MM-DD HH:MM:SS"),
            FieldDef::required("stops", "Stops").hint("Kariakoo@-6.81,39.27; Mbezi@-6.73,39.18"),
        ];
        FIELDS
    }

    fn validate(values: &FormValues) -> Result<Self::Payload, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let start_lat = coordinate(values, "start_lat", 90.0, &mut errors);
        let start_lng = coordinate(values, "start_lng", 180.0, &mut errors);
        let scheduled_at = match optional_text(values, "scheduled_at") {
            Some(raw) => {
                let parsed = api_types::parse_timestamp(&raw);
                if parsed.is_none() {
                    errors.add("scheduled_at", "expected YYYY-MM-DD HH:MM:SS");
                }
                parsed
            }
            None => None,
        };
        let locations = Self::stops(&text(values, "stops"), &mut errors);
        errors.into_result(TripNew {
            name: text(values, "name"),
            start_address: text(values, "start_address"),
            start_lat,
            start_lng,
            scheduled_at,
            locations,
        })
    }
}

/// Send a notification to user groups or explicit addresses.
pub struct BroadcastForm;

impl FormModel for BroadcastForm {
    type Payload = BroadcastSend;

    const TITLE: &'static str = "Send broadcast";

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::required("title", "Title"),
            FieldDef::required("body", "Message"),
            FieldDef::optional("groups", "Groups").hint("sellers, customers, drivers"),
            FieldDef::optional("custom_emails", "Custom emails").hint("comma separated"),
        ];
        FIELDS
    }

    fn validate(values: &FormValues) -> Result<Self::Payload, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let groups = comma_list(&text(values, "groups"));
        let custom_emails = comma_list(&text(values, "custom_emails"));
        if groups.is_empty() && custom_emails.is_empty() {
            errors.add("groups", "choose a group or enter custom emails");
        }
        if let Some(bad) = custom_emails.iter().find(|email| !looks_like_email(email)) {
            errors.add("custom_emails", format!("\"{bad}\" is not an email address"));
        }
        errors.into_result(BroadcastSend {
            title: text(values, "title"),
            body: text(values, "body"),
            groups,
            custom_emails,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CreditsRequest {
    pub user_id: ItemId,
    pub update: CreditsUpdate,
}

/// Set a user's AI assistant credits.
pub struct CreditsForm;

impl FormModel for CreditsForm {
    type Payload = CreditsRequest;

    const TITLE: &'static str = "Update AI credits";

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::required("user_id", "User ID"),
            FieldDef::required("credits", "Credits"),
        ];
        FIELDS
    }

    fn validate(values: &FormValues) -> Result<Self::Payload, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let user_id = id(values, "user_id", &mut errors);
        let credits = text(values, "credits").parse::<u64>().unwrap_or_else(|_| {
            errors.add("credits", "must be a whole number, 0 or more");
            0
        });
        errors.into_result(CreditsRequest {
            user_id,
            update: CreditsUpdate { credits },
        })
    }
}

/// Accept or cancel a pending payout.
pub struct PayoutStatusForm;

impl FormModel for PayoutStatusForm {
    type Payload = PayoutStatusUpdate;

    const TITLE: &'static str = "Update payout";

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::required("status", "Status").hint("accepted or canceled"),
            FieldDef::optional("answer", "Answer"),
        ];
        FIELDS
    }

    fn validate(values: &FormValues) -> Result<Self::Payload, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let status = match PayoutStatus::parse(&text(values, "status")) {
            Some(status @ (PayoutStatus::Accepted | PayoutStatus::Canceled)) => status,
            _ => {
                errors.add("status", "must be accepted or canceled");
                PayoutStatus::Unknown
            }
        };
        let answer = optional_text(values, "answer");
        if status == PayoutStatus::Canceled && answer.is_none() {
            errors.add("answer", "give the seller a reason");
        }
        errors.into_result(PayoutStatusUpdate { status, answer })
    }
}

/// Answer for one payout request, bound to the request it answers.
pub struct PayoutRequestForm;

impl FormModel for PayoutRequestForm {
    type Payload = PayoutRequestAnswer;

    const TITLE: &'static str = "Answer payout request";

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::required("status", "Status").hint("paid or rejected"),
            FieldDef::optional("note", "Note"),
        ];
        FIELDS
    }

    fn validate(values: &FormValues) -> Result<Self::Payload, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let status = match PayoutRequestStatus::parse(&text(values, "status")) {
            Some(status @ (PayoutRequestStatus::Paid | PayoutRequestStatus::Rejected)) => status,
            _ => {
                errors.add("status", "must be paid or rejected");
                PayoutRequestStatus::Unknown
            }
        };
        errors.into_result(PayoutRequestAnswer {
            status,
            note: optional_text(values, "note"),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProductMetadataRequest {
    pub product_id: ItemId,
    pub update: ProductMetadataUpdate,
}

/// Nutrition and allergen data the AI assistant filters products by.
pub struct ProductMetadataForm;

impl FormModel for ProductMetadataForm {
    type Payload = ProductMetadataRequest;

    const TITLE: &'static str = "Edit product metadata";

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::required("product_id", "Product ID"),
            FieldDef::optional("calories", "Calories"),
            FieldDef::optional("ingredient_tags", "Ingredient tags").hint("comma separated"),
            FieldDef::optional("allergen_flags", "Allergen flags").hint("comma separated"),
            FieldDef::optional("representative_image", "Image URL"),
        ];
        FIELDS
    }

    fn validate(values: &FormValues) -> Result<Self::Payload, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let product_id = id(values, "product_id", &mut errors);
        let calories = optional_text(values, "calories").and_then(|raw| {
            raw.parse::<u32>()
                .map_err(|_| errors.add("calories", "must be a whole number, 0 or more"))
                .ok()
        });
        errors.into_result(ProductMetadataRequest {
            product_id,
            update: ProductMetadataUpdate {
                calories,
                ingredient_tags: comma_list(&text(values, "ingredient_tags")),
                allergen_flags: comma_list(&text(values, "allergen_flags")),
                representative_image: optional_text(values, "representative_image"),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values<const N: usize>(pairs: [(&'static str, &str); N]) -> FormValues {
        pairs.into_iter().map(|(k, v)| (k, v.to_string())).collect()
    }

    #[test]
    fn disbursement_rejects_zero_amount() {
        let errors = LoanDisbursementForm::validate(&values([
            ("user_id", "4"),
            ("amount", "0"),
            ("interest_rate", "5"),
            ("due_date", "2026-12-01"),
        ]))
        .unwrap_err();
        assert_eq!(errors.get("amount"), Some("must be greater than 0"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn disbursement_defaults_are_valid_once_filled() {
        let mut draft = LoanDisbursementForm::initial_values();
        draft.insert("user_id", "12".to_string());
        draft.insert("amount", "250000".to_string());
        let loan = LoanDisbursementForm::validate(&draft).unwrap();
        assert_eq!(loan.interest_rate, 0.0);
        assert!(loan.due_date > Local::now().date_naive());
        assert!(loan.note.is_none());
    }

    #[test]
    fn repayment_parses_method_and_time() {
        let repayment = RepaymentForm::validate(&values([
            ("loan_id", "3"),
            ("amount", "1,500"),
            ("payment_method", "Mobile Money"),
            ("paid_at", "2026-03-01 10:30:00"),
        ]))
        .unwrap();
        assert_eq!(repayment.amount, 1500.0);
        assert_eq!(repayment.payment_method, PaymentMethod::MobileMoney);
        assert_eq!(repayment.paid_at.format(DATETIME_FORMAT).to_string(), "2026-03-01 10:30:00");
    }

    #[test]
    fn trip_stops_are_parsed_in_order() {
        let trip = TripForm::validate(&values([
            ("name", "Morning run"),
            ("start_address", "Depot"),
            ("start_lat", "-6.8"),
            ("start_lng", "39.28"),
            ("stops", "Kariakoo@-6.81,39.27; Mbezi Beach@-6.73,39.18"),
        ]))
        .unwrap();
        assert_eq!(trip.locations.len(), 2);
        assert_eq!(trip.locations[1].address, "Mbezi Beach");
        assert!(trip.scheduled_at.is_none());
    }

    #[test]
    fn trip_reports_unreadable_stop() {
        let errors = TripForm::validate(&values([
            ("name", "Run"),
            ("start_address", "Depot"),
            ("start_lat", "-6.8"),
            ("start_lng", "39.28"),
            ("stops", "Kariakoo"),
        ]))
        .unwrap_err();
        assert!(errors.get("stops").unwrap().contains("Kariakoo"));
    }

    #[test]
    fn broadcast_needs_a_target() {
        let errors = BroadcastForm::validate(&values([("title", "Hi"), ("body", "News")])).unwrap_err();
        assert!(errors.get("groups").is_some());

        let send = BroadcastForm::validate(&values([
            ("title", "Hi"),
            ("body", "News"),
            ("custom_emails", "a@jumla.co.tz, b@jumla.co.tz"),
        ]))
        .unwrap();
        assert_eq!(send.custom_emails.len(), 2);
        assert!(send.groups.is_empty());
    }

    #[test]
    fn credits_accept_zero() {
        let request = CreditsForm::validate(&values([("user_id", "9"), ("credits", "0")])).unwrap();
        assert_eq!(request.update.credits, 0);
        assert!(CreditsForm::validate(&values([("user_id", "9"), ("credits", "-1")])).is_err());
    }

    #[test]
    fn payout_cancel_needs_answer() {
        let errors = PayoutStatusForm::validate(&values([("status", "cancelled")])).unwrap_err();
        assert!(errors.get("answer").is_some());
        let update = PayoutStatusForm::validate(&values([("status", "accepted")])).unwrap();
        assert_eq!(update.status, PayoutStatus::Accepted);
    }

    #[test]
    fn top_up_rejects_path_like_uuid() {
        let errors =
            WalletTopUpForm::validate(&values([("user_uuid", "../x"), ("price", "10")])).unwrap_err();
        assert!(errors.get("user_uuid").is_some());
    }

    #[test]
    fn payout_request_answer_is_paid_or_rejected() {
        let errors = PayoutRequestForm::validate(&values([("status", "processed")])).unwrap_err();
        assert_eq!(errors.get("status"), Some("must be paid or rejected"));
        let answer =
            PayoutRequestForm::validate(&values([("status", "Rejected"), ("note", " ")])).unwrap();
        assert_eq!(answer.status, PayoutRequestStatus::Rejected);
        assert_eq!(answer.note, None);
    }

    #[test]
    fn product_metadata_splits_tags() {
        let request = ProductMetadataForm::validate(&values([
            ("product_id", "3"),
            ("calories", "420"),
            ("ingredient_tags", "vegetarian, , spicy"),
            ("allergen_flags", ""),
        ]))
        .unwrap();
        assert_eq!(request.product_id, 3);
        assert_eq!(request.update.calories, Some(420));
        assert_eq!(request.update.ingredient_tags, vec!["vegetarian", "spicy"]);
        assert!(request.update.allergen_flags.is_empty());

        let errors = ProductMetadataForm::validate(&values([
            ("product_id", "3"),
            ("calories", "lots"),
        ]))
        .unwrap_err();
        assert!(errors.get("calories").is_some());
    }
}
