//! Endpoint paths, relative to `{base_url}/api/v1/`.

pub const LOANS: &str = "dashboard/admin/loans";
pub const LOAN_REPAYMENTS: &str = "dashboard/admin/loan-repayments";
pub const SELLER_LOANS: &str = "dashboard/seller/loans";
pub const SELLER_REPAYMENTS: &str = "dashboard/seller/loan-repayments";
pub const SELLER_LOAN_STATISTICS: &str = "dashboard/seller/loan-analytics/statistics";
pub const PAYOUTS: &str = "dashboard/admin/payouts";
pub const PAYOUT_REQUESTS: &str = "dashboard/admin/payout-requests";
pub const ORDERS: &str = "dashboard/admin/orders";
pub const ORDERS_DELETE: &str = "dashboard/admin/orders/delete";
pub const TRIPS: &str = "dashboard/admin/trips";
pub const TRIP_OPTIMIZATION_LOGS: &str = "dashboard/admin/trips/optimization-logs";
pub const TRIP_TRACKING: &str = "dashboard/admin/trip-tracking";
pub const VFD_RECEIPTS: &str = "dashboard/admin/vfd-receipts";
pub const VFD_GENERATE: &str = "dashboard/admin/vfd-receipts/generate";
pub const WALLET_HISTORIES: &str = "dashboard/admin/wallet/histories";
pub const USERS: &str = "dashboard/admin/users";
pub const BROADCASTS: &str = "dashboard/admin/broadcasts";
pub const BROADCAST_SEND: &str = "dashboard/admin/broadcasts/send";
pub const AI_ASSISTANT: &str = "dashboard/admin/ai-assistant";
pub const AI_ASSISTANT_LOGS: &str = "dashboard/admin/ai-assistant/logs";
pub const PRODUCTS: &str = "dashboard/admin/products";
