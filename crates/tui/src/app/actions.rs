//! Requests issued from key handlers and how their answers land in state.
use api_types::ItemId;
use engine::forms::{
    BroadcastForm, CreditsForm, LoanDisbursementForm, PayoutRequestForm, PayoutStatusForm,
    ProductMetadataForm, RepaymentForm, TripForm, VfdReceiptForm, WalletTopUpForm,
};
use engine::{ResourceService, ServiceError};
use tracing::warn;

use super::forms::{self, ActiveForm};
use super::screens::{routes, spawn_request};
use super::{App, ToastState};

impl App {
    /// Validate the open form and send it. The response comes back through
    /// [`forms::settle`], tagged with a fresh submission id.
    pub(super) fn submit_form(&mut self) {
        let Some(open) = self.state.form.as_mut() else {
            return;
        };
        let submission = self.state.submissions + 1;
        let events = &self.events_tx;
        let target = open.target;
        match &mut open.form {
            ActiveForm::Loan(form) => {
                let Some(payload) = form.prepare() else {
                    return;
                };
                let service = self.state.screens.loans.service().clone();
                spawn_request(
                    events,
                    async move { service.create(&payload).await },
                    move |state, nav, result| {
                        forms::settle::<LoanDisbursementForm, _>(
                            state,
                            nav,
                            submission,
                            result,
                            &[routes::LOANS],
                            "Loan disbursed",
                        )
                    },
                );
            }
            ActiveForm::Repayment(form) => {
                let Some(payload) = form.prepare() else {
                    return;
                };
                let (service, refetch) = self.state.screens.repayment_target(self.state.role);
                let service = service.clone();
                spawn_request(
                    events,
                    async move { service.create(&payload).await },
                    move |state, nav, result| {
                        forms::settle::<RepaymentForm, _>(
                            state,
                            nav,
                            submission,
                            result,
                            refetch,
                            "Repayment recorded",
                        )
                    },
                );
            }
            ActiveForm::Vfd(form) => {
                let Some(payload) = form.prepare() else {
                    return;
                };
                let client = self.client.clone();
                spawn_request(
                    events,
                    async move {
                        client
                            .vfd_generate(&payload)
                            .await
                            .map_err(ServiceError::from)
                    },
                    move |state, nav, result| {
                        forms::settle::<VfdReceiptForm, _>(
                            state,
                            nav,
                            submission,
                            result,
                            &[routes::VFD_RECEIPTS],
                            "Receipt generated",
                        )
                    },
                );
            }
            ActiveForm::TopUp(form) => {
                let Some(request) = form.prepare() else {
                    return;
                };
                let client = self.client.clone();
                spawn_request(
                    events,
                    async move {
                        client
                            .wallet_top_up(&request.user_uuid, &request.top_up)
                            .await
                            .map_err(ServiceError::from)
                    },
                    move |state, nav, result| {
                        forms::settle::<WalletTopUpForm, _>(
                            state,
                            nav,
                            submission,
                            result,
                            &[routes::WALLET],
                            "Wallet topped up",
                        )
                    },
                );
            }
            ActiveForm::Trip(form) => {
                let Some(payload) = form.prepare() else {
                    return;
                };
                let service = self.state.screens.trips.service().clone();
                spawn_request(
                    events,
                    async move { service.create(&payload).await },
                    move |state, nav, result| {
                        forms::settle::<TripForm, _>(
                            state,
                            nav,
                            submission,
                            result,
                            &[routes::TRIPS],
                            "Trip created",
                        )
                    },
                );
            }
            ActiveForm::Broadcast(form) => {
                let Some(payload) = form.prepare() else {
                    return;
                };
                let client = self.client.clone();
                spawn_request(
                    events,
                    async move {
                        client
                            .broadcast_send(&payload)
                            .await
                            .map_err(ServiceError::from)
                    },
                    move |state, nav, result| {
                        forms::settle::<BroadcastForm, _>(
                            state,
                            nav,
                            submission,
                            result,
                            &[routes::BROADCASTS],
                            "Broadcast sent",
                        )
                    },
                );
            }
            ActiveForm::Credits(form) => {
                let Some(request) = form.prepare() else {
                    return;
                };
                let client = self.client.clone();
                spawn_request(
                    events,
                    async move {
                        client
                            .ai_update_credits(request.user_id, &request.update)
                            .await
                            .map_err(ServiceError::from)
                    },
                    move |state, nav, result| {
                        forms::settle::<CreditsForm, _>(
                            state,
                            nav,
                            submission,
                            result,
                            &[routes::ASSISTANT_LOGS],
                            "Credits updated",
                        )
                    },
                );
            }
            ActiveForm::ProductMetadata(form) => {
                let Some(request) = form.prepare() else {
                    return;
                };
                let client = self.client.clone();
                spawn_request(
                    events,
                    async move {
                        client
                            .ai_update_product_metadata(request.product_id, &request.update)
                            .await
                            .map_err(ServiceError::from)
                    },
                    move |state, nav, result| {
                        forms::settle::<ProductMetadataForm, _>(
                            state,
                            nav,
                            submission,
                            result,
                            &[routes::PRODUCTS],
                            "Product metadata saved",
                        )
                    },
                );
            }
            ActiveForm::Payout(form) => {
                let Some(id) = target else {
                    return;
                };
                let Some(payload) = form.prepare() else {
                    return;
                };
                let service = self.state.screens.payouts.service().clone();
                spawn_request(
                    events,
                    async move { service.update(id, &payload).await },
                    move |state, nav, result| {
                        forms::settle::<PayoutStatusForm, _>(
                            state,
                            nav,
                            submission,
                            result,
                            &[routes::PAYOUTS],
                            "Payout answered",
                        )
                    },
                );
            }
            ActiveForm::PayoutRequest(form) => {
                let Some(id) = target else {
                    return;
                };
                let Some(payload) = form.prepare() else {
                    return;
                };
                let service = self.state.screens.payout_requests.service().clone();
                spawn_request(
                    events,
                    async move { service.update(id, &payload).await },
                    move |state, nav, result| {
                        forms::settle::<PayoutRequestForm, _>(
                            state,
                            nav,
                            submission,
                            result,
                            &[routes::PAYOUT_REQUESTS],
                            "Payout request answered",
                        )
                    },
                );
            }
        }
        open.submission = Some(submission);
        self.state.submissions = submission;
    }

    pub(super) fn delete_orders(&self, ids: Vec<ItemId>) {
        let client = self.client.clone();
        let count = ids.len();
        spawn_request(
            &self.events_tx,
            async move { client.orders_delete(&ids).await },
            move |state, nav, result| match result {
                Ok(()) => {
                    state.marked_orders.clear();
                    state.toast = Some(ToastState::success(format!("Deleted {count} orders")));
                    nav.set_refetch(routes::ORDERS);
                }
                Err(err) => {
                    warn!(count, error = %err, "bulk order delete failed");
                    state.toast = Some(ToastState::error(err.to_string()));
                }
            },
        );
    }

    pub(super) fn complete_trip(&mut self, trip_id: ItemId) {
        let client = self.client.clone();
        spawn_request(
            &self.events_tx,
            async move { client.tracking_complete(trip_id).await },
            move |state, nav, result| match result {
                Ok(ack) => {
                    let message = ack
                        .message
                        .unwrap_or_else(|| format!("Trip #{trip_id} completed"));
                    state.toast = Some(ToastState::success(message));
                    state.tracking_refresh = true;
                    nav.set_refetch(routes::TRIPS);
                }
                Err(err) => state.toast = Some(ToastState::error(err.to_string())),
            },
        );
    }

    pub(super) fn optimize_trip(&self, trip_id: ItemId) {
        let client = self.client.clone();
        spawn_request(
            &self.events_tx,
            async move { client.trips_optimize(trip_id).await },
            move |state, nav, result| match result {
                Ok(ack) => {
                    let message = ack
                        .message
                        .unwrap_or_else(|| format!("Trip #{trip_id} optimized"));
                    state.toast = Some(ToastState::success(message));
                    nav.set_refetch(routes::TRIPS);
                    nav.set_refetch(routes::OPTIMIZATION_LOGS);
                }
                Err(err) => state.toast = Some(ToastState::error(err.to_string())),
            },
        );
    }

    pub(super) fn resend_broadcast(&self, broadcast_id: ItemId) {
        let client = self.client.clone();
        spawn_request(
            &self.events_tx,
            async move { client.broadcast_resend(broadcast_id).await },
            move |state, nav, result| match result {
                Ok(ack) => {
                    let message = ack.message.unwrap_or_else(|| "Broadcast resent".to_string());
                    state.toast = Some(ToastState::success(message));
                    nav.set_refetch(routes::BROADCASTS);
                }
                Err(err) => state.toast = Some(ToastState::error(err.to_string())),
            },
        );
    }

    pub(super) fn load_active_trips(&mut self) {
        self.state.tracking.loading = true;
        let client = self.client.clone();
        spawn_request(
            &self.events_tx,
            async move { client.tracking_active().await },
            |state, _nav, result| {
                state.tracking.loading = false;
                match result {
                    Ok(trips) => {
                        state.tracking.error = None;
                        state.tracking.set_trips(trips);
                    }
                    Err(err) => state.tracking.error = Some(err.to_string()),
                }
            },
        );
    }

    pub(super) fn load_assistant(&self) {
        let client = self.client.clone();
        spawn_request(
            &self.events_tx,
            async move {
                tokio::join!(
                    client.ai_statistics(),
                    client.ai_top_filters(),
                    client.ai_top_exclusions()
                )
            },
            |state, _nav, (stats, filters, exclusions)| {
                let panel = &mut state.assistant;
                panel.error = None;
                match stats {
                    Ok(stats) => panel.stats = Some(stats),
                    Err(err) => panel.error = Some(err.to_string()),
                }
                match filters {
                    Ok(rows) => panel.top_filters = rows,
                    Err(err) => panel.error = Some(err.to_string()),
                }
                match exclusions {
                    Ok(rows) => panel.top_exclusions = rows,
                    Err(err) => panel.error = Some(err.to_string()),
                }
            },
        );
    }

    pub(super) fn load_seller_stats(&self) {
        let client = self.client.clone();
        spawn_request(
            &self.events_tx,
            async move { client.seller_loan_statistics().await },
            |state, _nav, result| match result {
                Ok(stats) => state.seller_stats = Some(stats),
                Err(err) => {
                    warn!(error = %err, "seller loan statistics unavailable");
                    state.seller_stats = None;
                }
            },
        );
    }
}
