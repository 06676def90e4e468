#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use api_types::loan::{Loan, LoanStatus, PaymentMethod, Repayment};
use api_types::{ItemId, ListResponse, Meta, UserRef};
use engine::{ListParams, ResourceService, ServiceError};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::oneshot;

/// In-memory resource backend that paginates like the real API.
pub struct InMemory<T> {
    rows: Mutex<Vec<T>>,
    requests: Mutex<Vec<ListParams>>,
    fail_next: Mutex<Option<ServiceError>>,
    gates: Mutex<HashMap<u32, oneshot::Receiver<()>>>,
    matches: fn(&T, &str) -> bool,
    build: fn(ItemId, Value) -> T,
}

impl<T: Clone> InMemory<T> {
    pub fn new(rows: Vec<T>, matches: fn(&T, &str) -> bool, build: fn(ItemId, Value) -> T) -> Self {
        Self {
            rows: Mutex::new(rows),
            requests: Mutex::new(Vec::new()),
            fail_next: Mutex::new(None),
            gates: Mutex::new(HashMap::new()),
            matches,
            build,
        }
    }

    pub fn requests(&self) -> Vec<ListParams> {
        self.requests.lock().unwrap().clone()
    }

    pub fn rows(&self) -> Vec<T> {
        self.rows.lock().unwrap().clone()
    }

    pub fn fail_next(&self, err: ServiceError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    /// Hold list requests for `page` until the returned sender fires.
    pub fn gate(&self, page: u32) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(page, rx);
        tx
    }

    fn take_failure(&self) -> Result<(), ServiceError> {
        match self.fail_next.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl<T: Clone + Send + Sync> ResourceService<T> for InMemory<T> {
    async fn list(&self, params: &ListParams) -> Result<ListResponse<T>, ServiceError> {
        self.requests.lock().unwrap().push(params.clone());
        let gate = self.gates.lock().unwrap().remove(&params.page);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.take_failure()?;

        let rows = self.rows.lock().unwrap().clone();
        let matching: Vec<T> = match params.search.as_deref() {
            Some(term) => rows.into_iter().filter(|row| (self.matches)(row, term)).collect(),
            None => rows,
        };
        let skip = (params.page.saturating_sub(1) * params.per_page) as usize;
        Ok(ListResponse {
            data: matching
                .iter()
                .skip(skip)
                .take(params.per_page as usize)
                .cloned()
                .collect(),
            meta: Meta {
                current_page: params.page,
                per_page: params.per_page,
                total: matching.len() as u64,
            },
        })
    }

    async fn get(&self, id: ItemId) -> Result<T, ServiceError> {
        self.take_failure()?;
        let rows = self.rows.lock().unwrap();
        let index = (id as usize).checked_sub(1);
        index
            .and_then(|i| rows.get(i).cloned())
            .ok_or_else(|| ServiceError::RequestFailed {
                status: engine::FailureStatus::Http(404),
                message: "Not Found".to_string(),
            })
    }

    async fn create<P>(&self, payload: &P) -> Result<T, ServiceError>
    where
        P: Serialize + Sync,
    {
        self.take_failure()?;
        let body = serde_json::to_value(payload).map_err(|e| ServiceError::Decode(e.to_string()))?;
        let mut rows = self.rows.lock().unwrap();
        let row = (self.build)(rows.len() as ItemId + 1, body);
        rows.push(row.clone());
        Ok(row)
    }

    async fn update<P>(&self, id: ItemId, payload: &P) -> Result<T, ServiceError>
    where
        P: Serialize + Sync,
    {
        self.take_failure()?;
        let body = serde_json::to_value(payload).map_err(|e| ServiceError::Decode(e.to_string()))?;
        let row = (self.build)(id, body);
        let mut rows = self.rows.lock().unwrap();
        if let Some(slot) = rows.get_mut(id as usize - 1) {
            *slot = row.clone();
        }
        Ok(row)
    }

    async fn delete(&self, id: ItemId) -> Result<(), ServiceError> {
        self.take_failure()?;
        let mut rows = self.rows.lock().unwrap();
        if (id as usize) <= rows.len() {
            rows.remove(id as usize - 1);
        }
        Ok(())
    }
}

pub fn loan(id: ItemId, firstname: &str) -> Loan {
    Loan {
        id,
        user: Some(UserRef {
            id: Some(100 + id),
            uuid: None,
            firstname: Some(firstname.to_string()),
            lastname: None,
        }),
        amount: 1000.0 * id as f64,
        interest_rate: 5.0,
        repayment_amount: 1050.0 * id as f64,
        disbursed_by_user: None,
        disbursed_at: None,
        due_date: None,
        status: LoanStatus::Active,
    }
}

pub fn loans(count: u64) -> InMemory<Loan> {
    let names = ["Amina", "Baraka", "Neema", "Juma", "Zawadi"];
    let rows = (1..=count)
        .map(|id| loan(id, names[(id as usize - 1) % names.len()]))
        .collect();
    InMemory::new(
        rows,
        |loan, term| {
            loan.user
                .as_ref()
                .is_some_and(|u| u.display_name().to_lowercase().contains(&term.to_lowercase()))
        },
        |id, body| {
            let mut loan = loan(id, "New");
            loan.amount = body["amount"].as_f64().unwrap_or_default();
            loan
        },
    )
}

pub fn repayments() -> InMemory<Repayment> {
    InMemory::new(Vec::new(), |_, _| true, |id, body| Repayment {
        id,
        loan_id: body["loan_id"].as_u64().unwrap_or_default(),
        user: None,
        amount: body["amount"].as_f64().unwrap_or_default(),
        payment_method: Some(PaymentMethod::Wallet),
        paid_at: None,
    })
}
