//! Per-resource list state and the service seam it loads from.
//!
//! A [`ResourceStore`] owns the [`ListState`] of one resource. Fetches are
//! split in two halves, [`ResourceStore::begin_fetch`] and
//! [`ResourceStore::complete`], so the request itself can run on another task
//! while the store stays with its owner. Every ticket carries the generation
//! of the store at issue time; only the latest ticket may write.
use std::future::Future;

use api_types::{ItemId, ListResponse, Meta};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ServiceError;
use crate::params::{ListParams, ParamsPatch};

/// A record that can be addressed by id.
pub trait ResourceItem {
    fn id(&self) -> ItemId;
}

/// Remote CRUD surface of one resource.
pub trait ResourceService<T>: Send + Sync {
    fn list(
        &self,
        params: &ListParams,
    ) -> impl Future<Output = Result<ListResponse<T>, ServiceError>> + Send;

    fn get(&self, id: ItemId) -> impl Future<Output = Result<T, ServiceError>> + Send;

    fn create<P>(&self, payload: &P) -> impl Future<Output = Result<T, ServiceError>> + Send
    where
        P: Serialize + Sync;

    fn update<P>(
        &self,
        id: ItemId,
        payload: &P,
    ) -> impl Future<Output = Result<T, ServiceError>> + Send
    where
        P: Serialize + Sync;

    fn delete(&self, id: ItemId) -> impl Future<Output = Result<(), ServiceError>> + Send;
}

/// What a list screen renders.
#[derive(Clone, Debug, PartialEq)]
pub struct ListState<T> {
    pub items: Vec<T>,
    pub meta: Meta,
    pub params: ListParams,
    pub loading: bool,
    pub error: Option<String>,
}

/// Proof that a fetch was issued; hand it back to [`ResourceStore::complete`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    params: ListParams,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn params(&self) -> &ListParams {
        &self.params
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    StaleDiscarded,
}

#[derive(Debug)]
pub struct ResourceStore<T> {
    name: &'static str,
    state: ListState<T>,
    generation: u64,
    sync_page_from_meta: bool,
}

impl<T> ResourceStore<T> {
    pub fn new(name: &'static str, params: ListParams) -> Self {
        Self {
            name,
            state: ListState {
                items: Vec::new(),
                meta: Meta::default(),
                params,
                loading: false,
                error: None,
            },
            generation: 0,
            sync_page_from_meta: false,
        }
    }

    /// Let `params.page`/`params.per_page` follow the server's `meta` after
    /// every successful fetch.
    pub fn with_page_sync(mut self) -> Self {
        self.sync_page_from_meta = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn state(&self) -> &ListState<T> {
        &self.state
    }

    pub fn params(&self) -> &ListParams {
        &self.state.params
    }

    /// Merge `patch` into the stored params. Never fetches.
    pub fn set_params(&mut self, patch: ParamsPatch) {
        self.state.params.merge(patch);
    }

    pub fn begin_fetch(&mut self, params: ListParams) -> FetchTicket {
        self.generation += 1;
        self.state.loading = true;
        self.state.params = params.clone();
        debug!(
            store = self.name,
            generation = self.generation,
            page = params.page,
            per_page = params.per_page,
            "fetch issued"
        );
        FetchTicket {
            generation: self.generation,
            params,
        }
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation
    }

    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<ListResponse<T>, ServiceError>,
    ) -> FetchOutcome {
        if !self.is_current(&ticket) {
            debug!(
                store = self.name,
                generation = ticket.generation,
                current = self.generation,
                "stale response discarded"
            );
            return FetchOutcome::StaleDiscarded;
        }

        self.state.loading = false;
        match result {
            Ok(ListResponse { mut data, meta }) => {
                let per_page = ticket.params.per_page as usize;
                if per_page > 0 && data.len() > per_page {
                    warn!(
                        store = self.name,
                        received = data.len(),
                        per_page,
                        "server returned more rows than requested, truncating"
                    );
                    data.truncate(per_page);
                }
                if self.sync_page_from_meta {
                    self.state.params.page = meta.current_page;
                    self.state.params.per_page = meta.per_page;
                }
                self.state.items = data;
                self.state.meta = meta;
                self.state.error = None;
            }
            Err(err) => {
                warn!(store = self.name, error = %err, "list fetch failed");
                self.state.items.clear();
                self.state.error = Some(err.to_string());
            }
        }
        FetchOutcome::Applied
    }

    /// Cut off every fetch issued so far, e.g. when the screen goes away.
    pub fn detach(&mut self) {
        self.generation += 1;
        self.state.loading = false;
    }
}

impl<T: Send> ResourceStore<T> {
    /// Issue and await one fetch in place.
    pub async fn fetch_list<S>(&mut self, service: &S, params: ListParams) -> FetchOutcome
    where
        S: ResourceService<T>,
    {
        let ticket = self.begin_fetch(params);
        let result = service.list(ticket.params()).await;
        self.complete(ticket, result)
    }

    /// Refetch with the params currently stored.
    pub async fn refresh<S>(&mut self, service: &S) -> FetchOutcome
    where
        S: ResourceService<T>,
    {
        let params = self.state.params.clone();
        self.fetch_list(service, params).await
    }

    /// Create a record. The list is left untouched; refetch to see it.
    pub async fn create<S, P>(&self, service: &S, payload: &P) -> Result<T, ServiceError>
    where
        S: ResourceService<T>,
        P: Serialize + Sync,
    {
        service.create(payload).await.inspect_err(|err| {
            warn!(store = self.name, error = %err, "create failed");
        })
    }

    pub async fn update<S, P>(&self, service: &S, id: ItemId, payload: &P) -> Result<T, ServiceError>
    where
        S: ResourceService<T>,
        P: Serialize + Sync,
    {
        service.update(id, payload).await.inspect_err(|err| {
            warn!(store = self.name, id, error = %err, "update failed");
        })
    }

    pub async fn delete<S>(&self, service: &S, id: ItemId) -> Result<(), ServiceError>
    where
        S: ResourceService<T>,
    {
        service.delete(id).await.inspect_err(|err| {
            warn!(store = self.name, id, error = %err, "delete failed");
        })
    }
}
