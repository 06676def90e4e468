use std::marker::PhantomData;

use api_types::{ItemId, ItemResponse, ListResponse};
use engine::{ListParams, ResourceService, ServiceError};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::Client;

/// REST resource living under one collection path.
///
/// `GET path`, `GET path/{id}`, `POST path`, `PUT path/{id}`, `DELETE path/{id}`.
pub struct RestResource<T> {
    client: Client,
    path: &'static str,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for RestResource<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            path: self.path,
            _record: PhantomData,
        }
    }
}

impl<T> RestResource<T> {
    pub fn new(client: Client, path: &'static str) -> Self {
        Self {
            client,
            path,
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    fn item_path(&self, id: ItemId) -> String {
        format!("{}/{id}", self.path)
    }
}

impl<T: DeserializeOwned + Send> ResourceService<T> for RestResource<T> {
    async fn list(&self, params: &ListParams) -> Result<ListResponse<T>, ServiceError> {
        Ok(self.client.get(self.path, &params.to_query()).await?)
    }

    async fn get(&self, id: ItemId) -> Result<T, ServiceError> {
        let item: ItemResponse<T> = self.client.get(&self.item_path(id), &[]).await?;
        Ok(item.into_inner())
    }

    async fn create<P>(&self, payload: &P) -> Result<T, ServiceError>
    where
        P: Serialize + Sync,
    {
        let item: ItemResponse<T> = self.client.post(self.path, payload).await?;
        Ok(item.into_inner())
    }

    async fn update<P>(&self, id: ItemId, payload: &P) -> Result<T, ServiceError>
    where
        P: Serialize + Sync,
    {
        let item: ItemResponse<T> = self.client.put(&self.item_path(id), payload).await?;
        Ok(item.into_inner())
    }

    async fn delete(&self, id: ItemId) -> Result<(), ServiceError> {
        Ok(self.client.delete(&self.item_path(id)).await?)
    }
}
