use std::marker::PhantomData;

use async_trait::async_trait;
use catalog::{CatalogService, LoadQuery, LoadResponse, Record, Result};
use common::ListPayload;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, trace};

use super::{ApiClient, Resource};

/// Any DTO a REST collection can be loaded into.
pub trait RestEntity: DeserializeOwned + Record + Clone + Send + Sync + 'static {}

impl<T> RestEntity for T where T: DeserializeOwned + Record + Clone + Send + Sync + 'static {}

/// [`CatalogService`] backed by one REST collection.
///
/// Form payloads are JSON values handed to the backend untouched.
pub struct RestCatalog<E> {
    client: ApiClient,
    resource: Resource,
    _entity: PhantomData<fn() -> E>,
}

impl<E: RestEntity> RestCatalog<E> {
    pub fn new(client: ApiClient, resource: Resource) -> Self {
        Self {
            client,
            resource,
            _entity: PhantomData,
        }
    }

    /// Fetches a single entity by id.
    pub async fn get(&self, id: i64) -> Result<E> {
        trace!("Fetching {} with ID: {}", self.resource.label(), id);
        let result = self.client.get::<E>(&self.resource.item_path(id), &[]).await;
        if let Err(e) = &result {
            error!("Failed to fetch {} {}: {}", self.resource.label(), id, e);
        }
        result
    }
}

#[async_trait]
impl<E: RestEntity> CatalogService for RestCatalog<E> {
    type Entity = E;
    type Create = Value;
    type Update = Value;
    type Output = E;

    async fn load(&self, query: &LoadQuery) -> Result<LoadResponse<E>> {
        let params = self.resource.query_params(query);
        let payload = self
            .client
            .get::<ListPayload<E>>(self.resource.path(), &params)
            .await?;

        let response = LoadResponse::from(payload);
        match &response {
            LoadResponse::List(items) => debug!("Fetched {} {} rows", items.len(), self.resource.label()),
            LoadResponse::Paged { data, total } => debug!(
                "Fetched {} of {} {} rows",
                data.len(),
                total,
                self.resource.label()
            ),
        }
        Ok(response)
    }

    async fn create(&self, payload: Value) -> Result<E> {
        debug!("Creating new {}", self.resource.label());
        let created = self.client.post::<E, _>(self.resource.path(), &payload).await?;
        info!(
            "Successfully created {} (ID: {})",
            self.resource.label(),
            created.id()
        );
        Ok(created)
    }

    async fn update(&self, id: i64, payload: Value) -> Result<E> {
        debug!("Updating {} ID: {}", self.resource.label(), id);
        let updated = self
            .client
            .put::<E, _>(&self.resource.item_path(id), &payload)
            .await?;
        info!("Successfully updated {} (ID: {})", self.resource.label(), id);
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        debug!("Deleting {} ID: {}", self.resource.label(), id);
        self.client.delete(&self.resource.item_path(id)).await
    }
}
