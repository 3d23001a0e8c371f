pub mod product;
pub mod resource;
pub mod rest_catalog;

pub use resource::{FilterInput, Resource};
pub use rest_catalog::{RestCatalog, RestEntity};

use std::time::Duration;

use catalog::{Result, ServiceError};
use common::ErrorResponse;
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, info, trace, warn};

/// Thin JSON client for the store backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Common GET request handler
    pub async fn get<T>(&self, endpoint: &str, query: &[(String, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.url(endpoint);
        debug!("GET request to: {} {:?}", url, query);
        let response = self.send("GET", endpoint, self.http.get(&url).query(query)).await?;
        Self::parse("GET", endpoint, response).await
    }

    /// Common POST request handler
    pub async fn post<T, B>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(endpoint);
        debug!("POST request to: {}", url);
        let response = self.send("POST", endpoint, self.http.post(&url).json(body)).await?;
        Self::parse("POST", endpoint, response).await
    }

    /// Common PUT request handler
    pub async fn put<T, B>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(endpoint);
        debug!("PUT request to: {}", url);
        let response = self.send("PUT", endpoint, self.http.put(&url).json(body)).await?;
        Self::parse("PUT", endpoint, response).await
    }

    /// Common DELETE request handler. Whatever body comes back is ignored.
    pub async fn delete(&self, endpoint: &str) -> Result<()> {
        let url = self.url(endpoint);
        debug!("DELETE request to: {}", url);
        self.send("DELETE", endpoint, self.http.delete(&url)).await?;
        info!("DELETE {} - Success", endpoint);
        Ok(())
    }

    /// Multipart POST carrying one file under the `file` field.
    pub async fn upload<T>(
        &self,
        endpoint: &str,
        file_name: String,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.url(endpoint);
        debug!("UPLOAD request to: {} ({} bytes, {})", url, bytes.len(), mime);

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime)
            .map_err(|e| ServiceError::Other(format!("Invalid content type {}: {}", mime, e)))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .send("UPLOAD", endpoint, self.http.post(&url).multipart(form))
            .await?;
        Self::parse("UPLOAD", endpoint, response).await
    }

    async fn send(&self, method: &str, endpoint: &str, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            let error_msg = format!("Request failed: {}", e);
            error!("{} {} - {}", method, endpoint, error_msg);
            ServiceError::Transport(error_msg)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        warn!("{} {} - Non-OK response: {}", method, endpoint, status);
        let message = response
            .json::<ErrorResponse>()
            .await
            .ok()
            .and_then(ErrorResponse::server_message);
        match &message {
            Some(message) => error!("{} {} - API error: {:?}", method, endpoint, message),
            None => error!("{} {} - HTTP error: {}", method, endpoint, status),
        }

        Err(ServiceError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn parse<T>(method: &str, endpoint: &str, response: Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        trace!("{} {} - Response received, parsing JSON", method, endpoint);
        let parsed = response.json::<T>().await.map_err(|e| {
            let error_msg = e.to_string();
            error!("{} {} - Failed to parse response: {}", method, endpoint, error_msg);
            ServiceError::Decode(error_msg)
        })?;

        info!("{} {} - Success", method, endpoint);
        Ok(parsed)
    }
}
