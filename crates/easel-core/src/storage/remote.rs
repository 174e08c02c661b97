//! HTTP storage backend.
//!
//! Protocol, relative to the configured base URL:
//! - `POST {base}/save` with `{ "name", "data" }`
//! - `GET {base}/get/{name}` answering `{ "data" }`, or a non-2xx status when
//!   there is nothing to return
//! - `GET {base}/list` answering `{ "names" }`
//! - `DELETE {base}/delete/{name}`
//!
//! The design name is percent-encoded as a single path segment. Requests
//! have no timeout and are never retried.

use super::{BoxFuture, Storage, StorageError, StorageResult, validate_name};
use crate::document::{CanvasDocument, SerializedDocument};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct SaveRequest<'a> {
    name: &'a str,
    data: &'a SerializedDocument,
}

#[derive(Deserialize)]
struct LoadResponse {
    data: SerializedDocument,
}

#[derive(Deserialize)]
struct ListResponse {
    names: Vec<String>,
}

#[derive(Deserialize, Default)]
struct MessageResponse {
    #[serde(default)]
    message: Option<String>,
}

fn transport_error(e: reqwest::Error) -> StorageError {
    log::error!("Remote storage request failed: {}", e);
    StorageError::Transport(e.to_string())
}

/// Designs kept by a remote service.
#[derive(Debug, Clone)]
pub struct RemoteStorage {
    client: Client,
    base_url: Url,
}

impl RemoteStorage {
    /// Create a backend for the service at `base_url`
    /// (e.g. `http://localhost:5000/api/canvas`).
    pub fn new(base_url: &str) -> StorageResult<Self> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> StorageResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StorageError::Other(format!("Invalid base URL {:?}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(StorageError::Other(format!(
                "Invalid base URL {:?}: cannot hold a path",
                base_url.as_str()
            )));
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> StorageResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| StorageError::Other(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn rejected(response: reqwest::Response) -> StorageError {
        let status = response.status();
        let message = response
            .json::<MessageResponse>()
            .await
            .unwrap_or_default()
            .message
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
        log::warn!("Remote storage answered {}: {}", status, message);
        StorageError::Server {
            status: status.as_u16(),
            message,
        }
    }

    async fn save_remote(
        &self,
        name: String,
        data: SerializedDocument,
    ) -> StorageResult<Option<String>> {
        let url = self.endpoint(&["save"])?;
        let response = self
            .client
            .post(url)
            .json(&SaveRequest {
                name: &name,
                data: &data,
            })
            .send()
            .await
            .map_err(transport_error)?;
        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }
        log::info!("Saved design {:?} to {}", name, self.base_url);
        let ack = response.json::<MessageResponse>().await.unwrap_or_default();
        Ok(ack.message.filter(|m| !m.trim().is_empty()))
    }

    async fn load_remote(&self, name: String) -> StorageResult<CanvasDocument> {
        let url = self.endpoint(&["get", &name])?;
        let response = self.client.get(url).send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            log::warn!("Loading design {:?} failed with status {}", name, status);
            return Err(StorageError::NotFound(name));
        }
        let corrupt = |reason: String| {
            log::warn!("Design {:?} from server is unreadable: {}", name, reason);
            StorageError::Corrupt {
                name: name.clone(),
                reason,
            }
        };
        let body: LoadResponse = response
            .json()
            .await
            .map_err(|e| corrupt(e.to_string()))?;
        CanvasDocument::from_serialized(&body.data).map_err(|e| corrupt(e.to_string()))
    }

    async fn delete_remote(&self, name: String) -> StorageResult<()> {
        let url = self.endpoint(&["delete", &name])?;
        let response = self.client.delete(url).send().await.map_err(transport_error)?;
        if response.status().is_success() || response.status() == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(Self::rejected(response).await)
        }
    }

    async fn list_remote(&self) -> StorageResult<Vec<String>> {
        let url = self.endpoint(&["list"])?;
        let response = self.client.get(url).send().await.map_err(transport_error)?;
        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }
        let body: ListResponse = response.json().await.map_err(|e| {
            log::warn!("Design list from server is unreadable: {}", e);
            StorageError::Other(format!("Unreadable design list: {}", e))
        })?;
        Ok(body.names)
    }
}

impl Storage for RemoteStorage {
    fn save(
        &self,
        name: &str,
        document: &CanvasDocument,
    ) -> BoxFuture<'_, StorageResult<Option<String>>> {
        let prepared = validate_name(name).map(str::to_string).and_then(|name| {
            let data = document
                .to_serialized()
                .map_err(|e| StorageError::Other(e.to_string()))?;
            Ok((name, data))
        });
        Box::pin(async move {
            let (name, data) = prepared?;
            self.save_remote(name, data).await
        })
    }

    fn load(&self, name: &str) -> BoxFuture<'_, StorageResult<CanvasDocument>> {
        let name = validate_name(name).map(str::to_string);
        Box::pin(async move { self.load_remote(name?).await })
    }

    fn delete(&self, name: &str) -> BoxFuture<'_, StorageResult<()>> {
        let name = validate_name(name).map(str::to_string);
        Box::pin(async move { self.delete_remote(name?).await })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(self.list_remote())
    }

    fn exists(&self, name: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let name = validate_name(name).map(str::to_string);
        Box::pin(async move {
            match self.load_remote(name?).await {
                Ok(_) => Ok(true),
                Err(StorageError::NotFound(_)) => Ok(false),
                Err(e) => Err(e),
            }
        })
    }
}
