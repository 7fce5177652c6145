use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;

use super::{ApiClient, ClientError};

/// Snapshot of a [`Resource`]
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T> {
    pub data: T,
    pub loading: bool,
    pub error: Option<String>,
}

/// A remotely loaded value kept in sync with one collection path.
///
/// Reloads are not de-duplicated: when two overlap, whichever finishes last
/// overwrites `data`. Mutations go straight to the server and then reload
/// the whole collection; nothing is applied optimistically.
#[derive(Clone)]
pub struct Resource<T> {
    client: ApiClient,
    path: String,
    state: Arc<RwLock<ResourceState<T>>>,
}

impl<T> Resource<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(client: ApiClient, path: impl Into<String>, default: T) -> Self {
        Self {
            client,
            path: path.into(),
            state: Arc::new(RwLock::new(ResourceState {
                data: default,
                loading: false,
                error: None,
            })),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub async fn data(&self) -> T {
        self.state.read().await.data.clone()
    }

    pub async fn loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn snapshot(&self) -> ResourceState<T> {
        self.state.read().await.clone()
    }

    /// Fetch the path and replace `data`; failures land in `error` and keep the old data
    pub async fn reload(&self) {
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
        }

        let result = self.client.get::<T>(&self.path).await;

        let mut state = self.state.write().await;
        match result {
            Ok(data) => state.data = data,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", self.path, e);
                state.error = Some(e.to_string());
            }
        }
        state.loading = false;
    }

    /// Initial load
    pub async fn mount(&self) {
        self.reload().await;
    }

    /// Screen regained focus
    pub async fn focus(&self) {
        self.reload().await;
    }

    pub async fn create<R, B>(&self, body: &B) -> Result<R, ClientError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let created = self.client.post(&self.path, body).await?;
        self.reload().await;
        Ok(created)
    }

    /// PATCH `{path}/{id}`
    pub async fn update<R, B>(&self, id: &str, body: &B) -> Result<R, ClientError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let updated = self.client.patch(&self.item_path(id), body).await?;
        self.reload().await;
        Ok(updated)
    }

    /// PATCH the path itself, for per-user singletons
    pub async fn update_own<R, B>(&self, body: &B) -> Result<R, ClientError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let updated = self.client.patch(&self.path, body).await?;
        self.reload().await;
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.client.delete(&self.item_path(id)).await?;
        self.reload().await;
        Ok(())
    }

    /// DELETE the path itself, for per-user singletons
    pub async fn delete_own(&self) -> Result<(), ClientError> {
        self.client.delete(&self.path).await?;
        self.reload().await;
        Ok(())
    }

    fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.path, id)
    }
}
