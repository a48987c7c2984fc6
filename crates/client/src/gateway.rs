//! Typed calls against the HTTP API.

use reqwest::{Method, RequestBuilder, Url};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;

use kidstock_core::{BoundedName, ChildId};
use kidstock_inventory::{
    Child, ClothingCategory, ClothingCategoryId, GroupWithChildren, StockAdjustment, StockEntry,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, FieldErrors};

/// The response envelope as seen by the client.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<FieldErrors>,
}

#[derive(Debug, Clone)]
pub struct ApiGateway {
    http: reqwest::Client,
    base: Url,
}

impl ApiGateway {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| ClientError::InvalidBaseUrl(format!("{}: {e}", config.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(config.base_url));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Check connectivity by hitting the health endpoint.
    pub async fn check_connectivity(&self) -> bool {
        match self.endpoint(&["health"]) {
            Ok(url) => self
                .http
                .get(url)
                .send()
                .await
                .is_ok_and(|res| res.status().is_success()),
            Err(_) => false,
        }
    }

    pub async fn create_group(&self, name: &str) -> Result<GroupWithChildren, ClientError> {
        let name = BoundedName::parse("name", name)?;
        let req = self.request(Method::POST, &["groups"])?;
        self.send_for_data(req.json(&json!({ "name": name }))).await
    }

    pub async fn group_by_token(&self, token: &str) -> Result<GroupWithChildren, ClientError> {
        let req = self.request(Method::GET, &["groups", token])?;
        self.send_for_data(req).await
    }

    pub async fn group_children(&self, token: &str) -> Result<Vec<Child>, ClientError> {
        let req = self.request(Method::GET, &["groups", token, "children"])?;
        self.send_for_data(req).await
    }

    pub async fn create_child(&self, token: &str, name: &str) -> Result<Child, ClientError> {
        let name = BoundedName::parse("name", name)?;
        let req = self.request(Method::POST, &["groups", token, "children"])?;
        self.send_for_data(req.json(&json!({ "name": name }))).await
    }

    pub async fn child(&self, child_id: ChildId) -> Result<Child, ClientError> {
        let id = child_id.to_string();
        let req = self.request(Method::GET, &["children", &id])?;
        self.send_for_data(req).await
    }

    pub async fn update_child(&self, child_id: ChildId, name: &str) -> Result<Child, ClientError> {
        let name = BoundedName::parse("name", name)?;
        let id = child_id.to_string();
        let req = self.request(Method::PUT, &["children", &id])?;
        self.send_for_data(req.json(&json!({ "name": name }))).await
    }

    pub async fn delete_child(&self, child_id: ChildId) -> Result<(), ClientError> {
        let id = child_id.to_string();
        let req = self.request(Method::DELETE, &["children", &id])?;
        self.send::<serde_json::Value>(req).await.map(|_| ())
    }

    pub async fn child_stock(&self, child_id: ChildId) -> Result<Vec<StockEntry>, ClientError> {
        let id = child_id.to_string();
        let req = self.request(Method::GET, &["children", &id, "stock"])?;
        self.send_for_data(req).await
    }

    pub async fn increment_stock(
        &self,
        child_id: ChildId,
        category_id: ClothingCategoryId,
        amount: i64,
    ) -> Result<StockEntry, ClientError> {
        let adjustment = StockAdjustment::increment(amount)?;
        let id = child_id.to_string();
        let req = self.request(Method::POST, &["children", &id, "stock-increment"])?;
        let body = json!({ "clothing_category_id": category_id, "increment": adjustment.amount() });
        self.send_for_data(req.json(&body)).await
    }

    pub async fn decrement_stock(
        &self,
        child_id: ChildId,
        category_id: ClothingCategoryId,
        amount: i64,
    ) -> Result<StockEntry, ClientError> {
        let adjustment = StockAdjustment::decrement(amount)?;
        let id = child_id.to_string();
        let req = self.request(Method::POST, &["children", &id, "stock-decrement"])?;
        let body = json!({ "clothing_category_id": category_id, "decrement": adjustment.amount() });
        self.send_for_data(req.json(&body)).await
    }

    pub async fn clothing_categories(&self) -> Result<Vec<ClothingCategory>, ClientError> {
        let req = self.request(Method::GET, &["clothing-categories"])?;
        self.send_for_data(req).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ClientError> {
        Ok(self.http.request(method, self.endpoint(segments)?))
    }

    async fn send_for_data<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        self.send(req)
            .await?
            .ok_or_else(|| ClientError::Parse("response envelope carried no data".to_string()))
    }

    /// Send and normalize the envelope: any failure becomes `ClientError::Api`.
    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<Option<T>, ClientError> {
        let res = req.send().await?;
        let status = res.status();
        let body = res.bytes().await?;

        if !status.is_success() {
            // Failure bodies are decoded loosely so a proxy's HTML page still yields an error.
            let envelope = serde_json::from_slice::<ApiEnvelope<serde_json::Value>>(&body).ok();
            let (message, errors) = match envelope {
                Some(env) => (env.message, env.errors.unwrap_or_default()),
                None => (String::from_utf8_lossy(&body).into_owned(), FieldErrors::new()),
            };
            tracing::debug!(status = status.as_u16(), %message, "api request failed");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
                errors,
            });
        }

        let envelope: ApiEnvelope<T> =
            serde_json::from_slice(&body).map_err(|e| ClientError::Parse(e.to_string()))?;
        if !envelope.success {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: envelope.message,
                errors: envelope.errors.unwrap_or_default(),
            });
        }
        Ok(envelope.data)
    }
}
