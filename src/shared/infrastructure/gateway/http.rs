// RemoteGateway over the hosted backend's REST and edge-function endpoints.
//
// Purpose
// - Talk to a PostgREST-style table API (`/rest/v1/{table}`) and serverless functions
//   (`/functions/v1/{name}`) with the project API key.
//
// Responsibilities
// - Map HTTP failures onto the RemoteError taxonomy.
// - Publish change events for mutations made through this gateway. The backend's realtime
//   socket is not spoken here; views reload after writes made by this process and are
//   otherwise refreshed manually.

use crate::shared::core::predicate::{Predicate, QuerySpec};
use crate::shared::core::row::{RecordId, Row};
use crate::shared::core::table::Table;
use crate::shared::infrastructure::gateway::change_feed::ChangeFeed;
use crate::shared::infrastructure::gateway::{
    ChangeKind, RemoteError, RemoteGateway, Subscription,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub struct HttpGateway {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
    feed: ChangeFeed,
}

impl HttpGateway {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| RemoteError::Network(error.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout,
            feed: ChangeFeed::new(),
        })
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.as_str())
    }

    fn function_url(&self, procedure: &str) -> String {
        format!("{}/functions/v1/{procedure}", self.base_url)
    }

    /// PATCH only returns the after-row, which a filtered subscriber may no longer match,
    /// so updates go to every subscriber of the table.
    fn echo(&self, table: Table, kind: ChangeKind, rows: &[&Row]) {
        match kind {
            ChangeKind::Update => self.feed.publish_to_all(table, kind),
            ChangeKind::Insert | ChangeKind::Delete => self.feed.publish(table, kind, rows),
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RemoteError> {
        self.authorize(request)
            .send()
            .await
            .map_err(|error| self.transport_error(error))
    }

    fn transport_error(&self, error: reqwest::Error) -> RemoteError {
        if error.is_timeout() {
            RemoteError::Timeout(self.timeout)
        } else {
            RemoteError::Network(error.to_string())
        }
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        response: Response,
        table: Table,
        id: Option<&RecordId>,
    ) -> Result<T, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|error| RemoteError::Backend(error.to_string()));
        }
        let body = response.text().await.unwrap_or_default();
        Err(map_status(status, error_message(&body), table, id))
    }
}

/// Pulls `message` out of a PostgREST error body, falling back to the raw text.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .or_else(|| value.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

pub(crate) fn map_status(
    status: StatusCode,
    message: String,
    table: Table,
    id: Option<&RecordId>,
) -> RemoteError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            RemoteError::Validation(message)
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Permission(message),
        StatusCode::CONFLICT => RemoteError::Conflict(message),
        StatusCode::NOT_FOUND => match id {
            Some(id) => RemoteError::NotFound {
                table,
                id: id.clone(),
            },
            None => RemoteError::Backend(message),
        },
        _ => RemoteError::Backend(format!("{status}: {message}")),
    }
}

pub(crate) fn query_params(spec: &QuerySpec) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    if let Some(predicate) = &spec.predicate {
        params.extend(predicate.to_query_pairs());
    }
    if let Some(order_by) = &spec.order_by {
        params.push(("order".to_string(), order_by.to_query_value()));
    }
    if let Some(limit) = spec.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

fn id_filter(id: &RecordId) -> [(&'static str, String); 1] {
    [("id", format!("eq.{id}"))]
}

#[async_trait::async_trait]
impl RemoteGateway for HttpGateway {
    async fn query(&self, table: Table, spec: &QuerySpec) -> Result<Vec<Row>, RemoteError> {
        if let Some(predicate) = &spec.predicate {
            predicate.validate().map_err(RemoteError::Validation)?;
        }
        debug!(%table, "GET rows");
        let request = self.client.get(self.table_url(table)).query(&query_params(spec));
        let response = self.send(request).await?;
        self.read_json(response, table, None).await
    }

    async fn insert(&self, table: Table, fields: Row) -> Result<Row, RemoteError> {
        debug!(%table, "POST row");
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&fields);
        let response = self.send(request).await?;
        let mut rows: Vec<Row> = self.read_json(response, table, None).await?;
        let row = rows
            .pop()
            .ok_or_else(|| RemoteError::Backend(format!("{table} insert returned no row")))?;
        self.echo(table, ChangeKind::Insert, &[&row]);
        Ok(row)
    }

    async fn update(&self, table: Table, id: &RecordId, patch: Row) -> Result<Row, RemoteError> {
        debug!(%table, %id, "PATCH row");
        let request = self
            .client
            .patch(self.table_url(table))
            .query(&id_filter(id))
            .header("Prefer", "return=representation")
            .json(&patch);
        let response = self.send(request).await?;
        let mut rows: Vec<Row> = self.read_json(response, table, Some(id)).await?;
        // PostgREST answers a zero-row update with an empty representation.
        let row = rows.pop().ok_or_else(|| RemoteError::NotFound {
            table,
            id: id.clone(),
        })?;
        self.echo(table, ChangeKind::Update, &[&row]);
        Ok(row)
    }

    async fn delete(&self, table: Table, id: &RecordId) -> Result<(), RemoteError> {
        debug!(%table, %id, "DELETE row");
        let request = self
            .client
            .delete(self.table_url(table))
            .query(&id_filter(id))
            .header("Prefer", "return=representation");
        let response = self.send(request).await?;
        let removed: Vec<Row> = self.read_json(response, table, Some(id)).await?;
        if let Some(row) = removed.first() {
            self.echo(table, ChangeKind::Delete, &[row]);
        }
        Ok(())
    }

    async fn invoke(&self, procedure: &str, payload: Value) -> Result<Value, RemoteError> {
        debug!(procedure, "POST function");
        let request = self.client.post(self.function_url(procedure)).json(&payload);
        let response = self.send(request).await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(RemoteError::Procedure {
                procedure: procedure.to_string(),
                message: Some(error_message(&body)),
            });
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).or(Ok(Value::String(body)))
    }

    fn subscribe(
        &self,
        table: Table,
        predicate: Option<Predicate>,
    ) -> Result<Subscription, RemoteError> {
        Ok(self.feed.subscribe(table, predicate))
    }
}
