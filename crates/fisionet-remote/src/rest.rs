//! Data API client (PostgREST dialect).

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde_json::Value;

use crate::backend::TableBackend;
use crate::build_client;
use crate::error::{ensure_success, RemoteError, RemoteResult};
use crate::query::{filter_params, validate_column, Filter, Query};

/// HTTP client for `{base_url}/rest/v1/{table}`.
pub struct RestClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestClient {
    /// Create a client with its own connection pool.
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> RemoteResult<Self> {
        Ok(Self::with_client(build_client(timeout_secs)?, base_url, api_key))
    }

    /// Reuse an existing [`Client`] (shared with the auth client).
    pub fn with_client(client: Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn table_url(&self, table: &str) -> RemoteResult<String> {
        validate_column(table)?;
        Ok(format!("{}/rest/v1/{}", self.base_url, table))
    }

    /// Attach the key headers. Signed-out requests use the anon key as bearer.
    fn authorize(&self, request: RequestBuilder, access_token: Option<&str>) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(access_token.unwrap_or(&self.api_key))
    }

    fn require_filters(filters: &[Filter], verb: &str) -> RemoteResult<()> {
        // The data API refuses unfiltered writes; fail before the round-trip.
        if filters.is_empty() {
            return Err(RemoteError::InvalidRequest(format!(
                "{} without a filter",
                verb
            )));
        }
        for filter in filters {
            validate_column(&filter.column)?;
        }
        Ok(())
    }
}

/// Decode a JSON array body. An empty body counts as no rows.
fn decode_rows(response: Response) -> RemoteResult<Vec<Value>> {
    let text = response.text()?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str::<Value>(&text)? {
        Value::Array(rows) => Ok(rows),
        Value::Object(row) => Ok(vec![Value::Object(row)]),
        other => Err(RemoteError::Decode(format!(
            "expected JSON array of rows, got {}",
            other
        ))),
    }
}

impl TableBackend for RestClient {
    fn select(
        &self,
        table: &str,
        query: &Query,
        access_token: Option<&str>,
    ) -> RemoteResult<Vec<Value>> {
        query.validate()?;
        let url = self.table_url(table)?;
        let request = self.client.get(url).query(&query.to_params());
        let response = self.authorize(request, access_token).send()?;
        decode_rows(ensure_success(response)?)
    }

    fn insert(
        &self,
        table: &str,
        row: &Value,
        access_token: Option<&str>,
    ) -> RemoteResult<Vec<Value>> {
        let url = self.table_url(table)?;
        let request = self
            .client
            .post(url)
            .header("Prefer", "return=representation")
            .json(row);
        let response = self.authorize(request, access_token).send()?;
        decode_rows(ensure_success(response)?)
    }

    fn update(
        &self,
        table: &str,
        patch: &Value,
        filters: &[Filter],
        access_token: Option<&str>,
    ) -> RemoteResult<()> {
        Self::require_filters(filters, "update")?;
        let url = self.table_url(table)?;
        let request = self
            .client
            .patch(url)
            .query(&filter_params(filters))
            .header("Prefer", "return=minimal")
            .json(patch);
        let response = self.authorize(request, access_token).send()?;
        ensure_success(response)?;
        Ok(())
    }

    fn delete(
        &self,
        table: &str,
        filters: &[Filter],
        access_token: Option<&str>,
    ) -> RemoteResult<()> {
        Self::require_filters(filters, "delete")?;
        let url = self.table_url(table)?;
        let request = self.client.delete(url).query(&filter_params(filters));
        let response = self.authorize(request, access_token).send()?;
        ensure_success(response)?;
        Ok(())
    }
}
