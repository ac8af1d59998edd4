use reqwest::header::HeaderMap;
use reqwest::Method;
use tracing::debug;

use supabase_lite_core::{
    decode_response, JsonValue, RawResponse, SupabaseClient, SupabaseError, SupabaseResponse,
    SupabaseResult,
};

use crate::builder::QueryBuilder;
use crate::postgrest::{
    build_query_headers, build_query_string, insert_prefer, insert_schema_profile, rpc_path,
    table_path, Access, MERGE_DUPLICATES, RETURN_MINIMAL,
};

/// Which error variant a failed call maps to.
#[derive(Debug, Clone, Copy)]
enum Operation {
    Query,
    Rpc,
}

/// Executes table queries, batch writes and RPC calls against `/rest/v1`.
///
/// Every method is a single logical request run through the client's retry policy.
#[derive(Debug, Clone)]
pub struct PostgrestClient {
    client: SupabaseClient,
}

impl PostgrestClient {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// Run a query: `GET /rest/v1/<table>?<filters>`.
    pub async fn execute(&self, query: QueryBuilder) -> SupabaseResult<SupabaseResponse> {
        let mut headers = build_query_headers(&query, &[])?;
        insert_schema_profile(&mut headers, self.client.schema(), Access::Read)?;

        let path = table_path(query.table(), &query.to_query_string());
        debug!(table = query.table(), filters = query.filters().len(), "Executing select");
        self.send(Method::GET, &path, headers, None, Operation::Query)
            .await
    }

    /// Insert rows in one request. The rows are not echoed back.
    pub async fn insert_batch(
        &self,
        table: &str,
        rows: Vec<JsonValue>,
    ) -> SupabaseResult<SupabaseResponse> {
        let mut headers = HeaderMap::new();
        insert_prefer(&mut headers, &[RETURN_MINIMAL.to_string()])?;
        insert_schema_profile(&mut headers, self.client.schema(), Access::Write)?;

        debug!(table, rows = rows.len(), "Executing batch insert");
        let body = JsonValue::Array(rows);
        self.send(Method::POST, &table_path(table, ""), headers, Some(&body), Operation::Query)
            .await
    }

    /// Insert rows, merging into existing rows that collide on `on_conflict` columns
    /// (the primary key when `None`).
    pub async fn upsert_batch(
        &self,
        table: &str,
        rows: Vec<JsonValue>,
        on_conflict: Option<&str>,
    ) -> SupabaseResult<SupabaseResponse> {
        let mut headers = HeaderMap::new();
        insert_prefer(
            &mut headers,
            &[MERGE_DUPLICATES.to_string(), RETURN_MINIMAL.to_string()],
        )?;
        insert_schema_profile(&mut headers, self.client.schema(), Access::Write)?;

        let query_string = match on_conflict {
            Some(columns) => build_query_string(&[format!("on_conflict={}", columns)]),
            None => String::new(),
        };

        debug!(table, rows = rows.len(), ?on_conflict, "Executing batch upsert");
        let body = JsonValue::Array(rows);
        self.send(
            Method::POST,
            &table_path(table, &query_string),
            headers,
            Some(&body),
            Operation::Query,
        )
        .await
    }

    /// Apply `patch` to every row matched by `query`.
    pub async fn update_batch(
        &self,
        query: QueryBuilder,
        patch: JsonValue,
    ) -> SupabaseResult<SupabaseResponse> {
        let mut headers = build_query_headers(&query, &[RETURN_MINIMAL])?;
        insert_schema_profile(&mut headers, self.client.schema(), Access::Write)?;

        let path = table_path(query.table(), &query.to_query_string());
        debug!(table = query.table(), filters = query.filters().len(), "Executing batch update");
        self.send(Method::PATCH, &path, headers, Some(&patch), Operation::Query)
            .await
    }

    /// Delete every row matched by `query`.
    pub async fn delete_batch(&self, query: QueryBuilder) -> SupabaseResult<SupabaseResponse> {
        let mut headers = build_query_headers(&query, &[RETURN_MINIMAL])?;
        insert_schema_profile(&mut headers, self.client.schema(), Access::Write)?;

        let path = table_path(query.table(), &query.to_query_string());
        debug!(table = query.table(), filters = query.filters().len(), "Executing batch delete");
        self.send(Method::DELETE, &path, headers, None, Operation::Query)
            .await
    }

    /// Call a Postgres function: `POST /rest/v1/rpc/<function>` with `args` as the body.
    pub async fn rpc(&self, function: &str, args: JsonValue) -> SupabaseResult<SupabaseResponse> {
        let mut headers = HeaderMap::new();
        insert_schema_profile(&mut headers, self.client.schema(), Access::Write)?;

        debug!(function, "Executing RPC");
        self.send(Method::POST, &rpc_path(function), headers, Some(&args), Operation::Rpc)
            .await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        headers: HeaderMap,
        body: Option<&JsonValue>,
        operation: Operation,
    ) -> SupabaseResult<SupabaseResponse> {
        let mut request = self.client.request(method, path)?.headers(headers);
        if let Some(body) = body {
            request = request.json(body)?;
        }

        let raw = self.client.send(request).await?;
        if !raw.is_success() {
            return Err(error_from_response(&raw, operation));
        }
        decode_response(raw)
    }
}

/// Build a `Query`/`Rpc` error from a non-2xx response.
///
/// PostgREST error bodies look like
/// `{"message": "...", "code": "...", "details": ..., "hint": ...}`.
/// Any other body is used verbatim as the message.
fn error_from_response(raw: &RawResponse, operation: Operation) -> SupabaseError {
    let (message, code) = parse_error_body(raw);
    match operation {
        Operation::Query => SupabaseError::Query {
            status: raw.status,
            message,
            code,
        },
        Operation::Rpc => SupabaseError::Rpc {
            status: raw.status,
            message,
            code,
        },
    }
}

fn parse_error_body(raw: &RawResponse) -> (String, Option<String>) {
    if let Ok(body) = JsonValue::from_slice(&raw.body) {
        if let Some(message) = body.get("message").and_then(|m| m.as_str()) {
            let code = body
                .get("code")
                .and_then(|c| c.as_str())
                .map(|c| c.to_string());
            return (message.to_string(), code);
        }
    }

    let text = raw.text();
    if text.trim().is_empty() {
        (raw.status_text.clone(), None)
    } else {
        (text, None)
    }
}
