//! Translation of query state into PostgREST paths, query strings and headers.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use supabase_lite_core::{SupabaseError, SupabaseResult};

use crate::builder::QueryBuilder;
use crate::types::{CountOption, RowRange};

/// `Prefer` value for batch writes that do not need the rows echoed back.
pub const RETURN_MINIMAL: &str = "return=minimal";

/// `Prefer` value for upserts.
pub const MERGE_DUPLICATES: &str = "resolution=merge-duplicates";

/// Whether a request reads or writes; selects the schema profile header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// Percent-encode one rendered filter.
///
/// The column and the value on either side of the first `=` are encoded separately so the
/// separator survives. Everything outside `A-Z a-z 0-9 - . _ ~` is escaped.
pub fn encode_filter(filter: &str) -> String {
    match filter.split_once('=') {
        Some((key, value)) => format!(
            "{}={}",
            urlencoding::encode(key),
            urlencoding::encode(value)
        ),
        None => urlencoding::encode(filter).into_owned(),
    }
}

/// `?` + encoded filters joined with `&`. Empty input yields an empty string.
pub fn build_query_string(filters: &[String]) -> String {
    if filters.is_empty() {
        return String::new();
    }
    let encoded: Vec<String> = filters.iter().map(|f| encode_filter(f)).collect();
    format!("?{}", encoded.join("&"))
}

/// `rest/v1/<table><query string>`
pub fn table_path(table: &str, query_string: &str) -> String {
    format!("rest/v1/{}{}", urlencoding::encode(table), query_string)
}

/// `rest/v1/rpc/<function>`
pub fn rpc_path(function: &str) -> String {
    format!("rest/v1/rpc/{}", urlencoding::encode(function))
}

pub fn count_option_prefer(count: CountOption) -> String {
    format!("count={}", count.as_postgrest())
}

/// Headers carrying a query's range window and count request, plus any extra `Prefer`
/// directives (joined with `,`).
pub fn build_query_headers(query: &QueryBuilder, prefer: &[&str]) -> SupabaseResult<HeaderMap> {
    let mut headers = HeaderMap::new();

    if let Some(range) = query.range_window() {
        insert_range(&mut headers, range)?;
    }

    let mut prefer_parts: Vec<String> = prefer.iter().map(|p| p.to_string()).collect();
    if let Some(count) = query.count_option() {
        prefer_parts.push(count_option_prefer(count));
    }
    insert_prefer(&mut headers, &prefer_parts)?;

    Ok(headers)
}

pub fn insert_prefer(headers: &mut HeaderMap, parts: &[String]) -> SupabaseResult<()> {
    if !parts.is_empty() {
        insert(headers, "prefer", &parts.join(","))?;
    }
    Ok(())
}

fn insert_range(headers: &mut HeaderMap, range: RowRange) -> SupabaseResult<()> {
    insert(headers, "range", &format!("{}-{}", range.start, range.end))?;
    headers.insert("range-unit", HeaderValue::from_static("items"));
    Ok(())
}

/// `Accept-Profile` (reads) or `Content-Profile` (writes) for a non-public schema.
pub fn insert_schema_profile(
    headers: &mut HeaderMap,
    schema: &str,
    access: Access,
) -> SupabaseResult<()> {
    if schema == "public" {
        return Ok(());
    }
    let name = match access {
        Access::Read => "accept-profile",
        Access::Write => "content-profile",
    };
    insert(headers, name, schema)
}

// `name` must be lowercase.
fn insert(headers: &mut HeaderMap, name: &'static str, value: &str) -> SupabaseResult<()> {
    let value = HeaderValue::from_str(value)
        .map_err(|e| SupabaseError::config(format!("Invalid {} header: {}", name, e)))?;
    headers.insert(HeaderName::from_static(name), value);
    Ok(())
}
