//! Airtable client, the single point of entry for all Airtable REST calls.
//!
//! Airtable is the secondary datastore for candidate applications, contact
//! requests, recruiter payroll and client follow-ups.
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

pub mod schema;

pub use schema::{FieldSchema, TableSchema, ViewMetadata, ViewSchema};

/// Airtable caps list pages at 100 records.
const PAGE_SIZE: u32 = 100;

/// Airtable accepts at most 10 records per create call.
const CREATE_BATCH: usize = 10;

pub type Fields = Map<String, Value>;

#[derive(Debug, Error)]
pub enum AirtableError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid Airtable URL: {0}")]
    Url(String),
}

impl AirtableError {
    pub fn status(&self) -> Option<u16> {
        match self {
            AirtableError::Api { status, .. } => Some(*status),
            AirtableError::Http(e) => e.status().map(|s| s.as_u16()),
            AirtableError::Url(_) => None,
        }
    }
}

/// A single Airtable row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub fields: Fields,
}

#[derive(Debug, Default, Clone)]
pub struct ListParams<'a> {
    pub view: Option<&'a str>,
    pub filter_by_formula: Option<&'a str>,
    pub max_records: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    records: Vec<Record>,
    offset: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateRequest<'a> {
    records: Vec<NewRecord<'a>>,
}

#[derive(Debug, Serialize)]
struct NewRecord<'a> {
    fields: &'a Fields,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    records: Vec<Record>,
}

#[derive(Debug, Deserialize)]
struct TablesResponse {
    tables: Vec<TableSchema>,
}

#[derive(Debug, Deserialize)]
struct AirtableErrorBody {
    error: AirtableErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AirtableErrorDetail {
    Structured { message: String },
    Plain(String),
}

#[derive(Clone)]
pub struct AirtableClient {
    client: Client,
    api_url: String,
    api_key: String,
    base_id: String,
}

impl AirtableClient {
    pub fn new(api_url: &str, api_key: String, base_id: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            base_id,
        }
    }

    fn url(&self, segments: &[&str]) -> Result<Url, AirtableError> {
        let mut url =
            Url::parse(&self.api_url).map_err(|e| AirtableError::Url(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| AirtableError::Url(self.api_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Lists records of a table, following pagination.
    pub async fn list_records(
        &self,
        table: &str,
        params: &ListParams<'_>,
    ) -> Result<Vec<Record>, AirtableError> {
        let url = self.url(&["v0", &self.base_id, table])?;
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut query: Vec<(&str, String)> = vec![("pageSize", PAGE_SIZE.to_string())];
            if let Some(view) = params.view {
                query.push(("view", view.to_string()));
            }
            if let Some(formula) = params.filter_by_formula {
                query.push(("filterByFormula", formula.to_string()));
            }
            if let Some(max) = params.max_records {
                query.push(("maxRecords", max.to_string()));
            }
            if let Some(ref token) = offset {
                query.push(("offset", token.clone()));
            }

            let response = self
                .client
                .get(url.clone())
                .bearer_auth(&self.api_key)
                .query(&query)
                .send()
                .await?;
            let page: ListResponse = parse_response(response).await?;

            records.extend(page.records);

            if let Some(max) = params.max_records {
                if records.len() >= max as usize {
                    records.truncate(max as usize);
                    break;
                }
            }
            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        debug!("Airtable list '{table}' returned {} records", records.len());
        Ok(records)
    }

    /// Returns the first record matching `formula`, if any.
    pub async fn first_record(
        &self,
        table: &str,
        formula: &str,
    ) -> Result<Option<Record>, AirtableError> {
        let params = ListParams {
            filter_by_formula: Some(formula),
            max_records: Some(1),
            ..Default::default()
        };
        Ok(self.list_records(table, &params).await?.into_iter().next())
    }

    /// Creates records in batches of ten.
    pub async fn create_records(
        &self,
        table: &str,
        rows: &[Fields],
    ) -> Result<Vec<Record>, AirtableError> {
        let url = self.url(&["v0", &self.base_id, table])?;
        let mut created = Vec::with_capacity(rows.len());

        for chunk in rows.chunks(CREATE_BATCH) {
            let body = CreateRequest {
                records: chunk.iter().map(|fields| NewRecord { fields }).collect(),
            };
            let response = self
                .client
                .post(url.clone())
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await?;
            let page: CreateResponse = parse_response(response).await?;
            created.extend(page.records);
        }

        debug!("Airtable create '{table}' stored {} records", created.len());
        Ok(created)
    }

    /// Fetches the schema of every table in the base (metadata API).
    pub async fn table_schemas(&self) -> Result<Vec<TableSchema>, AirtableError> {
        let url = self.url(&["v0", "meta", "bases", &self.base_id, "tables"])?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let tables: TablesResponse = parse_response(response).await?;
        Ok(tables.tables)
    }

    /// Fetches a view's metadata, including its visible field ids.
    pub async fn view_metadata(
        &self,
        table_id: &str,
        view_id: &str,
    ) -> Result<ViewMetadata, AirtableError> {
        let url = self.url(&[
            "v0", "meta", "bases", &self.base_id, "tables", table_id, "views", view_id,
        ])?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        parse_response(response).await
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, AirtableError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<AirtableErrorBody>(&body)
            .map(|e| match e.error {
                AirtableErrorDetail::Structured { message } => message,
                AirtableErrorDetail::Plain(kind) => kind,
            })
            .unwrap_or(body);
        return Err(AirtableError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response.json().await?)
}

/// Quotes a value as an Airtable formula string literal.
pub fn formula_string(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// `{Field} = "value"` with the value safely quoted.
pub fn field_equals(field: &str, value: &str) -> String {
    format!("{{{field}}} = {}", formula_string(value))
}

/// Reads a field as text: strings as-is, numbers rendered, anything else `None`.
pub fn field_text<'a>(fields: &'a Fields, key: &str) -> Option<std::borrow::Cow<'a, str>> {
    match fields.get(key)? {
        Value::String(s) => Some(std::borrow::Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(std::borrow::Cow::Owned(n.to_string())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> AirtableClient {
        AirtableClient::new(&server.base_url(), "key".into(), "appBase".into())
    }

    #[test]
    fn test_formula_escapes_quotes_and_backslashes() {
        assert_eq!(
            field_equals("URL Slug", r#"ana" & TRUE() & ""#),
            r#"{URL Slug} = "ana\" & TRUE() & \"""#
        );
        assert_eq!(formula_string(r"a\b"), r#""a\\b""#);
    }

    #[test]
    fn test_field_text_handles_numbers() {
        let fields: Fields = serde_json::from_value(json!({"code": 1042, "name": "Ana", "x": true})).unwrap();
        assert_eq!(field_text(&fields, "code").unwrap(), "1042");
        assert_eq!(field_text(&fields, "name").unwrap(), "Ana");
        assert!(field_text(&fields, "x").is_none());
        assert!(field_text(&fields, "missing").is_none());
    }

    #[tokio::test]
    async fn test_list_records_follows_offset() {
        let server = MockServer::start_async().await;
        let second = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v0/appBase/Contactos")
                    .query_param("offset", "page2");
                then.status(200)
                    .json_body(json!({"records": [{"id": "rec2", "fields": {"Nombre": "Luis"}}]}));
            })
            .await;
        let first = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v0/appBase/Contactos")
                    .query_param("view", "Grid")
                    .header("authorization", "Bearer key");
                then.status(200).json_body(json!({
                    "records": [{"id": "rec1", "fields": {"Nombre": "Ana"}}],
                    "offset": "page2"
                }));
            })
            .await;

        let params = ListParams {
            view: Some("Grid"),
            ..Default::default()
        };
        let records = client(&server).list_records("Contactos", &params).await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id, "rec2");
    }

    #[tokio::test]
    async fn test_first_record_limits_to_one() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path_contains("Recruiters")
                    .query_param("maxRecords", "1")
                    .query_param("filterByFormula", "{URL Slug} = \"ana\"");
                then.status(200).json_body(json!({"records": []}));
            })
            .await;

        let found = client(&server)
            .first_record("LinkIT - Recruiters", &field_equals("URL Slug", "ana"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_api_error_message_extracted() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v0/appBase/Missing");
                then.status(404)
                    .json_body(json!({"error": {"type": "TABLE_NOT_FOUND", "message": "Could not find table Missing"}}));
            })
            .await;

        let err = client(&server)
            .list_records("Missing", &ListParams::default())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("Could not find table"));
    }

    #[tokio::test]
    async fn test_create_records_posts_fields() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v0/appBase/Contactos")
                    .body_contains("\"Nombre\":\"Ana\"");
                then.status(200)
                    .json_body(json!({"records": [{"id": "recNew", "fields": {"Nombre": "Ana"}}]}));
            })
            .await;

        let mut fields = Fields::new();
        fields.insert("Nombre".into(), json!("Ana"));
        let created = client(&server)
            .create_records("Contactos", &[fields])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(created[0].id, "recNew");
    }
}
