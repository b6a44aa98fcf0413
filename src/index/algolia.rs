//! Hosted search index over the Algolia REST API.
//!
//! Reads go to the `-dsn` host, writes to the primary application host.
//! Both carry the application id and API key as headers.

use crate::domain::error::{AdminError, Result};
use crate::domain::{RecordId, RestaurantRecord, SearchHits, SearchParams};
use crate::index::backend::{SaveObject, SaveOptions, SaveReceipt, SearchIndex};
use futures_util::future::BoxFuture;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;

const APPLICATION_ID_HEADER: &str = "X-Algolia-Application-Id";
const API_KEY_HEADER: &str = "X-Algolia-API-Key";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest response body quoted in an error message.
const MAX_ERROR_BODY: usize = 500;

/// Client for one index of a hosted Algolia application.
#[derive(Clone)]
pub struct AlgoliaIndex {
    client: reqwest::Client,
    index_name: String,
    read_host: Url,
    write_host: Url,
}

impl AlgoliaIndex {
    /// Creates a client for `index_name` in application `app_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Config`] if the credentials are not valid header
    /// values or the application id does not form a valid host, and
    /// [`AdminError::Http`] if the HTTP client cannot be built.
    ///
    /// # Examples
    ///
    /// ```
    /// use restaurant_admin::index::AlgoliaIndex;
    ///
    /// let index = AlgoliaIndex::new("LATENCY", "search-only-key", "restaurants")?;
    /// # Ok::<(), restaurant_admin::AdminError>(())
    /// ```
    pub fn new(app_id: &str, api_key: &str, index_name: &str) -> Result<Self> {
        if app_id.trim().is_empty() {
            return Err(AdminError::Config("app_id must not be empty".to_string()));
        }
        if index_name.trim().is_empty() {
            return Err(AdminError::Config("index_name must not be empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(APPLICATION_ID_HEADER, header_value(app_id, "app_id")?);
        let mut key = header_value(api_key, "api_key")?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let app = app_id.to_ascii_lowercase();
        Ok(Self {
            client,
            index_name: index_name.to_string(),
            read_host: parse_host(&format!("https://{app}-dsn.algolia.net"))?,
            write_host: parse_host(&format!("https://{app}.algolia.net"))?,
        })
    }

    /// Points reads and writes at other hosts, such as a proxy.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Config`] if either host is not a valid URL.
    pub fn with_hosts(mut self, read_host: &str, write_host: &str) -> Result<Self> {
        self.read_host = parse_host(read_host)?;
        self.write_host = parse_host(write_host)?;
        Ok(self)
    }

    #[must_use]
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    fn index_url(&self, host: &Url, tail: &[&str]) -> Result<Url> {
        let mut url = host.clone();
        url.path_segments_mut()
            .map_err(|()| AdminError::Config(format!("{host} cannot be a base URL")))?
            .pop_if_empty()
            .extend(["1", "indexes", self.index_name.as_str()])
            .extend(tail);
        Ok(url)
    }

    fn search_url(&self) -> Result<Url> {
        self.index_url(&self.read_host, &["query"])
    }

    fn batch_url(&self) -> Result<Url> {
        self.index_url(&self.write_host, &["batch"])
    }

    fn object_url(&self, id: &RecordId) -> Result<Url> {
        self.index_url(&self.write_host, &[id.as_str()])
    }
}

fn header_value(value: &str, name: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| AdminError::Config(format!("{name} contains characters not allowed in a header")))
}

fn parse_host(host: &str) -> Result<Url> {
    Url::parse(host).map_err(|e| AdminError::Config(format!("invalid host {host}: {e}")))
}

/// Builds the body of a batch write.
///
/// Objects with an id become `updateObject` requests, the rest
/// `addObject`, which makes the index assign an id.
fn batch_body(objects: Vec<SaveObject>, options: SaveOptions) -> Result<Value> {
    let mut requests = Vec::with_capacity(objects.len());
    for object in objects {
        let action = match (&object.id, options.auto_generate_object_id_if_not_exist) {
            (Some(_), _) => "updateObject",
            (None, true) => "addObject",
            (None, false) => {
                return Err(AdminError::Index(
                    "objectID is required when auto-generation is disabled".to_string(),
                ))
            }
        };
        requests.push(json!({ "action": action, "body": serde_json::to_value(object)? }));
    }
    Ok(json!({ "requests": requests }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHits {
    #[serde(default)]
    hits: Vec<Map<String, Value>>,
    #[serde(default)]
    nb_hits: usize,
}

/// Converts a raw search answer, dropping per-hit metadata such as
/// `_highlightResult` and `_rankingInfo`.
///
/// Hits that do not decode as records are skipped and logged.
fn into_search_hits(raw: RawHits) -> SearchHits {
    let hits = raw
        .hits
        .into_iter()
        .filter_map(|mut hit| {
            hit.retain(|key, _| !key.starts_with('_'));
            match serde_json::from_value::<RestaurantRecord>(Value::Object(hit)) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed hit");
                    None
                }
            }
        })
        .collect();

    SearchHits {
        hits,
        nb_hits: raw.nb_hits,
    }
}

/// Reads a response body, turning non-success statuses into errors.
async fn read_body(response: reqwest::Response, url: &Url) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return Ok(body);
    }

    let quoted = if body.len() > MAX_ERROR_BODY {
        let cut = (0..=MAX_ERROR_BODY)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}... (truncated)", &body[..cut])
    } else {
        body
    };
    Err(AdminError::Index(format!(
        "HTTP {} from {url}: {quoted}",
        status.as_u16()
    )))
}

impl SearchIndex for AlgoliaIndex {
    fn search(&self, params: SearchParams) -> BoxFuture<'static, Result<SearchHits>> {
        let client = self.client.clone();
        let url = self.search_url();

        Box::pin(async move {
            let url = url?;
            tracing::debug!(%url, term = %params.term, page = params.page, "searching index");

            let response = client.post(url.clone()).json(&params).send().await?;
            let body = read_body(response, &url).await?;
            let raw: RawHits = serde_json::from_str(&body)?;
            Ok(into_search_hits(raw))
        })
    }

    fn save_objects(
        &self,
        objects: Vec<SaveObject>,
        options: SaveOptions,
    ) -> BoxFuture<'static, Result<SaveReceipt>> {
        let client = self.client.clone();
        let url = self.batch_url();
        let body = batch_body(objects, options);

        Box::pin(async move {
            let url = url?;
            let body = body?;
            tracing::debug!(%url, "saving objects");

            let response = client.post(url.clone()).json(&body).send().await?;
            let text = read_body(response, &url).await?;
            let receipt: SaveReceipt = serde_json::from_str(&text)?;

            tracing::debug!(task_id = ?receipt.task_id, saved = receipt.object_ids.len(), "batch accepted");
            Ok(receipt)
        })
    }

    fn delete_object(&self, id: RecordId) -> BoxFuture<'static, Result<()>> {
        let client = self.client.clone();
        let url = self.object_url(&id);

        Box::pin(async move {
            let url = url?;
            tracing::debug!(%url, %id, "deleting object");

            let response = client.delete(url.clone()).send().await?;
            read_body(response, &url).await?;
            Ok(())
        })
    }
}
