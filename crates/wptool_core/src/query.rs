use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::QueryError;

pub const DEFAULT_LANG: &str = "en";
pub const DEFAULT_USER_AGENT: &str = concat!(
    "wptool/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/siznax/wptools/)"
);
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

const LOOKUP_PROPS: &str = "extracts|info|links|pageimages|pageprops|pageterms";
const PAGE_PROPS: &str = "disambiguation|wikibase_item|wikibase-shortdesc";

/// Anything that can answer the two lookups the dispatcher needs.
///
/// Both return the raw decoded API payload; turning it into page data is the
/// caller's job (see [`crate::page::PageData::from_query`]).
pub trait WikiSource {
    /// Host name of the wiki, e.g. `en.wikipedia.org`.
    fn site(&self) -> &str;
    fn lookup(&self, title: &str) -> Result<Value, QueryError>;
    fn random(&self) -> Result<Value, QueryError>;
}

#[derive(Debug, Clone)]
pub struct QueryOptions {
    pub lang: String,
    pub wiki: Option<String>,
    pub user_agent: String,
    pub timeout: Duration,
    pub silent: bool,
    pub verbose: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            lang: DEFAULT_LANG.to_string(),
            wiki: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            silent: false,
            verbose: false,
        }
    }
}

impl QueryOptions {
    /// Alternate wiki site when given, otherwise the Wikipedia for `lang`.
    pub fn site(&self) -> String {
        if let Some(wiki) = self.wiki.as_deref() {
            let host = wiki
                .trim()
                .trim_start_matches("https://")
                .trim_start_matches("http://")
                .trim_end_matches('/');
            if !host.is_empty() {
                return host.to_string();
            }
        }
        let lang = self.lang.trim();
        let lang = if lang.is_empty() { DEFAULT_LANG } else { lang };
        format!("{lang}.wikipedia.org")
    }
}

/// Blocking MediaWiki Action API client for a single site.
pub struct WikiQuery {
    client: Client,
    options: QueryOptions,
    site: String,
    endpoint: String,
}

impl WikiQuery {
    pub fn new(options: QueryOptions) -> Result<Self, QueryError> {
        let client = Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent.clone())
            .build()
            .map_err(QueryError::Client)?;
        let site = options.site();
        let endpoint = format!("https://{site}/w/api.php");
        Ok(Self {
            client,
            options,
            site,
            endpoint,
        })
    }

    fn request_json(&self, params: &[(&str, String)]) -> Result<Value, QueryError> {
        let mut pairs = Vec::with_capacity(params.len() + 2);
        pairs.push(("format", "json".to_string()));
        pairs.push(("formatversion", "2".to_string()));
        for (key, value) in params {
            pairs.push((*key, value.clone()));
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&pairs)
            .send()
            .map_err(|source| QueryError::Request {
                url: self.endpoint.clone(),
                source,
            })?;

        let status = response.status();
        let url = response.url().to_string();
        if self.options.verbose {
            info!("User-Agent: {}", self.options.user_agent);
            info!("Request: {url}");
            info!("Status: {}", status.as_u16());
        }
        if !status.is_success() {
            return Err(QueryError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let payload: Value = response.json().map_err(QueryError::Decode)?;
        if let Some(error) = payload.get("error") {
            let code = error
                .get("code")
                .and_then(Value::as_str)
                .unwrap_or("unknown_error");
            let info = error
                .get("info")
                .and_then(Value::as_str)
                .unwrap_or("unknown info");
            return Err(QueryError::Api {
                code: code.to_string(),
                info: info.to_string(),
            });
        }
        debug!(url = %url, "query complete");
        Ok(payload)
    }
}

impl WikiSource for WikiQuery {
    fn site(&self) -> &str {
        &self.site
    }

    fn lookup(&self, title: &str) -> Result<Value, QueryError> {
        if !self.options.silent {
            info!("{} (query) {}", self.site, title);
        }
        self.request_json(&lookup_params(title))
    }

    fn random(&self) -> Result<Value, QueryError> {
        if !self.options.silent {
            info!("{} (random)", self.site);
        }
        self.request_json(&random_params())
    }
}

/// Parameters for the single page query that feeds both renderers.
pub fn lookup_params(title: &str) -> Vec<(&'static str, String)> {
    vec![
        ("action", "query".to_string()),
        ("prop", LOOKUP_PROPS.to_string()),
        ("exintro", "1".to_string()),
        ("inprop", "url".to_string()),
        ("pllimit", "500".to_string()),
        ("plnamespace", "0".to_string()),
        ("piprop", "original|thumbnail|name".to_string()),
        ("pithumbsize", "240".to_string()),
        ("ppprop", PAGE_PROPS.to_string()),
        ("wbptterms", "description|label".to_string()),
        ("redirects", "1".to_string()),
        ("titles", title.trim().to_string()),
    ]
}

pub fn random_params() -> Vec<(&'static str, String)> {
    vec![
        ("action", "query".to_string()),
        ("list", "random".to_string()),
        ("rnnamespace", "0".to_string()),
        ("rnlimit", "1".to_string()),
    ]
}

/// Title of the first entry in a `list=random` payload.
pub fn random_title(payload: &Value) -> Result<String, QueryError> {
    payload
        .get("query")
        .and_then(|value| value.get("random"))
        .and_then(Value::as_array)
        .and_then(|entries| entries.first())
        .and_then(|entry| entry.get("title"))
        .and_then(Value::as_str)
        .filter(|title| !title.trim().is_empty())
        .map(ToString::to_string)
        .ok_or(QueryError::InvalidResponse("missing query.random[0].title"))
}
