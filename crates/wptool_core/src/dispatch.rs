use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::page::Page;
use crate::query::{QueryOptions, WikiQuery, WikiSource};
use crate::render::{TextOptions, render_html, render_text_with};

pub const NOT_FOUND: &str = "NOT_FOUND";

/// Everything one invocation asks for.
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    pub html: bool,
    pub no_wrap: bool,
    pub query: bool,
    pub title: Option<String>,
    pub wrap_width: Option<usize>,
}

impl GetOptions {
    fn title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
    }

    fn text_options(&self) -> TextOptions {
        let defaults = TextOptions::default();
        TextOptions {
            no_wrap: self.no_wrap,
            width: self.wrap_width.unwrap_or(defaults.width),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Rendered(String),
    /// Query mode: the API payload, untouched.
    Raw(Value),
    NotFound,
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rendered(text) => f.write_str(text),
            Self::Raw(payload) => match serde_json::to_string_pretty(payload) {
                Ok(text) => f.write_str(&text),
                Err(_) => write!(f, "{payload}"),
            },
            Self::NotFound => f.write_str(NOT_FOUND),
        }
    }
}

/// Build the HTTP client for the requested site and run [`get`] against it.
pub fn dispatch(options: &GetOptions, query: QueryOptions) -> Output {
    match WikiQuery::new(query) {
        Ok(source) => get(options, &source),
        Err(error) => {
            debug!(%error, "query client unavailable");
            Output::NotFound
        }
    }
}

pub fn get<S>(options: &GetOptions, source: &S) -> Output
where
    S: WikiSource + ?Sized,
{
    if options.query {
        let payload = match options.title() {
            Some(title) => source.lookup(title),
            None => source.random(),
        };
        return match payload {
            Ok(payload) => Output::Raw(payload),
            Err(error) => {
                debug!(%error, site = source.site(), "raw query failed");
                Output::NotFound
            }
        };
    }

    let page = match Page::get_query(source, options.title()) {
        Ok(page) => page,
        Err(error) => {
            debug!(%error, site = source.site(), "page lookup failed");
            return Output::NotFound;
        }
    };

    debug!(
        title = %page.data.title,
        pageid = ?page.data.pageid,
        wikibase = ?page.data.wikibase,
        "page fetched"
    );
    if page.data.extext.is_none() {
        debug!(title = %page.data.title, "page has no plain-text extract");
    }

    let rendered = if options.html {
        render_html(&page)
    } else {
        render_text_with(&page, &options.text_options())
    };
    Output::Rendered(rendered)
}
