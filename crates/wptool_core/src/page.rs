use serde_json::Value;

use crate::error::QueryError;
use crate::extract::html_to_text;
use crate::query::{WikiSource, random_title};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageRecord {
    pub kind: String,
    pub url: String,
    pub file: Option<String>,
}

/// Article data for one fetched page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageData {
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub label: Option<String>,
    /// HTML lead section.
    pub extract: Option<String>,
    /// Plain-text rendition of `extract`.
    pub extext: Option<String>,
    pub disambiguation: bool,
    pub links: Vec<String>,
    pub images: Vec<ImageRecord>,
    pub pageid: Option<u64>,
    pub wikibase: Option<String>,
}

impl PageData {
    /// Build page data from a `formatversion=2` title lookup payload.
    pub fn from_query(payload: &Value) -> Result<Self, QueryError> {
        let page = payload
            .get("query")
            .and_then(|value| value.get("pages"))
            .and_then(Value::as_array)
            .and_then(|pages| pages.first())
            .ok_or(QueryError::InvalidResponse("missing query.pages"))?;

        let title = string_field(page, "title")
            .ok_or(QueryError::InvalidResponse("page has no title"))?;
        if page.get("missing").is_some() || page.get("invalid").is_some() {
            return Err(QueryError::NotFound(title));
        }

        let extract = string_field(page, "extract").filter(|value| !value.trim().is_empty());
        let extext = extract
            .as_deref()
            .map(html_to_text)
            .filter(|text| !text.is_empty());

        let pageprops = page.get("pageprops");
        let description = first_term(page, "description").or_else(|| {
            pageprops
                .and_then(|props| props.get("wikibase-shortdesc"))
                .and_then(Value::as_str)
                .map(ToString::to_string)
        });
        let disambiguation = pageprops
            .and_then(|props| props.get("disambiguation"))
            .is_some();
        let wikibase = pageprops
            .and_then(|props| props.get("wikibase_item"))
            .and_then(Value::as_str)
            .map(ToString::to_string);

        let links = page
            .get("links")
            .and_then(Value::as_array)
            .map(|links| {
                links
                    .iter()
                    .filter_map(|link| link.get("title").and_then(Value::as_str))
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            url: string_field(page, "fullurl").unwrap_or_default(),
            description,
            label: first_term(page, "label"),
            extract,
            extext,
            disambiguation,
            links,
            images: image_records(page),
            pageid: page.get("pageid").and_then(Value::as_u64),
            wikibase,
            title,
        })
    }
}

/// Raw payloads kept from the fetch that produced a [`Page`].
#[derive(Debug, Clone, Default)]
pub struct PageCache {
    pub random: Option<Value>,
    pub query: Option<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    pub data: PageData,
    pub cache: PageCache,
}

impl Page {
    pub fn new(data: PageData) -> Self {
        Self {
            data,
            cache: PageCache::default(),
        }
    }

    /// Fetch `title`, or a random article when no title is given.
    pub fn get_query<S>(source: &S, title: Option<&str>) -> Result<Self, QueryError>
    where
        S: WikiSource + ?Sized,
    {
        let (title, random) = match title {
            Some(title) => (title.to_string(), None),
            None => {
                let payload = source.random()?;
                (random_title(&payload)?, Some(payload))
            }
        };

        let payload = source.lookup(&title)?;
        let data = PageData::from_query(&payload)?;
        Ok(Self {
            data,
            cache: PageCache {
                random,
                query: Some(payload),
            },
        })
    }

    /// Image records whose kind contains `token`, in fetch order.
    pub fn images(&self, token: &str) -> Vec<&ImageRecord> {
        self.data
            .images
            .iter()
            .filter(|image| image.kind.contains(token))
            .collect()
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

fn first_term(page: &Value, key: &str) -> Option<String> {
    page.get("terms")
        .and_then(|terms| terms.get(key))
        .and_then(Value::as_array)
        .and_then(|values| values.first())
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

fn image_records(page: &Value) -> Vec<ImageRecord> {
    let file = string_field(page, "pageimage");
    let original = page.get("original");
    let thumbnail = page.get("thumbnail");

    let mut images = Vec::new();
    if file.is_some()
        && let Some(record) = original
            .or(thumbnail)
            .and_then(|source| image_record("query-pageimage", file.clone(), source))
    {
        images.push(record);
    }
    if let Some(record) =
        thumbnail.and_then(|source| image_record("query-thumbnail", file.clone(), source))
    {
        images.push(record);
    }
    images
}

fn image_record(kind: &str, file: Option<String>, source: &Value) -> Option<ImageRecord> {
    let url = source.get("source").and_then(Value::as_str)?;
    Some(ImageRecord {
        kind: kind.to_string(),
        url: url.to_string(),
        file,
    })
}
