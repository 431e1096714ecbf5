//! Offline fixtures shared by the unit tests.

use std::cell::RefCell;
use std::collections::BTreeMap;

use serde_json::{Value, json};

use crate::error::QueryError;
use crate::query::WikiSource;

pub(crate) fn einstein_payload() -> Value {
    json!({
        "batchcomplete": true,
        "query": {
            "pages": [{
                "pageid": 736,
                "ns": 0,
                "title": "Albert Einstein",
                "extract": "<p class=\"mw-empty-elt\">\n</p>\n<p><b>Albert Einstein</b> (14 March 1879 – 18 April 1955) was a German-born theoretical physicist who is best known for developing the theory of relativity. Einstein also made important contributions to quantum mechanics.</p>\n<p>Born in the German Empire, Einstein moved to Switzerland in 1895, forsaking his German citizenship the following year.</p>",
                "contentmodel": "wikitext",
                "pagelanguage": "en",
                "fullurl": "https://en.wikipedia.org/wiki/Albert_Einstein",
                "canonicalurl": "https://en.wikipedia.org/wiki/Albert_Einstein",
                "thumbnail": {
                    "source": "https://upload.wikimedia.org/wikipedia/commons/thumb/3/3e/Einstein_1921_by_F_Schmutzer_-_restoration.jpg/240px-Einstein_1921_by_F_Schmutzer_-_restoration.jpg",
                    "width": 240,
                    "height": 300
                },
                "original": {
                    "source": "https://upload.wikimedia.org/wikipedia/commons/3/3e/Einstein_1921_by_F_Schmutzer_-_restoration.jpg",
                    "width": 2523,
                    "height": 3156
                },
                "pageimage": "Einstein_1921_by_F_Schmutzer_-_restoration.jpg",
                "pageprops": {"wikibase_item": "Q937"},
                "terms": {
                    "label": ["Albert Einstein"],
                    "description": ["German-born theoretical physicist (1879–1955)"]
                },
                "links": [{"ns": 0, "title": "Annus mirabilis papers"}]
            }]
        }
    })
}

/// In-memory [`WikiSource`] keyed by title.
pub(crate) struct StubSource {
    pages: BTreeMap<String, Value>,
    random: Option<String>,
    lookups: RefCell<Vec<String>>,
}

impl StubSource {
    pub(crate) fn new() -> Self {
        let mut pages = BTreeMap::new();
        pages.insert("Albert Einstein".to_string(), einstein_payload());
        Self {
            pages,
            random: None,
            lookups: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn with_random(mut self, title: &str) -> Self {
        self.random = Some(title.to_string());
        self
    }

    pub(crate) fn lookups(&self) -> Vec<String> {
        self.lookups.borrow().clone()
    }
}

impl WikiSource for StubSource {
    fn site(&self) -> &str {
        "en.wikipedia.org"
    }

    fn lookup(&self, title: &str) -> Result<Value, QueryError> {
        self.lookups.borrow_mut().push(title.to_string());
        self.pages
            .get(title)
            .cloned()
            .ok_or_else(|| QueryError::NotFound(title.to_string()))
    }

    fn random(&self) -> Result<Value, QueryError> {
        match &self.random {
            Some(title) => Ok(json!({"query": {"random": [{"id": 1, "ns": 0, "title": title}]}})),
            None => Err(QueryError::Api {
                code: "stub".to_string(),
                info: "no random title configured".to_string(),
            }),
        }
    }
}
