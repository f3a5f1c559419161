use std::time::Duration;

use anyhow::Context;
use indicatif::ProgressBar;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde_json::Value;
use url::Url;

use crate::config::{Config, Library};

const API_BASE: &str = "https://api.zotero.org";
const API_VERSION: &str = "3";

const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'/')
    .add(b'{')
    .add(b'}');

/// Anything that can hand out one page of results at a given offset.
pub trait PageSource {
    fn page(&self, start: usize, limit: usize) -> anyhow::Result<Vec<Value>>;
}

/// Keep requesting pages until the service returns an empty one.
pub fn fetch_all(source: &impl PageSource, limit: usize) -> anyhow::Result<Vec<Value>> {
    let progress = ProgressBar::new_spinner();
    progress.enable_steady_tick(Duration::from_millis(120));

    let mut all = Vec::new();
    loop {
        let page = match source.page(all.len(), limit) {
            Ok(page) => page,
            Err(err) => {
                progress.finish_and_clear();
                return Err(err);
            }
        };
        tracing::debug!(start = all.len(), received = page.len(), "fetched page");
        if page.is_empty() {
            break;
        }
        all.extend(page);
        progress.set_message(format!("fetched {} records", all.len()));
    }

    progress.finish_and_clear();
    tracing::info!(total = all.len(), "fetch complete");
    Ok(all)
}

pub struct Client {
    agent: ureq::Agent,
    api_key: String,
    base: Url,
}

impl Client {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let cfg = ureq::Agent::config_builder()
            .timeout_connect(Some(Duration::from_secs(10)))
            .timeout_global(Some(Duration::from_secs(60)))
            .build();
        let base = Url::parse(&format!("{API_BASE}{}", config.library.path()))
            .context("invalid library URL")?;
        Ok(Client {
            agent: ureq::Agent::new_with_config(cfg),
            api_key: config.api_key.clone(),
            base,
        })
    }

    fn url(&self, segments: &[&str], start: usize, limit: usize) -> Url {
        let mut path = self.base.path().trim_end_matches('/').to_string();
        for seg in segments {
            path.push('/');
            path.push_str(&utf8_percent_encode(seg, PATH_SEGMENT_ENCODE_SET).to_string());
        }
        let mut url = self.base.clone();
        url.set_path(&path);
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("start", &start.to_string())
            .append_pair("limit", &limit.to_string());
        url
    }

    fn get_json(&self, url: &Url) -> anyhow::Result<Vec<Value>> {
        let body: String = self
            .agent
            .get(url.as_str())
            .header("Zotero-API-Version", API_VERSION)
            .header("Zotero-API-Key", self.api_key.as_str())
            .call()
            .with_context(|| format!("request to {url} failed"))?
            .into_body()
            .read_to_string()
            .context("failed to read response body")?;

        serde_json::from_str(&body).with_context(|| format!("unexpected response from {url}"))
    }

    pub fn collections(&self) -> Collections<'_> {
        Collections { client: self }
    }

    pub fn collection_items<'a>(&'a self, collection: &'a str) -> CollectionItems<'a> {
        CollectionItems { client: self, collection }
    }
}

pub struct Collections<'a> {
    client: &'a Client,
}

impl PageSource for Collections<'_> {
    fn page(&self, start: usize, limit: usize) -> anyhow::Result<Vec<Value>> {
        let url = self.client.url(&["collections"], start, limit);
        self.client.get_json(&url)
    }
}

pub struct CollectionItems<'a> {
    client: &'a Client,
    collection: &'a str,
}

impl PageSource for CollectionItems<'_> {
    fn page(&self, start: usize, limit: usize) -> anyhow::Result<Vec<Value>> {
        let url = self
            .client
            .url(&["collections", self.collection, "items"], start, limit);
        self.client.get_json(&url)
    }
}

/// A collection as listed by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub key: String,
    pub name: String,
}

impl Collection {
    pub fn from_json(value: &Value) -> anyhow::Result<Self> {
        let key = value
            .get("key")
            .and_then(Value::as_str)
            .context("collection without key")?;
        let name = value
            .pointer("/data/name")
            .and_then(Value::as_str)
            .unwrap_or_default();
        Ok(Collection { key: key.to_string(), name: name.to_string() })
    }

    /// Case-insensitive partial match on the name; an empty filter matches all.
    pub fn matches(&self, filter: &str) -> bool {
        self.name.to_lowercase().contains(&filter.to_lowercase())
    }
}

impl Library {
    pub fn path(&self) -> String {
        match self {
            Library::User(id) => format!("/users/{id}"),
            Library::Group(id) => format!("/groups/{id}"),
        }
    }
}
