use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::CACHE_CONTROL;
use serde_json::Value;

use crate::catalog::{CatalogItem, Language, sample_catalog};
use crate::config::NetworkConfig;

// ==================== Fallback Combinators ====================

/// Use `result` if it succeeded, otherwise log and fall back to `default`.
pub fn or_fallback<T>(result: Result<T>, default: impl FnOnce() -> T, what: &str) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Failed to load {}, using fallback: {:#}", what, e);
            default()
        }
    }
}

/// Await a fetch and substitute `default` on any failure (network, status or
/// parse).
pub async fn fetch_or_default<T, F>(fetch: F, default: T, what: &str) -> T
where
    F: Future<Output = Result<T>>,
{
    or_fallback(fetch.await, || default, what)
}

// ==================== Stale Response Guard ====================

/// "Still mounted" flag shared between a view and its in-flight fetches.
///
/// Once [`MountGuard::unmount`] is called, late results are dropped instead of
/// applied.
#[derive(Debug, Clone)]
pub struct MountGuard {
    mounted: Arc<AtomicBool>,
}

impl Default for MountGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl MountGuard {
    pub fn new() -> Self {
        Self {
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Hand `value` to `sink` only if still mounted. Returns whether it was
    /// applied.
    pub fn apply_if_mounted<T>(&self, value: T, sink: impl FnOnce(T)) -> bool {
        if !self.is_mounted() {
            tracing::debug!("Discarding response for unmounted view");
            return false;
        }
        sink(value);
        true
    }
}

// ==================== Translations ====================

/// Localized UI strings, nested by section (`{"hero": {"title": ...}}`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Translations {
    root: Option<Value>,
}

impl Translations {
    /// No overrides; every lookup falls back to the built-in strings.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap a JSON object. Anything other than an object yields `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        value.is_object().then_some(Self { root: Some(value) })
    }

    pub fn is_empty(&self) -> bool {
        self.root
            .as_ref()
            .and_then(Value::as_object)
            .is_none_or(|map| map.is_empty())
    }

    /// Look up a dotted key such as `location.hour_open`.
    pub fn get(&self, key: &str) -> Option<&str> {
        let mut node = self.root.as_ref()?;
        for part in key.split('.') {
            node = node.get(part)?;
        }
        node.as_str()
    }

    /// Translated string for `key`, or the built-in Spanish/English text.
    pub fn text<'a>(&'a self, key: &str, lang: Language, es: &'a str, en: &'a str) -> &'a str {
        self.get(key).unwrap_or_else(|| lang.pick(es, en))
    }
}

// ==================== Catalog Client ====================

/// Client for the static catalog and locale files.
#[derive(Clone, Debug)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    /// Create a new client. No timeout applies unless one is configured.
    pub fn new(base_url: String, network_config: &NetworkConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = network_config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = network_config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn catalog_url(&self) -> String {
        format!("{}/products.json", self.base_url)
    }

    pub fn translations_url(&self, lang: Language) -> String {
        format!("{}/locales/{}.json", self.base_url, lang.code())
    }

    /// Fetch the product list, bypassing any cache.
    pub async fn fetch_catalog(&self) -> Result<Vec<CatalogItem>> {
        let response = self
            .client
            .get(self.catalog_url())
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await
            .context("Failed to send catalog request")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Catalog returned error status: {}", status);
        }

        let items = response
            .json::<Vec<CatalogItem>>()
            .await
            .context("Failed to parse catalog response")?;

        tracing::info!("Fetched {} catalog items", items.len());
        Ok(items)
    }

    /// Fetch the string overrides for one language.
    pub async fn fetch_translations(&self, lang: Language) -> Result<Translations> {
        let response = self
            .client
            .get(self.translations_url(lang))
            .send()
            .await
            .context("Failed to send translations request")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Translations returned error status: {}", status);
        }

        let value = response
            .json::<Value>()
            .await
            .context("Failed to parse translations response")?;

        Translations::from_value(value).context("Translations file is not a JSON object")
    }

    /// Catalog from the network, or the built-in sample on any failure.
    pub async fn load_catalog(&self) -> Vec<CatalogItem> {
        fetch_or_default(self.fetch_catalog(), sample_catalog(), "catalog").await
    }

    /// Translations from the network, or no overrides on any failure.
    pub async fn load_translations(&self, lang: Language) -> Translations {
        fetch_or_default(
            self.fetch_translations(lang),
            Translations::empty(),
            "translations",
        )
        .await
    }
}
