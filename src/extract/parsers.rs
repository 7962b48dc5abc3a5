//! HTML extractors built on CSS selectors
//!
//! This module provides the bundled extractors:
//! - `BodyExtractor`: the text of the page body
//! - `SelectorExtractor`: named fields picked out with CSS selectors
//! - `LinkExtractor`: every followable link on the page

use crate::extract::{Document, Extracted, ExtractionError, Extractor, Record};
use crate::state::JobContext;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use url::Url;

/// Parses a CSS selector, reporting failures as configuration errors
fn parse_selector(css: &str) -> Result<Selector, ConfigError> {
    Selector::parse(css).map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", css, e)))
}

/// Parses one of the bundled selectors at extraction time
fn builtin_selector(css: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(css).map_err(|e| ExtractionError::Custom(format!("'{}': {:?}", css, e)))
}

/// Collects the whitespace-normalized text of an element
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extracts the text of `<body>` as `{"body": text}`
///
/// Fails when the page has no body text.
#[derive(Debug, Clone, Copy, Default)]
pub struct BodyExtractor;

impl BodyExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for BodyExtractor {
    fn extract(&self, _ctx: &JobContext, document: &Document) -> Result<Extracted, ExtractionError> {
        let body = builtin_selector("body")?;
        let html = document.html();
        let text = html
            .select(&body)
            .next()
            .map(element_text)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ExtractionError::NotFound(format!("body text in {}", document.url)))?;

        let mut record = Record::new();
        record.insert("body".to_string(), Value::String(text));
        Ok(Extracted::One(record))
    }
}

/// Extracts named fields with CSS selectors
///
/// Without an item selector the whole page yields one record. With an item
/// selector every matching element yields one record, and field selectors are
/// evaluated inside that element. A field with no match is `null`.
///
/// # Example
///
/// ```
/// use scrapework::extract::SelectorExtractor;
///
/// let extractor = SelectorExtractor::new(
///     Some(".quote"),
///     [("text", ".text"), ("author", ".author")],
/// )
/// .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct SelectorExtractor {
    item: Option<Selector>,
    fields: Vec<(String, Selector)>,
}

impl SelectorExtractor {
    pub fn new<I, K, V>(item: Option<&str>, fields: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let item = item.map(parse_selector).transpose()?;
        let fields = fields
            .into_iter()
            .map(|(name, css)| Ok((name.into(), parse_selector(css.as_ref())?)))
            .collect::<Result<Vec<_>, ConfigError>>()?;

        if fields.is_empty() {
            return Err(ConfigError::Validation(
                "selector extractor needs at least one field".to_string(),
            ));
        }

        Ok(Self { item, fields })
    }

    fn record_from(&self, scope: ElementRef<'_>) -> Record {
        self.fields
            .iter()
            .map(|(name, selector)| {
                let value = scope
                    .select(selector)
                    .next()
                    .map(|element| Value::String(element_text(element)))
                    .unwrap_or(Value::Null);
                (name.clone(), value)
            })
            .collect()
    }
}

impl Extractor for SelectorExtractor {
    fn extract(&self, _ctx: &JobContext, document: &Document) -> Result<Extracted, ExtractionError> {
        let html = document.html();
        let root = html.root_element();

        match &self.item {
            Some(item) => Ok(Extracted::Many(
                root.select(item).map(|element| self.record_from(element)).collect(),
            )),
            None => Ok(Extracted::One(self.record_from(root))),
        }
    }
}

/// Extracts every followable link as `{"url": absolute, "text": anchor text}`
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs and fragment-only anchors
/// - Anything that does not resolve to http(s)
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkExtractor;

impl LinkExtractor {
    pub fn new() -> Self {
        Self
    }

    fn links(&self, html: &Html, anchors: &Selector, base_url: &Url) -> Vec<Record> {
        let mut links = Vec::new();

        for element in html.select(anchors) {
            // Skip if it has the download attribute
            if element.value().attr("download").is_some() {
                continue;
            }

            let Some(absolute_url) = element
                .value()
                .attr("href")
                .and_then(|href| resolve_link(href, base_url))
            else {
                continue;
            };

            let mut record = Record::new();
            record.insert("url".to_string(), Value::String(absolute_url));
            record.insert("text".to_string(), Value::String(element_text(element)));
            links.push(record);
        }

        links
    }
}

impl Extractor for LinkExtractor {
    fn extract(&self, _ctx: &JobContext, document: &Document) -> Result<Extracted, ExtractionError> {
        let anchors = builtin_selector("a[href]")?;
        let base_url = Url::parse(&document.final_url).map_err(|e| {
            ExtractionError::UnexpectedValue(format!("bad base url {}: {}", document.final_url, e))
        })?;
        Ok(Extracted::Many(self.links(&document.html(), &anchors, &base_url)))
    }
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url.to_string()),
        _ => None,
    }
}
