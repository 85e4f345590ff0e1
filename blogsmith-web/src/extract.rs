//! HTML → [`ProductInfo`].
//!
//! Parsing goes through `scraper` (html5ever), which recovers from any
//! malformed markup, so a missing element is never an error: it becomes the
//! field's placeholder. The only failure is a body whose bytes do not decode
//! in the encoding the page declares.

use blogsmith_config::ExtractConfig;
use encoding_rs::{Encoding, UTF_8};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::borrow::Cow;
use thiserror::Error;

pub const TITLE_PLACEHOLDER: &str = "Product";
pub const DESCRIPTION_PLACEHOLDER: &str = "No description available";

/// How far into the body a `<meta charset>` declaration is looked for.
const CHARSET_SNIFF_WINDOW: usize = 1024;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("page body is not valid {encoding}")]
    Decode { encoding: &'static str },

    #[error("invalid selector `{0}`")]
    Selector(&'static str),
}

/// What we know about the product, scraped from its page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductInfo {
    pub title: String,
    pub description: String,
    pub body_excerpt: Option<String>,
}

/// Stateless; one instance can serve any number of pages.
#[derive(Debug, Clone)]
pub struct Extractor {
    paragraph_limit: usize,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::from_config(&ExtractConfig::default())
    }
}

impl Extractor {
    /// `paragraph_limit` of `0` turns the body excerpt off.
    pub fn new(paragraph_limit: usize) -> Self {
        Self { paragraph_limit }
    }

    pub fn from_config(cfg: &ExtractConfig) -> Self {
        Self::new(cfg.body_paragraphs)
    }

    /// Parse a raw page body with no `Content-Type` to go on.
    ///
    /// ```
    /// use blogsmith_web::Extractor;
    ///
    /// let info = Extractor::default()
    ///     .extract(b"<title> Widget 3000 </title><p>Great tool.</p>")
    ///     .unwrap();
    /// assert_eq!(info.title, "Widget 3000");
    /// assert_eq!(info.description, "No description available");
    /// assert_eq!(info.body_excerpt.as_deref(), Some("Great tool."));
    /// ```
    pub fn extract(&self, body: &[u8]) -> Result<ProductInfo, ExtractError> {
        self.extract_with_content_type(body, None)
    }

    /// Decode `body` and parse it.
    ///
    /// The encoding comes from a byte order mark, else the `charset` of
    /// `content_type`, else a `<meta charset>` near the top of the page,
    /// else UTF-8.
    ///
    /// ```
    /// use blogsmith_web::Extractor;
    ///
    /// let info = Extractor::default()
    ///     .extract_with_content_type(b"<title>Caf\xe9</title>", Some("text/html; charset=ISO-8859-1"))
    ///     .unwrap();
    /// assert_eq!(info.title, "Caf\u{e9}");
    /// ```
    pub fn extract_with_content_type(
        &self,
        body: &[u8],
        content_type: Option<&str>,
    ) -> Result<ProductInfo, ExtractError> {
        let html = decode_body(body, content_type)?;
        self.extract_html(&html)
    }

    pub fn extract_html(&self, html: &str) -> Result<ProductInfo, ExtractError> {
        let document = Html::parse_document(html);

        let title = first_title(&document)?.unwrap_or_else(|| TITLE_PLACEHOLDER.to_string());
        let description =
            meta_description(&document)?.unwrap_or_else(|| DESCRIPTION_PLACEHOLDER.to_string());
        let body_excerpt = if self.paragraph_limit == 0 {
            None
        } else {
            paragraph_excerpt(&document, self.paragraph_limit)?
        };

        tracing::debug!(
            title=%title,
            has_description=%(description != DESCRIPTION_PLACEHOLDER),
            excerpt_len=body_excerpt.as_ref().map(String::len).unwrap_or(0),
            "extract.done"
        );

        Ok(ProductInfo {
            title,
            description,
            body_excerpt,
        })
    }
}

fn decode_body<'a>(
    body: &'a [u8],
    content_type: Option<&str>,
) -> Result<Cow<'a, str>, ExtractError> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(body) {
        return decode_as(encoding, &body[bom_len..]);
    }

    let declared = content_type.and_then(charset_label).or_else(|| {
        let head = &body[..body.len().min(CHARSET_SNIFF_WINDOW)];
        charset_label(&String::from_utf8_lossy(head))
    });
    let encoding = match declared {
        Some(label) => Encoding::for_label(label.as_bytes()).unwrap_or_else(|| {
            tracing::debug!(label=%label, "extract.unknown_charset");
            UTF_8
        }),
        None => UTF_8,
    };
    decode_as(encoding, body)
}

fn decode_as<'a>(encoding: &'static Encoding, bytes: &'a [u8]) -> Result<Cow<'a, str>, ExtractError> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .ok_or(ExtractError::Decode {
            encoding: encoding.name(),
        })
}

/// Value of the first `charset=` in a header or markup fragment, lowercased.
fn charset_label(text: &str) -> Option<String> {
    const KEY: &str = "charset=";
    let lower = text.to_ascii_lowercase();
    let start = lower.find(KEY)? + KEY.len();
    let label: String = lower[start..]
        .trim_start_matches(['"', '\'', ' '])
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
        .collect();
    (!label.is_empty()).then_some(label)
}

fn selector(css: &'static str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|_| ExtractError::Selector(css))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Trimmed text of the first `<title>`; an empty title counts as absent.
fn first_title(document: &Html) -> Result<Option<String>, ExtractError> {
    let sel = selector("title")?;
    Ok(document
        .select(&sel)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty()))
}

/// `content` of the first `<meta name="description">`, name matched case-insensitively.
fn meta_description(document: &Html) -> Result<Option<String>, ExtractError> {
    let sel = selector("meta[name]")?;
    Ok(document
        .select(&sel)
        .find(|el| {
            el.value()
                .attr("name")
                .is_some_and(|n| n.trim().eq_ignore_ascii_case("description"))
        })
        .and_then(|el| el.value().attr("content"))
        .map(|c| c.trim().to_string()))
}

/// First `limit` paragraphs in document order, trimmed and space-joined.
fn paragraph_excerpt(document: &Html, limit: usize) -> Result<Option<String>, ExtractError> {
    let sel = selector("p")?;
    let excerpt = document
        .select(&sel)
        .take(limit)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    Ok((!excerpt.is_empty()).then_some(excerpt))
}
