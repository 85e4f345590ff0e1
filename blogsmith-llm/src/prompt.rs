//! Instruction text for the blog post request.
//!
//! Everything extracted from the page is inserted verbatim: no escaping, no
//! truncation. The output depends only on the inputs.

use blogsmith_web::ProductInfo;
use std::fmt::Write;

const WORD_RANGE: &str = "500-700";

const REQUIREMENTS: &[&str] = &[
    "Format the blog in HTML using <h2>, <p>, <ul>, etc.",
    "Use a friendly, helpful and persuasive tone",
    "Include a strong call-to-action with the affiliate link",
    "Be SEO-friendly: use the product name in the headings and natural keywords throughout",
];

/// Render the instruction for one product.
///
/// ```
/// use blogsmith_llm::prompt::build_prompt;
/// use blogsmith_web::ProductInfo;
///
/// let info = ProductInfo {
///     title: "Widget 3000".into(),
///     description: "Best widget ever".into(),
///     body_excerpt: None,
/// };
/// let prompt = build_prompt(&info, "https://example.com/widget");
/// assert!(prompt.contains("Widget 3000"));
/// assert!(prompt.contains("https://example.com/widget"));
/// ```
pub fn build_prompt(info: &ProductInfo, url: &str) -> String {
    let mut out = String::with_capacity(512);

    // Infallible: writing into a String.
    let _ = writeln!(
        out,
        "Write a short blog post ({WORD_RANGE} words) promoting this product:"
    );
    out.push('\n');
    let _ = writeln!(out, "- Product: {}", info.title);
    let _ = writeln!(out, "- Description: {}", info.description);
    if let Some(excerpt) = &info.body_excerpt {
        let _ = writeln!(out, "- Details from the product page: {excerpt}");
    }
    let _ = writeln!(out, "- Affiliate link: {url}");
    out.push('\n');
    out.push_str("Requirements:\n");
    for req in REQUIREMENTS {
        let _ = writeln!(out, "- {req}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> ProductInfo {
        ProductInfo {
            title: "Widget 3000".into(),
            description: "Best widget ever".into(),
            body_excerpt: Some("Great tool.".into()),
        }
    }

    #[test]
    fn embeds_every_field_verbatim() {
        let prompt = build_prompt(&widget(), "https://example.com/widget");
        for needle in [
            "Widget 3000",
            "Best widget ever",
            "Great tool.",
            "https://example.com/widget",
        ] {
            assert!(prompt.contains(needle), "missing {needle:?} in:\n{prompt}");
        }
    }

    #[test]
    fn carries_the_authoring_directives() {
        let prompt = build_prompt(&widget(), "https://example.com/widget");
        assert!(prompt.contains("500-700 words"));
        assert!(prompt.contains("<h2>, <p>, <ul>"));
        assert!(prompt.contains("call-to-action"));
        assert!(prompt.contains("SEO"));
        assert!(prompt.contains("friendly"));
    }

    #[test]
    fn omits_the_details_line_without_an_excerpt() {
        let info = ProductInfo {
            body_excerpt: None,
            ..widget()
        };
        let prompt = build_prompt(&info, "https://example.com/widget");
        assert!(!prompt.contains("Details from the product page"));
    }

    #[test]
    fn special_characters_are_not_escaped() {
        let info = ProductInfo {
            title: "<b>Tom & Jerry's \"Deluxe\"</b>".into(),
            description: "{braces} and $dollars".into(),
            body_excerpt: None,
        };
        let url = "https://shop.test/p?id=1&ref=a b";
        let prompt = build_prompt(&info, url);
        assert!(prompt.contains("<b>Tom & Jerry's \"Deluxe\"</b>"));
        assert!(prompt.contains("{braces} and $dollars"));
        assert!(prompt.contains(url));
    }

    #[test]
    fn is_deterministic() {
        let a = build_prompt(&widget(), "https://example.com/widget");
        let b = build_prompt(&widget(), "https://example.com/widget");
        assert_eq!(a, b);
    }
}
