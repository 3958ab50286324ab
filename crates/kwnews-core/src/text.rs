use std::sync::LazyLock;

use regex::{Captures, Regex};

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);").expect("valid entity regex")
});
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

/// Normalize raw article text from the search API.
///
/// Decodes character entities (unknown ones are kept verbatim), removes
/// markup tags while keeping their inner text, then collapses every
/// whitespace run to a single space and trims. Entities are decoded first so
/// encoded tags such as `&lt;b&gt;` are stripped as well.
#[must_use]
pub fn normalize_text(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let decoded = ENTITY_RE.replace_all(raw, |caps: &Captures<'_>| {
        let entity = &caps[0];
        match quick_xml::escape::unescape_with(entity, quick_xml::escape::resolve_html5_entity) {
            Ok(text) => text.into_owned(),
            Err(_) => entity.to_string(),
        }
    });

    let stripped = TAG_RE.replace_all(&decoded, "");

    // `split_whitespace` treats NBSP (U+00A0) as whitespace.
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
