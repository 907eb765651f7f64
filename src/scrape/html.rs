//! Small text helpers over `scraper` documents.

use scraper::{ElementRef, Html, Selector};

/// First element under `scope` matching `css`.
pub fn select_first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    scope.select(&selector).next()
}

pub fn select_all<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => scope.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

pub fn attr(element: ElementRef<'_>, name: &str) -> Option<String> {
    element.value().attr(name).map(str::to_string)
}

pub fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// Text nodes below `element`, skipping script and style bodies.
fn text_nodes<'a>(element: ElementRef<'a>) -> impl Iterator<Item = &'a str> + 'a {
    element.descendants().filter_map(|node| {
        let text = node.value().as_text()?;
        let in_code = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|e| matches!(e.name(), "script" | "style"))
        });
        if in_code {
            None
        } else {
            Some(&**text)
        }
    })
}

/// Trimmed text nodes concatenated without a separator.
pub fn strip_join(element: ElementRef<'_>) -> String {
    text_nodes(element).map(str::trim).collect()
}

/// Trimmed, non-empty text nodes joined by a single space.
pub fn spaced_text(element: ElementRef<'_>) -> String {
    text_nodes(element)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Every `<p>` under `element`, each strip-joined, joined by a space.
pub fn paragraph_text(element: ElementRef<'_>) -> String {
    select_all(element, "p")
        .into_iter()
        .map(strip_join)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Plain text of an HTML fragment such as a feed description.
pub fn fragment_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    spaced_text(fragment.root_element())
}

/// Resolves `href` against `base`; returns `href` unchanged when either is not a URL.
pub fn resolve_url(base: &str, href: &str) -> String {
    url::Url::parse(base)
        .and_then(|b| b.join(href))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_join_and_spaced_text() {
        let doc = Html::parse_document("<div id='x'> Hello <b> big </b>world <script>var a;</script></div>");
        let div = select_first(doc.root_element(), "div#x").unwrap();
        assert_eq!(strip_join(div), "Hellobigworld");
        assert_eq!(spaced_text(div), "Hello big world");
    }

    #[test]
    fn test_paragraph_text_joins_paragraphs() {
        let doc = Html::parse_document(
            "<div><p> First <a href='#'>link</a> </p><span>skip</span><p>Second</p></div>",
        );
        let div = select_first(doc.root_element(), "div").unwrap();
        assert_eq!(paragraph_text(div), "Firstlink Second");
    }

    #[test]
    fn test_fragment_text_strips_markup() {
        assert_eq!(
            fragment_text("<jats:p>Cells <i>divide</i>.</jats:p><p>Again</p>"),
            "Cells divide . Again"
        );
    }

    #[test]
    fn test_resolve_url() {
        assert_eq!(
            resolve_url("https://www.sciencedaily.com/releases/2025/07/1.htm", "/images/a.jpg"),
            "https://www.sciencedaily.com/images/a.jpg"
        );
        assert_eq!(
            resolve_url("https://a.example/x/", "https://cdn.example/b.jpg"),
            "https://cdn.example/b.jpg"
        );
        assert_eq!(resolve_url("not a url", "/b.jpg"), "/b.jpg");
    }

    #[test]
    fn test_invalid_selector_matches_nothing() {
        let doc = Html::parse_document("<p>x</p>");
        assert!(select_first(doc.root_element(), "p[").is_none());
        assert!(select_all(doc.root_element(), "p[").is_empty());
    }
}
