use crate::config::ExtractionConfig;
use scraper::{ElementRef, Html, Selector};

fn parse(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            log::warn!("Ignoring invalid selector '{}': {:?}", css, e);
            None
        }
    }
}

fn trimmed_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Text of every element matching the content selector whose text carries
/// one of the keywords, one per line. Keywords are case-sensitive.
pub fn scan_content(html: &Html, config: &ExtractionConfig) -> String {
    let Some(selector) = parse(&config.content_selector) else {
        return String::new();
    };

    let mut content = String::new();
    for element in html.select(&selector) {
        let text = trimmed_text(&element);
        if !text.is_empty() && config.content_keywords.iter().any(|keyword| text.contains(keyword.as_str())) {
            content.push_str(&text);
            content.push('\n');
        }
    }
    content
}

/// `"<title>: <value>"` lines from the attribute boxes that carry both.
/// The title is kept as rendered; only the value is trimmed.
pub fn scan_product_details(html: &Html, config: &ExtractionConfig) -> String {
    let (Some(boxes), Some(title), Some(value)) =
        (parse(&config.attribute_box), parse(&config.attribute_title), parse(&config.attribute_value))
    else {
        return String::new();
    };

    let mut details = String::new();
    for attribute in html.select(&boxes) {
        let title = attribute.select(&title).next().map(|t| t.text().collect::<String>()).unwrap_or_default();
        let value = attribute.select(&value).next().map(|v| trimmed_text(&v)).unwrap_or_default();
        if !title.is_empty() && !value.is_empty() {
            details.push_str(&format!("{}: {}\n", title, value));
        }
    }
    details
}
