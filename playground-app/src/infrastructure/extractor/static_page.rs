use super::page::{normalize_text, PageView, ProbeError};
use scraper::{ElementRef, Html, Selector};

const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "main", "nav", "ol", "p", "pre", "section", "table", "tr", "ul",
];

pub struct StaticPage {
    source: String,
    document: Html,
}

impl StaticPage {
    pub fn parse(html: &str) -> Self {
        Self {
            source: html.to_string(),
            document: Html::parse_document(html),
        }
    }

    fn selector(selector: &str) -> Result<Selector, ProbeError> {
        Selector::parse(selector).map_err(|_| ProbeError::InvalidSelector(selector.to_string()))
    }
}

impl PageView for StaticPage {
    fn title(&self) -> Result<String, ProbeError> {
        let selector = Self::selector("title")?;
        Ok(self
            .document
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default())
    }

    fn markup(&self) -> Result<String, ProbeError> {
        Ok(self.source.clone())
    }

    fn body_text(&self) -> Result<String, ProbeError> {
        let selector = Self::selector("body")?;
        Ok(self
            .document
            .select(&selector)
            .next()
            .map(visible_text)
            .unwrap_or_default())
    }

    fn inner_texts(&self, selector: &str, limit: usize) -> Result<Vec<String>, ProbeError> {
        let selector = Self::selector(selector)?;
        Ok(self
            .document
            .select(&selector)
            .take(limit)
            .map(visible_text)
            .collect())
    }

    fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>, ProbeError> {
        let selector = Self::selector(selector)?;
        Ok(self
            .document
            .select(&selector)
            .next()
            .and_then(|el| el.value().attr(name))
            .map(str::to_string))
    }

    fn count(&self, selector: &str) -> Result<usize, ProbeError> {
        let selector = Self::selector(selector)?;
        Ok(self.document.select(&selector).count())
    }
}

fn visible_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    normalize_text(&out)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_el) = ElementRef::wrap(child) {
            let name = child_el.value().name();
            if HIDDEN_ELEMENTS.contains(&name) {
                continue;
            }
            let is_block = BLOCK_ELEMENTS.contains(&name);
            if is_block {
                out.push('\n');
            }
            collect_text(child_el, out);
            if is_block {
                out.push('\n');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = r#"<html><head><title> Acme </title>
        <meta name="description" content="Ship faster"></head>
        <body><script>var hidden = 1;</script>
        <nav><a href="/">Home</a> <a href="/pricing">Pricing</a></nav>
        <div class="hero"><h1>Build <em>better</em></h1><p>Line one</p><p>Line two</p></div>
        </body></html>"#;

    #[test]
    fn test_title_and_attribute() {
        let page = StaticPage::parse(HTML);
        assert_eq!(page.title().unwrap(), "Acme");
        assert_eq!(
            page.attribute("meta[name=\"description\"]", "content").unwrap(),
            Some("Ship faster".to_string())
        );
        assert_eq!(page.attribute("meta[name=\"robots\"]", "content").unwrap(), None);
    }

    #[test]
    fn test_inner_texts_respects_limit_and_order() {
        let page = StaticPage::parse(HTML);
        assert_eq!(page.inner_texts("nav a", 10).unwrap(), vec!["Home", "Pricing"]);
        assert_eq!(page.inner_texts("nav a", 1).unwrap(), vec!["Home"]);
        assert_eq!(page.inner_texts("h1", 10).unwrap(), vec!["Build better"]);
    }

    #[test]
    fn test_body_text_skips_scripts_and_splits_blocks() {
        let page = StaticPage::parse(HTML);
        let text = page.body_text().unwrap();
        assert!(!text.contains("hidden"));
        assert!(text.contains("Line one\nLine two"));
    }

    #[test]
    fn test_invalid_selector_is_probe_error() {
        let page = StaticPage::parse(HTML);
        assert!(matches!(
            page.count("div[[["),
            Err(ProbeError::InvalidSelector(_))
        ));
    }
}
