//! HTML header section splitter

use scraper::{ElementRef, Html, Selector};

use crate::domain::ingestion::{DocumentSegment, SplitterConfig, SplitterType, TextSplitter};
use crate::domain::DomainError;

use super::recursive::RecursiveCharacterSplitter;

/// Metadata keys for the enclosing `h1`, `h2` and `h3` headers
pub const HEADER_KEYS: [&str; 3] = ["Header 1", "Header 2", "Header 3"];

/// A run of text under one combination of enclosing headers
#[derive(Debug, Clone, PartialEq)]
struct HtmlSection {
    headers: [Option<String>; 3],
    content: String,
}

#[derive(Debug, Default)]
struct SectionBuilder {
    headers: [Option<String>; 3],
    current: String,
    sections: Vec<HtmlSection>,
}

impl SectionBuilder {
    fn flush(&mut self) {
        let content = normalize_text(&self.current);
        self.current.clear();

        if !content.is_empty() {
            self.sections.push(HtmlSection {
                headers: self.headers.clone(),
                content,
            });
        }
    }

    fn visit(&mut self, element: &ElementRef) {
        for node in element.children() {
            if let Some(el) = ElementRef::wrap(node) {
                let tag_name = el.value().name();

                if matches!(tag_name, "script" | "style" | "noscript" | "head") {
                    continue;
                }

                if let Some(level) = header_level(tag_name) {
                    self.flush();

                    let title = normalize_text(&el.text().collect::<String>());
                    for deeper in self.headers.iter_mut().skip(level) {
                        *deeper = None;
                    }
                    self.headers[level - 1] = Some(title.clone());
                    self.current.push_str(&title);
                    self.current.push('\n');
                    continue;
                }

                let block = is_block(tag_name);

                if block {
                    self.current.push('\n');
                }

                self.visit(&el);

                if block {
                    self.current.push('\n');
                }
            } else if let Some(text) = node.value().as_text() {
                self.current.push_str(text);
            }
        }
    }
}

fn header_level(tag_name: &str) -> Option<usize> {
    match tag_name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        _ => None,
    }
}

fn is_block(tag_name: &str) -> bool {
    matches!(
        tag_name,
        "p" | "div"
            | "section"
            | "article"
            | "h4"
            | "h5"
            | "h6"
            | "br"
            | "li"
            | "ul"
            | "ol"
            | "tr"
            | "td"
            | "th"
            | "pre"
            | "blockquote"
    )
}

fn normalize_text(text: &str) -> String {
    text.lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Splitter that cuts an HTML document into sections at `h1`, `h2` and `h3`
/// headers, recording the enclosing headers on every chunk.
///
/// Sections longer than `chunk_size` are split further with the recursive
/// splitter under the same configuration.
#[derive(Debug, Clone)]
pub struct HtmlHeaderSplitter {
    inner: RecursiveCharacterSplitter,
}

impl HtmlHeaderSplitter {
    pub fn new(config: &SplitterConfig) -> Result<Self, DomainError> {
        Ok(Self {
            inner: RecursiveCharacterSplitter::new(config)?,
        })
    }

    fn sections(html: &str) -> Vec<HtmlSection> {
        let document = Html::parse_document(html);
        let mut builder = SectionBuilder::default();

        let body = Selector::parse("body")
            .ok()
            .and_then(|sel| document.select(&sel).next());

        match body {
            Some(body) => builder.visit(&body),
            None => builder.visit(&document.root_element()),
        }

        builder.flush();
        builder.sections
    }
}

impl TextSplitter for HtmlHeaderSplitter {
    fn split_text(&self, text: &str) -> Result<Vec<String>, DomainError> {
        let mut chunks = Vec::new();

        for section in Self::sections(text) {
            chunks.extend(self.inner.split_text(&section.content)?);
        }

        Ok(chunks)
    }

    fn name(&self) -> &'static str {
        SplitterType::Html.as_str()
    }

    fn split_segment(&self, segment: &DocumentSegment) -> Result<Vec<DocumentSegment>, DomainError> {
        let mut result = Vec::new();

        for section in Self::sections(&segment.content) {
            let mut metadata = segment.metadata.clone();

            for (key, header) in HEADER_KEYS.iter().zip(section.headers.iter()) {
                if let Some(header) = header {
                    metadata.insert(key.to_string(), serde_json::Value::String(header.clone()));
                }
            }

            for content in self.inner.split_text(&section.content)? {
                result.push(DocumentSegment {
                    content,
                    metadata: metadata.clone(),
                });
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <!DOCTYPE html>
        <html>
        <head><title>Handbook</title><style>body { color: red; }</style></head>
        <body>
            <p>Welcome text.</p>
            <h1>Onboarding</h1>
            <p>First day checklist.</p>
            <h2>Accounts</h2>
            <p>Request a laptop.</p>
            <script>console.log("skip")</script>
            <h1>Policies</h1>
            <p>Travel rules.</p>
        </body>
        </html>
    "#;

    #[test]
    fn test_sections_follow_headers() {
        let splitter = HtmlHeaderSplitter::new(&SplitterConfig::default()).unwrap();
        let chunks = splitter.split_text(PAGE).unwrap();

        assert_eq!(
            chunks,
            vec![
                "Welcome text.",
                "Onboarding\nFirst day checklist.",
                "Accounts\nRequest a laptop.",
                "Policies\nTravel rules."
            ]
        );
    }

    #[test]
    fn test_segment_metadata_tracks_header_path() {
        let splitter = HtmlHeaderSplitter::new(&SplitterConfig::default()).unwrap();
        let segment = DocumentSegment::new(PAGE).with_metadata("source", "handbook.html".into());

        let chunks = splitter.split_segment(&segment).unwrap();

        assert_eq!(chunks.len(), 4);
        assert!(chunks[0].metadata.get("Header 1").is_none());
        assert_eq!(chunks[2].metadata["Header 1"], "Onboarding");
        assert_eq!(chunks[2].metadata["Header 2"], "Accounts");
        assert_eq!(chunks[3].metadata["Header 1"], "Policies");
        assert!(chunks[3].metadata.get("Header 2").is_none());
        assert!(chunks.iter().all(|c| c.metadata["source"] == "handbook.html"));
    }

    #[test]
    fn test_long_section_is_split_to_size() {
        let body = "<p>".to_string() + &"lorem ipsum ".repeat(50) + "</p>";
        let html = format!("<html><body><h1>Long</h1>{}</body></html>", body);

        let splitter = HtmlHeaderSplitter::new(&SplitterConfig::new(100, 10)).unwrap();
        let chunks = splitter.split_text(&html).unwrap();

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 100));
    }

    #[test]
    fn test_plain_text_input() {
        let splitter = HtmlHeaderSplitter::new(&SplitterConfig::default()).unwrap();
        let chunks = splitter.split_text("no markup at all").unwrap();

        assert_eq!(chunks, vec!["no markup at all"]);
    }
}
