//! ComicInfo.xml generation for CBZ archives.

use chrono::prelude::*;

use crate::types::SeriesMetadata;

/// Metadata for one output archive, borrowed from the series-level settings.
#[derive(Debug, Clone)]
pub struct ComicInfo<'a> {
    pub metadata: &'a SeriesMetadata,
    /// Per-volume title override, when the volume specification declares one.
    pub title: Option<&'a str>,
    pub volume: Option<u32>,
    pub page_count: usize,
}

impl<'a> ComicInfo<'a> {
    pub fn new(metadata: &'a SeriesMetadata, volume: Option<u32>, page_count: usize) -> Self {
        Self {
            metadata,
            title: None,
            volume,
            page_count,
        }
    }

    pub fn with_title(mut self, title: Option<&'a str>) -> Self {
        self.title = title;
        self
    }

    /// Renders the ComicInfo.xml document. Only present fields are emitted.
    pub fn to_xml(&self) -> String {
        let meta = self.metadata;
        let mut xml = String::new();
        xml.push_str("<ComicInfo>\n");

        let title = self.title.unwrap_or(&meta.title);
        push_element(&mut xml, "Title", title);
        push_optional(&mut xml, "Series", meta.series.as_deref());
        if let Some(volume) = self.volume {
            push_element(&mut xml, "Volume", &volume.to_string());
        }
        push_optional(&mut xml, "Summary", meta.description.as_deref());

        // Custom fields go into Notes as key-value lines
        if !meta.custom_fields.is_empty() {
            let mut pairs: Vec<(&String, &String)> = meta.custom_fields.iter().collect();
            pairs.sort();
            let notes = pairs
                .into_iter()
                .map(|(key, value)| format!("{}: {}", key, value))
                .collect::<Vec<_>>()
                .join("\n");
            push_element(&mut xml, "Notes", &notes);
        }

        let release_date = meta.release_date.unwrap_or_else(Utc::now);
        push_element(&mut xml, "Year", &release_date.year().to_string());
        push_element(&mut xml, "Month", &release_date.month().to_string());
        push_element(&mut xml, "Day", &release_date.day().to_string());

        if !meta.authors.is_empty() {
            let authors = meta.authors.join(", ");
            push_element(&mut xml, "Writer", &authors);
            push_element(&mut xml, "Penciller", &authors);
        }
        push_optional(&mut xml, "Publisher", meta.publisher.as_deref());
        push_optional(&mut xml, "Genre", meta.genre.as_deref());
        push_optional(&mut xml, "Web", meta.web.as_deref());
        push_element(&mut xml, "PageCount", &self.page_count.to_string());
        push_element(&mut xml, "LanguageISO", &meta.language);

        xml.push_str("</ComicInfo>\n");
        xml
    }
}

fn push_element(xml: &mut String, tag: &str, text: &str) {
    xml.push_str(&format!("  <{}>{}</{}>\n", tag, escape_xml(text), tag));
}

fn push_optional(xml: &mut String, tag: &str, text: Option<&str>) {
    if let Some(text) = text {
        if !text.is_empty() {
            push_element(xml, tag, text);
        }
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
