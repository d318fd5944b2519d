//! Event-based RSS 2.0 item extraction.

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::warn;

use crate::error::RssError;

/// A single `<item>` extracted from an RSS channel, before filtering or
/// title parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    /// Required `<title>` text.
    pub title: String,
    /// Required `<enclosure url="...">` attribute.
    pub enclosure: String,
    /// Optional `<description>` text.
    pub description: String,
    /// Size in bytes, from the enclosure's `length` attribute, when present.
    pub size: u64,
}

/// Parse the items out of an RSS 2.0 document, skipping any `<item>` missing
/// a title or enclosure rather than failing the whole feed.
pub fn parse_items(url: &str, body: &str) -> Result<Vec<RawItem>, RssError> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut buf = Vec::new();
    let mut in_item = false;
    let mut current = PartialItem::default();
    let mut field: Option<Field> = None;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|source| RssError::Xml {
            url: url.to_string(),
            source,
        })?;
        match event {
            Event::Eof => break,
            Event::Start(start) if local_name(&start.name().as_ref().to_vec()) == "item" => {
                in_item = true;
                current = PartialItem::default();
            }
            Event::End(end) if local_name(&end.name().as_ref().to_vec()) == "item" => {
                in_item = false;
                match current.clone().finish() {
                    Some(item) => items.push(item),
                    None => warn!(url, title = ?current.title, "skipping rss item missing required fields"),
                }
            }
            Event::Start(start) if in_item => {
                let name = local_name(&start.name().as_ref().to_vec());
                if name == "enclosure" {
                    if let Some(value) = attr(&start, "url") {
                        current.enclosure = Some(value);
                    }
                    current.size = attr(&start, "length").and_then(|length| length.parse().ok());
                    field = None;
                } else {
                    field = Field::from_name(&name);
                }
            }
            Event::Text(text) if in_item => {
                if let Some(field) = field {
                    let decoded = text.unescape().unwrap_or_default().into_owned();
                    match field {
                        Field::Title => current.title = Some(decoded),
                        Field::Description => current.description = Some(decoded),
                    }
                }
            }
            Event::End(end) if in_item => {
                let name = local_name(&end.name().as_ref().to_vec());
                if Field::from_name(&name).is_some() {
                    field = None;
                }
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(items)
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Title,
    Description,
}

impl Field {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "title" => Some(Self::Title),
            "description" => Some(Self::Description),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct PartialItem {
    title: Option<String>,
    enclosure: Option<String>,
    description: Option<String>,
    size: Option<u64>,
}

impl PartialItem {
    fn finish(self) -> Option<RawItem> {
        Some(RawItem {
            title: self.title?,
            enclosure: self.enclosure?,
            description: self.description.unwrap_or_default(),
            size: self.size.unwrap_or_default(),
        })
    }
}

fn local_name(qname: &[u8]) -> String {
    let name = String::from_utf8_lossy(qname);
    name.rsplit(':').next().unwrap_or(&name).to_string()
}

fn attr(start: &quick_xml::events::BytesStart<'_>, key: &str) -> Option<String> {
    start.attributes().flatten().find_map(|attribute| {
        (local_name(attribute.key.as_ref()) == key)
            .then(|| attribute.unescape_value().ok())
            .flatten()
            .map(|value| value.into_owned())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
<item>
  <title>Example.Show.S01E02.1080p</title>
  <enclosure url="https://example.invalid/a.torrent" length="123" type="application/x-bittorrent"/>
  <description>a good episode</description>
</item>
<item>
  <title>Missing Enclosure</title>
</item>
<item>
  <enclosure url="https://example.invalid/b.torrent"/>
</item>
</channel></rss>"#;

    #[test]
    fn extracts_well_formed_items_and_skips_incomplete_ones() {
        let items = parse_items("https://example.invalid/rss", FEED).expect("parses");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Example.Show.S01E02.1080p");
        assert_eq!(items[0].enclosure, "https://example.invalid/a.torrent");
        assert_eq!(items[0].description, "a good episode");
        assert_eq!(items[0].size, 123);
    }

    #[test]
    fn empty_channel_yields_no_items() {
        let items = parse_items("u", "<rss><channel></channel></rss>").expect("parses");
        assert!(items.is_empty());
    }
}
