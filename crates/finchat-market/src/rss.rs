//! Minimal RSS 2.0 reader for headline feeds

use crate::error::{Error, Result};
use crate::provider::NewsItem;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "encoded", default)]
    content: Option<String>,
    #[serde(rename = "pubDate", default)]
    pub_date: Option<String>,
}

/// Parse an RSS document into at most `limit` items, in feed order
pub fn parse_feed(xml: &str, limit: usize) -> Result<Vec<NewsItem>> {
    let rss: Rss =
        quick_xml::de::from_str(xml).map_err(|e| Error::InvalidResponse(e.to_string()))?;

    Ok(rss
        .channel
        .items
        .into_iter()
        .take(limit)
        .map(Item::into_news)
        .collect())
}

impl Item {
    fn into_news(self) -> NewsItem {
        let summary = self
            .description
            .as_deref()
            .map(strip_tags)
            .unwrap_or_default();
        let text = self
            .content
            .filter(|c| !c.trim().is_empty())
            .or(self.description)
            .unwrap_or_default();

        NewsItem {
            title: self.title.unwrap_or_default().trim().to_string(),
            text,
            summary,
            published_at: self.pub_date.as_deref().and_then(parse_pub_date),
        }
    }
}

fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw.trim())
        .or_else(|_| DateTime::parse_from_rfc3339(raw.trim()))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Yahoo! Finance: AAPL News</title>
    <item>
      <title>Apple beats earnings expectations</title>
      <description>Revenue &lt;b&gt;rose&lt;/b&gt; 8% year over year.</description>
      <pubDate>Tue, 05 Mar 2024 14:30:00 +0000</pubDate>
    </item>
    <item>
      <title>Supplier warns on demand</title>
      <pubDate>not a date</pubDate>
    </item>
    <item>
      <title>Third</title>
      <description>c</description>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_items_in_order() {
        let items = parse_feed(FEED, 10).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].title, "Apple beats earnings expectations");
        assert_eq!(items[0].text, "Revenue <b>rose</b> 8% year over year.");
        assert_eq!(items[0].summary, "Revenue rose 8% year over year.");
        assert_eq!(
            items[0].published_at,
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let items = parse_feed(FEED, 10).unwrap();
        assert_eq!(items[1].text, "");
        assert_eq!(items[1].published_at, None);
    }

    #[test]
    fn test_full_content_preferred_over_description() {
        let xml = r#"<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <item>
      <title>Full story</title>
      <description>short</description>
      <content:encoded>full body</content:encoded>
    </item>
    <item>
      <title>Summary only</title>
      <description>summary only</description>
    </item>
  </channel>
</rss>"#;

        let items = parse_feed(xml, 10).unwrap();
        assert_eq!(items[0].text, "full body");
        assert_eq!(items[0].summary, "short");
        assert_eq!(items[1].text, "summary only");
    }

    #[test]
    fn test_limit() {
        assert_eq!(parse_feed(FEED, 2).unwrap().len(), 2);
    }

    #[test]
    fn test_empty_channel() {
        let xml = "<rss><channel><title>x</title></channel></rss>";
        assert!(parse_feed(xml, 10).unwrap().is_empty());
    }

    #[test]
    fn test_garbage_is_invalid_response() {
        assert!(matches!(
            parse_feed("<html>oops", 10),
            Err(Error::InvalidResponse(_))
        ));
    }
}
