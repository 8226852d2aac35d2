//! The structured result of parsing an RSS document.
//!
//! `Feed` keeps the channel-level metadata plus its items in document order.
//! Nothing here re-sorts items: the renderer relies on the publisher's order
//! to decide which leading entries fit in a message.

use chrono::{DateTime, Utc};

/// Channel metadata and the admitted items, in document order.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Feed {
    /// Channel `<title>`, empty when absent.
    pub title: String,
    /// Channel `<description>`, empty when absent.
    pub description: String,
    /// Channel `<link>`, empty when absent.
    pub link: String,
    /// Items that carried both a title and a link.
    pub items: Vec<FeedItem>,
}

/// A single `<item>` from an RSS channel.
///
/// Only items with a non-empty title and link are ever constructed by the
/// parser; the remaining fields are whatever the publisher provided.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FeedItem {
    /// Human-readable headline.
    pub title: String,

    /// URL to the full content.
    pub link: String,

    /// Optional longer description or summary text.
    pub description: Option<String>,

    /// Raw `<pubDate>` text as published.
    pub pub_date: Option<String>,

    /// `<guid>` value, if any.
    pub guid: Option<String>,
}

impl FeedItem {
    /// Publication timestamp parsed from the RFC 2822 `<pubDate>`.
    ///
    /// `None` when the date is missing or unparseable.
    pub fn published(&self) -> Option<DateTime<Utc>> {
        self.pub_date
            .as_deref()
            .and_then(|d| DateTime::parse_from_rfc2822(d.trim()).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Markdown bullet line used when relaying a feed to chat.
    pub fn bullet(&self) -> String {
        format!("- [{}]({})\n", self.title, self.link)
    }
}

impl Feed {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
