//! Paged responses and the time-window selector for top items

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::Track;

/// Affinity window for top artists/tracks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    /// Roughly the last four weeks
    #[serde(rename = "short_term")]
    Short,
    /// Roughly the last six months
    #[default]
    #[serde(rename = "medium_term")]
    Medium,
    /// Several years of history
    #[serde(rename = "long_term")]
    Long,
}

crate::impl_wire_str_conversions!(TimeRange {
    Short => "short_term",
    Medium => "medium_term",
    Long => "long_term",
});

/// Offset-based page of items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
}

impl<T> PagedResult<T> {
    /// Wraps a standalone list (no server-side paging) as a single page.
    #[must_use]
    pub fn single(items: Vec<T>, limit: u32) -> Self {
        let total = u32::try_from(items.len()).unwrap_or(u32::MAX);
        Self { items, total, limit, offset: 0, href: None, next: None, previous: None }
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }
}

/// One entry of the recently-played history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayHistory {
    pub track: Track,
    pub played_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursors {
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub before: Option<String>,
}

/// Cursor-based page (recently played)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPage<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub cursors: Option<Cursors>,
    #[serde(default)]
    pub href: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_range_serializes_to_provider_values() {
        assert_eq!(TimeRange::Short.to_string(), "short_term");
        assert_eq!(serde_json::to_string(&TimeRange::Long).unwrap(), "\"long_term\"");
        assert_eq!("MEDIUM_TERM".parse::<TimeRange>().unwrap(), TimeRange::Medium);
        assert_eq!(TimeRange::default(), TimeRange::Medium);
    }

    #[test]
    fn paged_result_tolerates_null_links() {
        let page: PagedResult<String> = serde_json::from_str(
            r#"{"items":["a","b"],"total":2,"limit":20,"offset":0,"href":"h","next":null,"previous":null}"#,
        )
        .unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(!page.has_more());
    }

    #[test]
    fn single_page_counts_items() {
        let page = PagedResult::single(vec![1, 2, 3], 10);
        assert_eq!(page.total, 3);
        assert_eq!(page.limit, 10);
        assert_eq!(page.offset, 0);
    }

    #[test]
    fn play_history_parses_timestamp() {
        let page: CursorPage<PlayHistory> = serde_json::from_str(
            r#"{
                "items": [{"track": {"id": "t1", "name": "Song"}, "played_at": "2024-03-01T10:15:00.000Z"}],
                "limit": 1,
                "next": null,
                "cursors": {"after": "1709288100000", "before": "1709288100000"}
            }"#,
        )
        .unwrap();
        assert_eq!(page.items[0].track.id, "t1");
        assert_eq!(page.items[0].played_at.to_rfc3339(), "2024-03-01T10:15:00+00:00");
    }
}
