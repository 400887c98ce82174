//! Server-side filters and query options for `torrents/info`.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Named server-side predicate narrowing the torrent list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TorrentFilter {
    /// Every torrent.
    #[default]
    All,
    /// Torrents still downloading.
    Downloading,
    /// Torrents seeding.
    Seeding,
    /// Completed torrents.
    Completed,
    /// Paused torrents.
    Paused,
    /// Torrents with transfer activity.
    Active,
    /// Torrents without transfer activity.
    Inactive,
}

impl TorrentFilter {
    /// Every filter, in declaration order.
    pub const ALL: [TorrentFilter; 7] = [
        Self::All,
        Self::Downloading,
        Self::Seeding,
        Self::Completed,
        Self::Paused,
        Self::Active,
        Self::Inactive,
    ];

    /// The value sent as the `filter` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Downloading => "downloading",
            Self::Seeding => "seeding",
            Self::Completed => "completed",
            Self::Paused => "paused",
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for TorrentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a [`TorrentFilter`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown torrent filter: {0}")]
pub struct ParseFilterError(pub String);

impl FromStr for TorrentFilter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|filter| filter.as_str() == s)
            .ok_or_else(|| ParseFilterError(s.to_string()))
    }
}

/// Optional parameters for listing torrents.
///
/// The recognised options map one-to-one onto the daemon's query parameters. Pairs added
/// with [`ListOptions::extra`] are passed through verbatim and are not validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Field to sort by, e.g. `name` or `added_on`.
    pub sort: Option<String>,
    /// Reverse the sort order.
    pub reverse: bool,
    /// Maximum number of torrents to return.
    pub limit: Option<u32>,
    /// Only torrents in this category.
    pub category: Option<String>,
    /// Only torrents with this tag.
    pub tag: Option<String>,
    /// Additional raw query parameters.
    pub extra: Vec<(String, String)>,
}

impl ListOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sort field.
    pub fn sort(mut self, field: impl Into<String>) -> Self {
        self.sort = Some(field.into());
        self
    }

    /// Sets the reverse flag.
    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Sets the result limit.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the category filter.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the tag filter.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Appends an unvalidated query parameter.
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }

    /// Builds the query string pairs for `torrents/info`, starting with `filter`.
    pub fn to_query(&self, filter: TorrentFilter) -> Vec<(String, String)> {
        let mut query = vec![("filter".to_string(), filter.as_str().to_string())];
        if let Some(sort) = &self.sort {
            query.push(("sort".to_string(), sort.clone()));
        }
        if self.reverse {
            query.push(("reverse".to_string(), "true".to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(category) = &self.category {
            query.push(("category".to_string(), category.clone()));
        }
        if let Some(tag) = &self.tag {
            query.push(("tag".to_string(), tag.clone()));
        }
        query.extend(self.extra.iter().cloned());
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn filter_parses_wire_names() {
        for filter in TorrentFilter::ALL {
            assert_eq!(filter.as_str().parse::<TorrentFilter>(), Ok(filter));
        }
        assert_eq!(
            "stalled".parse::<TorrentFilter>(),
            Err(ParseFilterError("stalled".to_string()))
        );
    }

    #[test]
    fn default_query_is_filter_only() {
        let query = ListOptions::new().to_query(TorrentFilter::All);
        assert_eq!(query, vec![pair("filter", "all")]);
    }

    #[test]
    fn query_carries_every_option() {
        let options = ListOptions::new()
            .sort("added_on")
            .reverse(true)
            .limit(5)
            .category("linux")
            .tag("iso")
            .extra("offset", "10");

        assert_eq!(
            options.to_query(TorrentFilter::Seeding),
            vec![
                pair("filter", "seeding"),
                pair("sort", "added_on"),
                pair("reverse", "true"),
                pair("limit", "5"),
                pair("category", "linux"),
                pair("tag", "iso"),
                pair("offset", "10"),
            ]
        );
    }

    #[test]
    fn reverse_false_is_omitted() {
        let query = ListOptions::new()
            .reverse(false)
            .to_query(TorrentFilter::Paused);
        assert_eq!(query, vec![pair("filter", "paused")]);
    }
}
