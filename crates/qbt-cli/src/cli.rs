use clap::{Parser, ValueEnum};

use qbt_types::{ListOptions, TorrentFilter};

/// Top-level CLI struct for the binary.
#[derive(Debug, Parser)]
#[command(name = "qbt", version, about = "qBittorrent Web API client", long_about = None)]
pub(crate) struct Cli {
    /// qBittorrent WebUI URL. Falls back to the cached URL, then http://localhost:8080.
    #[arg(long, env = "QBT_URL")]
    pub url: Option<String>,

    /// qBittorrent WebUI username.
    #[arg(long, env = "QBT_USERNAME")]
    pub username: Option<String>,

    /// qBittorrent WebUI password (will prompt if not provided).
    #[arg(long, env = "QBT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Cache credentials for future use.
    #[arg(long, default_value_t = false)]
    pub cache_credentials: bool,

    /// Clear cached credentials and exit.
    #[arg(long, default_value_t = false)]
    pub clear_cached_credentials: bool,

    /// Filter torrents by status.
    #[arg(long, value_enum, default_value_t = CliFilter::All)]
    pub filter: CliFilter,

    /// Sort torrents by field.
    #[arg(long)]
    pub sort: Option<String>,

    /// Reverse sort order.
    #[arg(long, default_value_t = false)]
    pub reverse: bool,

    /// Limit number of torrents to show.
    #[arg(long)]
    pub limit: Option<u32>,

    /// Filter by category.
    #[arg(long)]
    pub category: Option<String>,

    /// Filter by tag.
    #[arg(long)]
    pub tag: Option<String>,

    /// Show detailed information for each torrent.
    #[arg(long, default_value_t = false)]
    pub detailed: bool,

    /// Enable verbose output.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Cli {
    /// Collects the list options given on the command line.
    pub(crate) fn list_options(&self) -> ListOptions {
        ListOptions {
            sort: self.sort.clone(),
            reverse: self.reverse,
            limit: self.limit,
            category: self.category.clone(),
            tag: self.tag.clone(),
            extra: Vec::new(),
        }
    }
}

/// CLI representation of [`TorrentFilter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum CliFilter {
    #[default]
    All,
    Downloading,
    Seeding,
    Completed,
    Paused,
    Active,
    Inactive,
}

impl From<CliFilter> for TorrentFilter {
    fn from(cli: CliFilter) -> Self {
        match cli {
            CliFilter::All => Self::All,
            CliFilter::Downloading => Self::Downloading,
            CliFilter::Seeding => Self::Seeding,
            CliFilter::Completed => Self::Completed,
            CliFilter::Paused => Self::Paused,
            CliFilter::Active => Self::Active,
            CliFilter::Inactive => Self::Inactive,
        }
    }
}
