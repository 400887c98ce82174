//! # qBittorrent Web API types
//!
//! This crate defines the types shared by the qBittorrent client and CLI: the error type,
//! the list filters, and the [`Torrent`] view with its display helpers. Nothing in here
//! touches the network or the disk.

mod error;
mod filter;
mod format;
mod torrent;

pub use error::{ApiError, ErrorDetail, Result};
pub use filter::{ListOptions, ParseFilterError, TorrentFilter};
pub use format::{INFINITE_ETA_SECS, INFINITY_MARKER, format_eta, format_size, format_speed};
pub use torrent::{RawProperties, RawTorrent, Rename, Torrent};
