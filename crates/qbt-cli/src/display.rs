//! Rendering of torrents for the terminal.

use std::fmt::Write;

use chrono::{DateTime, Local, Utc};

use qbt_types::Torrent;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Glyph shown in front of a torrent's name.
pub(crate) fn status_glyph(torrent: &Torrent) -> &'static str {
    if torrent.is_downloading() {
        "⬇️ "
    } else if torrent.is_uploading() {
        "⬆️ "
    } else if torrent.is_paused() {
        "⏸️ "
    } else {
        "⏳ "
    }
}

/// Renders one torrent, with the extra lines of the detailed view when `detailed` is set.
pub(crate) fn render_torrent(torrent: &Torrent, detailed: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} [{:.1}%]",
        status_glyph(torrent),
        torrent.name,
        torrent.progress_percent()
    );

    if !detailed {
        return out;
    }

    let _ = writeln!(out, "  Hash: {}", torrent.hash);
    let _ = writeln!(out, "  Size: {}", torrent.size_formatted());
    let _ = writeln!(out, "  State: {}", torrent.state);
    let _ = writeln!(out, "  Download speed: {}", torrent.download_speed_formatted());
    let _ = writeln!(out, "  Upload speed: {}", torrent.upload_speed_formatted());
    let _ = writeln!(out, "  ETA: {}", torrent.eta_formatted());
    let _ = writeln!(out, "  Seeds: {}", torrent.num_seeds);
    let _ = writeln!(out, "  Peers: {}", torrent.num_leechs);
    if !torrent.category.is_empty() {
        let _ = writeln!(out, "  Category: {}", torrent.category);
    }
    if !torrent.tags.is_empty() {
        let _ = writeln!(out, "  Tags: {}", torrent.tags);
    }
    let _ = writeln!(out, "  Added on: {}", local_time(torrent.added_on));
    if let Some(completed) = torrent.completion_on {
        let _ = writeln!(out, "  Completed on: {}", local_time(completed));
    }
    out
}

fn local_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string()
}
