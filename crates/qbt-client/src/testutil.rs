//! Shared test utilities and fixtures.

use serde_json::{Value, json};

use crate::transport::HttpResponse;

pub(crate) const BASE_URL: &str = "http://localhost:8080";

pub(crate) fn ok(body: &str) -> HttpResponse {
    HttpResponse {
        status: 200,
        body: body.to_string(),
        cookies: Vec::new(),
    }
}

pub(crate) fn ok_with_session_cookie() -> HttpResponse {
    HttpResponse {
        status: 200,
        body: "Ok.".to_string(),
        cookies: vec!["SID".to_string()],
    }
}

pub(crate) fn status(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        body: body.to_string(),
        cookies: Vec::new(),
    }
}

pub(crate) fn make_test_torrent(hash: &str, name: &str) -> Value {
    json!({
        "hash": hash,
        "name": name,
        "size": 1_048_576,
        "progress": 0.5,
        "dlspeed": 2048,
        "upspeed": 0,
        "num_seeds": 4,
        "num_leechs": 1,
        "state": "downloading",
        "eta": 90,
        "category": "",
        "tags": "",
        "added_on": 1_700_000_000,
        "completion_on": 0,
    })
}

pub(crate) fn make_test_properties(hash: &str) -> Value {
    json!({
        "hash": hash,
        "save_path": "/downloads/",
        "total_size": 1_048_576,
        "piece_size": 16384,
        "comment": "",
        "seeds_total": 10,
        "peers_total": 2,
    })
}
