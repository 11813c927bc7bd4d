//! Traffic logging for Bynder API calls
//!
//! Appends request and response summaries to bynder.log. Response bodies are
//! truncated so asset descriptions do not end up in logs wholesale.

use config::PathManager;
use std::io::Write;

/// Maximum characters to log for response bodies
const MAX_CONTENT_LOG_CHARS: usize = 200;

/// Truncate a string for logging, adding ellipsis if truncated
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... ({} chars total)", &s[..end], s.len())
}

/// Log an outgoing API request (path only, never the signed header)
pub fn log_request(method: &str, path: &str) {
    log_traffic("REQUEST", &format!("{} {}", method, path));
}

pub fn log_response(status: u16, body: &str) {
    log_traffic(
        "RESPONSE",
        &format!("[{}] {}", status, truncate_for_log(body, MAX_CONTENT_LOG_CHARS)),
    );
}

pub fn log_error(error: &str) {
    log_traffic("ERROR", error);
}

fn log_traffic(event_type: &str, message: &str) {
    if let Some(log_path) = PathManager::log_file_path() {
        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Ok(mut file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
        {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            let _ = writeln!(file, "[{}] [TRAFFIC] [BYNDER] [{}] {}", timestamp, event_type, message);
        }
    }
}
