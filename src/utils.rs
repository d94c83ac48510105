use std::{error::Error, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use ureq::{Agent, AgentBuilder, Transport};

pub const USER_AGENT: &str = concat!("locations/", env!("CARGO_PKG_VERSION"));

pub fn progress_style() -> ProgressStyle {
    ProgressStyle::with_template("[{elapsed_precise}] {human_pos}/{human_len} {percent}% ({per_sec})")
        .expect("hardcoded")
}

pub fn progress_bar(len: usize) -> ProgressBar {
    ProgressBar::new(len as u64).with_style(progress_style())
}

pub fn agent(timeout: Duration) -> Agent {
    AgentBuilder::new()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

/// Describes a failed request without its query string, which can carry
/// API keys and export tokens.
pub fn transport_message(e: &Transport) -> String {
    let mut message = e.kind().to_string();
    if let Some(url) = e.url() {
        let port = url.port().map(|x| format!(":{x}")).unwrap_or_default();
        message = format!(
            "{}://{}{port}{}: {message}",
            url.scheme(),
            url.host_str().unwrap_or_default(),
            url.path()
        );
    }
    if let Some(x) = e.message() {
        message = format!("{message}: {x}");
    }
    if let Some(x) = e.source() {
        message = format!("{message}: {x}");
    }
    message
}
