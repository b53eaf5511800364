//! Click event model for asynchronous click tracking.

/// An in-memory click event passed from the redirect handler to the
/// background worker via a bounded channel, decoupling the HTTP response
/// from database writes.
///
/// The handler has already resolved the link, so the event carries the
/// link id directly and the worker never repeats the lookup.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub link_id: i64,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

/// Header values longer than this are truncated before queueing.
const MAX_HEADER_LEN: usize = 512;

impl ClickEvent {
    /// Creates a new click event, truncating oversized header values.
    pub fn new(
        link_id: i64,
        ip: Option<String>,
        user_agent: Option<&str>,
        referer: Option<&str>,
    ) -> Self {
        Self {
            link_id,
            ip,
            user_agent: user_agent.map(truncate),
            referer: referer.map(truncate),
        }
    }
}

fn truncate(value: &str) -> String {
    if value.len() <= MAX_HEADER_LEN {
        return value.to_string();
    }

    let mut end = MAX_HEADER_LEN;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_string()
}
