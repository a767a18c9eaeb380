//! Click event model for asynchronous click tracking.

/// A pending click-count increment for one short code.
///
/// Produced by [`crate::application::services::LinkService::resolve`] and
/// consumed by [`crate::domain::click_worker::run_click_workers`]. Sending it
/// over the bounded queue decouples the redirect response from the store write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub code: String,
}

impl ClickEvent {
    /// Creates a click event for `code`.
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_event_creation() {
        let event = ClickEvent::new("abc123");
        assert_eq!(event.code, "abc123");
    }

    #[test]
    fn test_click_event_clone() {
        let event = ClickEvent::new(String::from("code1"));
        assert_eq!(event.clone(), event);
    }
}
