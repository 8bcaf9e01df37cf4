//! Seeded page content.
//!
//! The index document is rendered from a content template at synthesis
//! time. A template has exactly one substitution point, `{{ timestamp }}`,
//! so the rendered time can always be read back with
//! [`Template::extract`]. The only impure input is the current time, read
//! through a [`Clock`].

use std::{
    collections::HashMap,
    time::{SystemTime, UNIX_EPOCH},
};

use log::debug;

use sitestack_core::template::Template;

use crate::SitestackError;

/// Template used when the configuration does not provide one.
pub const DEFAULT_TEMPLATE: &str =
    "<html><head></head><body><h1>Hello DevOps {{ timestamp }}</h1></body></html>";

/// The one placeholder of a content template.
pub const PLACEHOLDERS: &[&str] = &["timestamp"];

/// Content type of the seeded index document.
pub const CONTENT_TYPE: &str = "text/html";

/// Source of the current time.
pub trait Clock {
    /// Seconds since the Unix epoch.
    fn now(&self) -> u64;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default()
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0
    }
}

/// Render the index document at time `timestamp`, in seconds since the
/// Unix epoch.
///
/// # Errors
///
/// Returns [`SitestackError::InvalidConfiguration`] if the template uses a
/// placeholder other than `timestamp`.
pub fn render(template: &Template, timestamp: u64) -> Result<String, SitestackError> {
    let bindings = HashMap::from([("timestamp", timestamp.to_string())]);

    let content = template
        .render(&bindings)
        .map_err(|err| SitestackError::InvalidConfiguration(err.to_string()))?;

    debug!(timestamp, bytes = content.len(); "Rendered index document");
    Ok(content)
}

#[cfg(test)]
mod tests {
    use sitestack_core::template::TemplatePart;

    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_render_default_template() {
        let params = AppConfig::default()
            .with_bucket("demo-bucket")
            .validate()
            .unwrap();

        let content = render(params.template(), 1_700_000_000).unwrap();
        assert_eq!(
            content,
            "<html><head></head><body><h1>Hello DevOps 1700000000</h1></body></html>"
        );
    }

    #[test]
    fn test_custom_template_round_trip() {
        let params = AppConfig::default()
            .with_bucket("demo-bucket")
            .with_template("<script>const u = `${location.host}`;</script><p>{{ timestamp }}</p>")
            .validate()
            .unwrap();

        let content = render(params.template(), 42).unwrap();
        assert_eq!(
            content,
            "<script>const u = `${location.host}`;</script><p>42</p>"
        );
        let bindings = params.template().extract(&content).unwrap();
        assert_eq!(bindings["timestamp"], "42");
    }

    #[test]
    fn test_unbound_placeholder_is_invalid() {
        let template = Template::new([TemplatePart::Placeholder("bucket".to_string())]);

        assert!(matches!(
            render(&template, 0),
            Err(SitestackError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_clocks() {
        assert_eq!(FixedClock(42).now(), 42);
        assert!(SystemClock.now() > 1_600_000_000);
    }
}
