use std::time::Duration;

/// Default base address of the breed identification service.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Route of the photo analysis endpoint, relative to the base address.
pub const ANALYZE_ROUTE: &str = "/api/dog-from-photo";

/// Connection settings for an analysis session.
#[derive(Debug, Clone)]
pub struct BarklensConfig {
    /// Base address of the service, e.g. `http://127.0.0.1:8000`.
    pub base_url: String,
    /// Optional per-request timeout. A timed-out request resolves through
    /// the same failure channel as any other transport error.
    pub request_timeout: Option<Duration>,
}

impl Default for BarklensConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: None,
        }
    }
}

impl BarklensConfig {
    /// Creates a config pointing at the given base address, with no timeout.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: None,
        }
    }

    /// Full URL of the analysis endpoint.
    pub fn analyze_endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), ANALYZE_ROUTE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_and_route() {
        let config = BarklensConfig::with_base_url("http://localhost:9000");
        assert_eq!(
            config.analyze_endpoint(),
            "http://localhost:9000/api/dog-from-photo"
        );
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let config = BarklensConfig::with_base_url("http://localhost:9000/");
        assert_eq!(
            config.analyze_endpoint(),
            "http://localhost:9000/api/dog-from-photo"
        );
    }

    #[test]
    fn default_points_at_local_service() {
        let config = BarklensConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.request_timeout.is_none());
    }
}
