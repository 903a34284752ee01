//! Portal factory.
//!
//! Picks the portal implementation at runtime: the HTTP portal for real runs,
//! the in-memory portal for tests and `--dry-run`.

use std::sync::Arc;

use super::config::PortalConfig;
use super::repositories::{HttpPortal, LocalPortal};
use super::repository::{FullPortal, PortalError, PortalResult};

/// Portal implementation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalKind {
    /// SkyPortal REST API
    Http,
    /// In-memory portal that logs its writes (`--dry-run`)
    Local,
}

impl PortalKind {
    pub fn for_dry_run(dry_run: bool) -> Self {
        if dry_run {
            Self::Local
        } else {
            Self::Http
        }
    }
}

/// Factory for portal handles.
///
/// # Example
/// ```ignore
/// let config = PortalConfig::from_settings(&PortalSettings::load(None)?, None, None)?;
/// let portal = PortalFactory::create(PortalKind::Http, Some(&config))?;
/// let exists = portal.source_exists("ZTF21abc").await;
/// ```
pub struct PortalFactory;

impl PortalFactory {
    /// Create a portal of the given kind.
    ///
    /// # Errors
    /// `ConfigurationError` when `Http` is requested without a configuration
    /// or with an invalid host.
    pub fn create(
        kind: PortalKind,
        config: Option<&PortalConfig>,
    ) -> PortalResult<Arc<dyn FullPortal>> {
        match kind {
            PortalKind::Http => {
                let config = config.ok_or_else(|| {
                    PortalError::configuration("HTTP portal requires a PortalConfig")
                })?;
                Ok(Self::create_http(config)? as Arc<dyn FullPortal>)
            }
            PortalKind::Local => Ok(Self::create_local()),
        }
    }

    /// Create an HTTP portal with a single pooled client.
    pub fn create_http(config: &PortalConfig) -> PortalResult<Arc<HttpPortal>> {
        Ok(Arc::new(HttpPortal::new(config)?))
    }

    /// Create an empty in-memory portal that logs every write it receives.
    pub fn create_local() -> Arc<dyn FullPortal> {
        Arc::new(LocalPortal::dry_run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portal::config::Token;
    use crate::portal::repository::SourceRepository;

    #[test]
    fn test_dry_run_selects_local() {
        assert_eq!(PortalKind::for_dry_run(true), PortalKind::Local);
        assert_eq!(PortalKind::for_dry_run(false), PortalKind::Http);
    }

    #[test]
    fn test_http_requires_config() {
        let err = PortalFactory::create(PortalKind::Http, None).err().unwrap();
        assert!(matches!(err, PortalError::ConfigurationError { .. }));
    }

    #[test]
    fn test_create_http_with_config() {
        let config = PortalConfig::new("https://fritz.science/", Token::new("t"));
        let portal = PortalFactory::create_http(&config).unwrap();
        assert_eq!(
            portal.endpoint(&["sources"]).unwrap().as_str(),
            "https://fritz.science/api/sources"
        );
    }

    #[tokio::test]
    async fn test_create_local_is_empty() {
        let portal = PortalFactory::create(PortalKind::Local, None).unwrap();
        assert!(!portal.source_exists("anything").await);
    }

    #[test]
    fn test_http_with_invalid_host() {
        let config = PortalConfig::new("not a url", Token::new("t"));
        let err = PortalFactory::create(PortalKind::Http, Some(&config)).err().unwrap();
        assert!(matches!(err, PortalError::ConfigurationError { .. }));
    }
}
