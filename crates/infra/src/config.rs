//! Database connection settings.

/// Which store backs the catalog, derived from the connection URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    InMemory,
    Sqlite,
    Postgres,
}

/// Connection settings for the product store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// `postgres://…`, `sqlite:…`, or `None` for the in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

    pub fn in_memory() -> Self {
        Self {
            url: None,
            max_connections: Self::DEFAULT_MAX_CONNECTIONS,
        }
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            max_connections: Self::DEFAULT_MAX_CONNECTIONS,
        }
    }

    pub fn kind(&self) -> Result<StoreKind, UnsupportedUrl> {
        let Some(url) = self.url.as_deref() else {
            return Ok(StoreKind::InMemory);
        };
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(StoreKind::Postgres)
        } else if url.starts_with("sqlite:") {
            Ok(StoreKind::Sqlite)
        } else {
            Err(UnsupportedUrl(redact(url)))
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported database url scheme: {0}")]
pub struct UnsupportedUrl(String);

/// Strip everything after the scheme so credentials never reach logs.
fn redact(url: &str) -> String {
    match url.split_once(':') {
        Some((scheme, _)) => format!("{scheme}:…"),
        None => "<no scheme>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_url_scheme() {
        assert_eq!(DatabaseConfig::in_memory().kind().unwrap(), StoreKind::InMemory);
        assert_eq!(
            DatabaseConfig::with_url("postgres://u:p@localhost/gift").kind().unwrap(),
            StoreKind::Postgres
        );
        assert_eq!(
            DatabaseConfig::with_url("postgresql://localhost/gift").kind().unwrap(),
            StoreKind::Postgres
        );
        assert_eq!(
            DatabaseConfig::with_url("sqlite::memory:").kind().unwrap(),
            StoreKind::Sqlite
        );
    }

    #[test]
    fn unsupported_scheme_does_not_leak_credentials() {
        let err = DatabaseConfig::with_url("mysql://root:secret@db/gift")
            .kind()
            .unwrap_err();
        assert!(!err.to_string().contains("secret"));
        assert!(err.to_string().contains("mysql"));
    }
}
