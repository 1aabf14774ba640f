//! Catalog naming policy.

use gift_core::DomainError;

use crate::product::ProductName;

/// Keyword that may not appear in product names without manual approval.
pub const DEFAULT_RESERVED_KEYWORD: &str = "카카오";

/// Business rules applied to product names before they reach the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPolicy {
    reserved_keyword: String,
}

impl CatalogPolicy {
    pub fn new(reserved_keyword: impl Into<String>) -> Self {
        Self {
            reserved_keyword: reserved_keyword.into(),
        }
    }

    pub fn reserved_keyword(&self) -> &str {
        &self.reserved_keyword
    }

    /// Reject names that contain the reserved keyword.
    ///
    /// An empty keyword disables the check.
    pub fn check_name(&self, name: &ProductName) -> Result<(), DomainError> {
        if !self.reserved_keyword.is_empty() && name.contains(&self.reserved_keyword) {
            return Err(DomainError::invariant(format!(
                "product names containing '{}' need approval from the responsible merchandiser",
                self.reserved_keyword
            )));
        }
        Ok(())
    }
}

impl Default for CatalogPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RESERVED_KEYWORD)
    }
}
