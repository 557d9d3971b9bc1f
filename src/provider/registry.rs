//! Provider registration and lookup.

use tracing::debug;

use crate::error::ConfigError;

use super::{ClaudeProvider, CodexProvider, Provider};

/// Ordered collection of providers. Registration order doubles as the
/// preference order when no provider is named explicitly.
pub struct ProviderRegistry {
    providers: Vec<Box<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Registry with the bundled CLI providers.
    pub fn bundled() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ClaudeProvider::new()));
        registry.register(Box::new(CodexProvider::new()));
        registry
    }

    pub fn register(&mut self, provider: Box<dyn Provider>) {
        debug!(provider = provider.name(), "Registered provider");
        self.providers.push(provider);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Provider> {
        self.providers.iter().map(|p| p.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Look up a provider by name, case-insensitively.
    pub fn get(&self, name: &str) -> Result<&dyn Provider, ConfigError> {
        let wanted = name.to_lowercase();
        self.providers
            .iter()
            .find(|p| p.name() == wanted.as_str())
            .map(|p| p.as_ref())
            .ok_or_else(|| ConfigError::UnknownProvider {
                name: name.to_string(),
                known: self.names().join(", "),
            })
    }

    /// First registered provider whose CLI is actually installed.
    pub async fn default_provider(&self) -> Option<&dyn Provider> {
        for provider in &self.providers {
            if provider.is_available().await {
                debug!(provider = provider.name(), "Selected default provider");
                return Some(provider.as_ref());
            }
        }
        None
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::bundled()
    }
}
