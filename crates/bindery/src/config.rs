//! Configuration types for Bindery processing rounds.
//!
//! All types implement [`serde::Deserialize`] with every field defaulted, so
//! an empty TOML document yields the stock configuration.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining markers and resolver settings.
//! - [`Markers`] - The annotation names and deferred wrapper types validation keys on.
//! - [`ResolverConfig`] - Controls the [`BuildVariant`] used for module installation.
//!
//! # Example
//!
//! ```
//! # use bindery::config::AppConfig;
//! # use bindery_validate::BuildVariant;
//! let config = AppConfig::default();
//! assert_eq!(config.resolver().variant(), BuildVariant::Test);
//! ```

use serde::Deserialize;

pub use bindery_validate::{BuildVariant, Markers};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Marker annotation section.
    #[serde(default)]
    markers: Markers,

    /// Resolver section.
    #[serde(default)]
    resolver: ResolverConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(markers: Markers, resolver: ResolverConfig) -> Self {
        Self { markers, resolver }
    }

    /// Returns the marker configuration.
    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    /// Returns the resolver configuration.
    pub fn resolver(&self) -> &ResolverConfig {
        &self.resolver
    }

    /// Override the build variant, keeping everything else.
    pub fn with_variant(mut self, variant: BuildVariant) -> Self {
        self.resolver.variant = variant;
        self
    }
}

/// Module installation settings.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ResolverConfig {
    /// Whether test-only modules take part in resolution.
    #[serde(default)]
    variant: BuildVariant,
}

impl ResolverConfig {
    pub fn new(variant: BuildVariant) -> Self {
        Self { variant }
    }

    pub fn variant(&self) -> BuildVariant {
        self.variant
    }
}
