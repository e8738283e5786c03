//! Declarative versioning configuration
//!
//! A [`VersioningConfig`] describes a complete resolution pipeline and can be
//! loaded from JSON alongside the rest of an application's settings:
//!
//! ```json
//! {
//!   "source": { "accept": { "vendor": "vnd.myorg", "suffix": "+json" } },
//!   "supported_versions": ["v1.0.0", "v1.1.0", "v2.0.0"],
//!   "lock_prerelease": true,
//!   "validate": { "allowed": ["v1.1.0", "v2.0.0"] }
//! }
//! ```
//!
//! All checks run in [`VersioningConfig::build`], so a bad configuration is
//! reported at startup rather than on the first request.

use super::layer::VersionLayer;
use super::matcher::{TokenMatcher, TokenSource};
use super::resolver::RangeResolver;
use super::validator::{ValidateVersionLayer, VersionValidator};
use crate::error::ConfigError;
use crate::middleware::{LayerStack, MiddlewareLayer};
use serde::{Deserialize, Serialize};

fn default_version_prefix() -> Option<char> {
    Some('v')
}

/// Allow-list gate applied after resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Versions a request may resolve to
    pub allowed: Vec<String>,
    /// Rejection message; defaults to `Unsupported version requested.`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Configuration of a version resolution pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersioningConfig {
    /// Where the token is read from
    #[serde(default)]
    pub source: TokenSource,

    /// Letter allowed before the numeric part of a token
    #[serde(default = "default_version_prefix")]
    pub version_prefix: Option<char>,

    /// When present, tokens are resolved as ranges against these versions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_versions: Option<Vec<String>>,

    /// Refuse tokens pinning an exact prerelease
    #[serde(default)]
    pub lock_prerelease: bool,

    /// Message for refused prerelease locks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prerelease_message: Option<String>,

    /// Optional allow-list gate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate: Option<ValidationConfig>,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            source: TokenSource::default(),
            version_prefix: default_version_prefix(),
            supported_versions: None,
            lock_prerelease: false,
            prerelease_message: None,
            validate: None,
        }
    }
}

impl VersioningConfig {
    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate the configuration and build the pipeline stages
    pub fn build(&self) -> Result<VersionPipeline, ConfigError> {
        let matcher = TokenMatcher::builder(self.source.clone())
            .ranges(self.supported_versions.is_some())
            .version_prefix(self.version_prefix)
            .build()?;
        let mut resolve = VersionLayer::new(matcher);

        match &self.supported_versions {
            Some(supported) => {
                let mut resolver =
                    RangeResolver::new(supported.iter().cloned())?.lock_prerelease(self.lock_prerelease);
                if let Some(message) = &self.prerelease_message {
                    resolver = resolver.with_prerelease_message(message.clone());
                }
                resolve = resolve.with_resolver(resolver);
            }
            None if self.lock_prerelease => {
                tracing::warn!("lock_prerelease has no effect without supported_versions");
            }
            None => {}
        }

        let validate = match &self.validate {
            Some(config) => {
                let mut validator = VersionValidator::new(config.allowed.iter().cloned())?;
                if let Some(message) = &config.message {
                    validator = validator.with_message(message.clone());
                }
                Some(ValidateVersionLayer::new(validator))
            }
            None => None,
        };

        Ok(VersionPipeline { resolve, validate })
    }
}

/// Built pipeline stages, in execution order
#[derive(Debug, Clone)]
pub struct VersionPipeline {
    resolve: VersionLayer,
    validate: Option<ValidateVersionLayer>,
}

impl VersionPipeline {
    /// The resolution stage
    pub fn resolve_layer(&self) -> &VersionLayer {
        &self.resolve
    }

    /// The validation stage, if configured
    pub fn validate_layer(&self) -> Option<&ValidateVersionLayer> {
        self.validate.as_ref()
    }

    /// Boxed layers, resolution first
    pub fn layers(&self) -> Vec<Box<dyn MiddlewareLayer>> {
        let mut layers: Vec<Box<dyn MiddlewareLayer>> = vec![Box::new(self.resolve.clone())];
        if let Some(validate) = &self.validate {
            layers.push(Box::new(validate.clone()));
        }
        layers
    }

    /// Push the stages onto a layer stack
    pub fn apply(&self, stack: &mut LayerStack) {
        for layer in self.layers() {
            stack.push(layer);
        }
    }
}
