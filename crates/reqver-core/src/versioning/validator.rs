//! Allow-list validation of the resolved version

use super::context::VersionContext;
use crate::error::{ApiError, ConfigError};
use crate::middleware::{BoxFuture, BoxedNext, MiddlewareLayer};
use crate::request::Request;
use crate::response::IntoResponse;
use std::collections::HashSet;
use std::sync::Arc;

/// Default rejection message
pub const DEFAULT_UNSUPPORTED_MESSAGE: &str = "Unsupported version requested.";

/// Confirms that a request resolved to an allowed version
#[derive(Debug, Clone)]
pub struct VersionValidator {
    allowed: HashSet<String>,
    message: String,
}

impl VersionValidator {
    /// Create a validator for the given allow-list
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoSupportedVersions`] if `allowed` is empty.
    pub fn new<I, S>(allowed: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: HashSet<String> = allowed.into_iter().map(Into::into).collect();
        if allowed.is_empty() {
            return Err(ConfigError::NoSupportedVersions);
        }
        Ok(Self {
            allowed,
            message: DEFAULT_UNSUPPORTED_MESSAGE.to_string(),
        })
    }

    /// Override the rejection message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Check a request's version context
    ///
    /// Fails with a 400 unless a version was resolved and is allowed.
    pub fn validate(&self, context: Option<&VersionContext>) -> Result<(), ApiError> {
        match context.and_then(VersionContext::version) {
            Some(version) if self.allowed.contains(version) => Ok(()),
            version => Err(ApiError::bad_request(self.message.clone())
                .with_internal(format!("resolved version {version:?}"))),
        }
    }
}

/// Middleware that rejects requests whose version is not allowed
#[derive(Debug, Clone)]
pub struct ValidateVersionLayer {
    validator: Arc<VersionValidator>,
}

impl ValidateVersionLayer {
    /// Wrap a validator as a layer
    pub fn new(validator: VersionValidator) -> Self {
        Self {
            validator: Arc::new(validator),
        }
    }

    /// Shorthand for a validator over `allowed` with the default message
    pub fn allowing<I, S>(allowed: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::new(VersionValidator::new(allowed)?))
    }
}

impl MiddlewareLayer for ValidateVersionLayer {
    fn call(&self, req: Request, next: BoxedNext) -> BoxFuture {
        if let Err(err) = self.validator.validate(req.version_context()) {
            tracing::debug!(
                status = err.status.as_u16(),
                version = ?req.api_version(),
                "rejecting unsupported version"
            );
            return Box::pin(async move { err.into_response() });
        }
        next(req)
    }

    fn clone_box(&self) -> Box<dyn MiddlewareLayer> {
        Box::new(self.clone())
    }
}
