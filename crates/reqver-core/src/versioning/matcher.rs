//! Version token extraction
//!
//! A [`TokenMatcher`] pulls the raw version token out of either the request
//! path (`/api/v1.2/users`) or a content-negotiation header
//! (`Accept: application/vnd.myorg.v1.2+json`). The pattern is compiled once
//! from escaped literal fragments when the matcher is built.
//!
//! Accepted token grammar: an optional `^`/`~` (only when ranges are
//! enabled), an optional version-prefix letter, one to three dot-separated
//! numeric groups, then anything up to the next `/` (path) or the header
//! suffix. The trailing part carries prerelease/build metadata and hyphen
//! ranges such as `v1 - v2`.

use crate::error::ConfigError;
use crate::request::Request;
use http::HeaderName;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::ops::Range;

fn default_prefix() -> String {
    "/".to_string()
}

fn default_separator() -> String {
    ".".to_string()
}

fn default_suffix() -> String {
    "+json".to_string()
}

fn default_header() -> String {
    "accept".to_string()
}

/// Where the version token is read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSource {
    /// Token follows a fixed path prefix, e.g. `/api/` in `/api/v1/users`
    Path {
        /// Must end with `/`. Default `/`.
        #[serde(default = "default_prefix")]
        prefix: String,
    },

    /// Token is embedded in the `Accept` header media type
    ///
    /// Shape: `application/<vendor><separator><token><suffix>`
    Accept {
        vendor: String,
        #[serde(default = "default_separator")]
        separator: String,
        #[serde(default = "default_suffix")]
        suffix: String,
    },

    /// Same shape as [`TokenSource::Accept`], read from an arbitrary header
    Header {
        #[serde(default = "default_header")]
        name: String,
        vendor: String,
        #[serde(default = "default_separator")]
        separator: String,
        #[serde(default = "default_suffix")]
        suffix: String,
    },
}

impl TokenSource {
    /// Path source with the given prefix
    pub fn path(prefix: impl Into<String>) -> Self {
        Self::Path {
            prefix: prefix.into(),
        }
    }

    /// Accept header source with the default `.` separator and `+json` suffix
    pub fn accept(vendor: impl Into<String>) -> Self {
        Self::Accept {
            vendor: vendor.into(),
            separator: default_separator(),
            suffix: default_suffix(),
        }
    }

    /// Accept header source with explicit framing
    pub fn accept_with(
        vendor: impl Into<String>,
        separator: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        Self::Accept {
            vendor: vendor.into(),
            separator: separator.into(),
            suffix: suffix.into(),
        }
    }

    /// Arbitrary header source with explicit framing
    pub fn header(
        name: impl Into<String>,
        vendor: impl Into<String>,
        separator: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        Self::Header {
            name: name.into(),
            vendor: vendor.into(),
            separator: separator.into(),
            suffix: suffix.into(),
        }
    }
}

impl Default for TokenSource {
    fn default() -> Self {
        Self::path(default_prefix())
    }
}

/// A matched version token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMatch {
    /// The token, verbatim
    pub token: String,
    /// Byte span of the token within the matched input
    ///
    /// For path sources the input is the percent-decoded path.
    pub span: Range<usize>,
}

#[derive(Debug, Clone)]
enum Target {
    Path,
    Header(HeaderName),
}

/// Builder for [`TokenMatcher`]
#[derive(Debug, Clone)]
pub struct TokenMatcherBuilder {
    source: TokenSource,
    ranges: bool,
    version_prefix: Option<char>,
}

impl TokenMatcherBuilder {
    /// Accept a leading `^` or `~` range operator. Off by default.
    pub fn ranges(mut self, enabled: bool) -> Self {
        self.ranges = enabled;
        self
    }

    /// Optional letter allowed before the numeric part. Default `v`.
    pub fn version_prefix(mut self, prefix: Option<char>) -> Self {
        self.version_prefix = prefix;
        self
    }

    /// Validate the source and compile the pattern
    pub fn build(self) -> Result<TokenMatcher, ConfigError> {
        let mut token = String::from("(?P<token>");
        if self.ranges {
            token.push_str("[~^]?");
        }
        if let Some(letter) = self.version_prefix {
            token.push_str(&format!("(?:{})?", regex::escape(&letter.to_string())));
        }
        token.push_str(r"[0-9]+(?:\.[0-9]+){0,2}[^/]*)");

        let (target, pattern) = match &self.source {
            TokenSource::Path { prefix } => {
                if !prefix.ends_with('/') {
                    return Err(ConfigError::InvalidPathPrefix(prefix.clone()));
                }
                (Target::Path, format!("^{}{}", regex::escape(prefix), token))
            }
            TokenSource::Accept {
                vendor,
                separator,
                suffix,
            } => (
                Target::Header(http::header::ACCEPT),
                header_pattern(vendor, separator, suffix, &token)?,
            ),
            TokenSource::Header {
                name,
                vendor,
                separator,
                suffix,
            } => {
                let name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|_| ConfigError::InvalidHeaderName(name.clone()))?;
                (
                    Target::Header(name),
                    header_pattern(vendor, separator, suffix, &token)?,
                )
            }
        };

        let pattern = Regex::new(&pattern).map_err(|e| ConfigError::Pattern(e.to_string()))?;

        Ok(TokenMatcher {
            source: self.source,
            target,
            ranges: self.ranges,
            pattern,
        })
    }
}

fn header_pattern(
    vendor: &str,
    separator: &str,
    suffix: &str,
    token: &str,
) -> Result<String, ConfigError> {
    if vendor.is_empty() {
        return Err(ConfigError::MissingVendorPrefix);
    }
    Ok(format!(
        "application/{}{}{}{}",
        regex::escape(vendor),
        regex::escape(separator),
        token,
        regex::escape(suffix)
    ))
}

/// Extracts a raw version token from a path or header value
///
/// Matching is a pure function of the input and the matcher; a matcher is
/// built once and shared across requests.
#[derive(Debug, Clone)]
pub struct TokenMatcher {
    source: TokenSource,
    target: Target,
    ranges: bool,
    pattern: Regex,
}

impl TokenMatcher {
    /// Start building a matcher for `source`
    pub fn builder(source: TokenSource) -> TokenMatcherBuilder {
        TokenMatcherBuilder {
            source,
            ranges: false,
            version_prefix: Some('v'),
        }
    }

    /// Literal path matcher (no range operators)
    pub fn path(prefix: impl Into<String>) -> Result<Self, ConfigError> {
        Self::builder(TokenSource::path(prefix)).build()
    }

    /// Literal Accept header matcher (no range operators)
    pub fn accept(
        vendor: impl Into<String>,
        separator: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Self::builder(TokenSource::accept_with(vendor, separator, suffix)).build()
    }

    /// The source this matcher reads from
    pub fn source(&self) -> &TokenSource {
        &self.source
    }

    /// Whether a leading `^`/`~` is accepted
    pub fn allows_ranges(&self) -> bool {
        self.ranges
    }

    /// Match against a raw URL path
    ///
    /// The path is percent-decoded first so that an encoded `^` (`%5E`) or
    /// space is recovered before matching.
    pub fn match_path(&self, path: &str) -> Option<TokenMatch> {
        let decoded = match urlencoding::decode(path) {
            Ok(decoded) => decoded,
            Err(err) => {
                tracing::trace!(path = %path, error = %err, "path is not valid UTF-8 once decoded");
                Cow::Borrowed(path)
            }
        };
        self.find(&decoded)
    }

    /// Match against a header value
    pub fn match_header(&self, value: &str) -> Option<TokenMatch> {
        self.find(value)
    }

    /// Extract the token from a request according to the configured source
    ///
    /// A missing header is not an error; it simply yields no match.
    pub fn extract(&self, req: &Request) -> Option<TokenMatch> {
        match &self.target {
            Target::Path => self.match_path(req.path()),
            Target::Header(name) => {
                let value = req.headers().get(name)?.to_str().ok()?;
                self.match_header(value)
            }
        }
    }

    fn find(&self, haystack: &str) -> Option<TokenMatch> {
        let token = self.pattern.captures(haystack)?.name("token")?;
        Some(TokenMatch {
            token: token.as_str().to_string(),
            span: token.range(),
        })
    }
}
