//! Link registry: shortening and resolution.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::{generate_code, is_reserved, validate_custom_alias};
use crate::utils::url_normalizer::normalize_url;
use crate::utils::url_validator::{Blacklist, validate_target_url};

/// Generation attempts before shortening fails with a capacity error.
const MAX_CODE_ATTEMPTS: usize = 10;

/// Result of a shorten call.
#[derive(Debug, Clone)]
pub struct ShortenOutcome {
    pub link: Link,
    /// True when an existing link was reused instead of creating a new one.
    pub existing: bool,
}

/// Service owning the short-code namespace.
///
/// Shortening is idempotent per normalized URL when no alias is requested.
/// Code allocation races are resolved first-committer-wins: the insert is
/// the atomic check, and the loser retries with a fresh candidate.
pub struct LinkService {
    links: Arc<dyn LinkRepository>,
    blacklist: Arc<Blacklist>,
    code_length: usize,
}

impl LinkService {
    pub fn new(links: Arc<dyn LinkRepository>, blacklist: Arc<Blacklist>, code_length: usize) -> Self {
        Self {
            links,
            blacklist,
            code_length,
        }
    }

    /// Creates a short link, or returns the existing one for a repeat URL.
    ///
    /// # Flow
    ///
    /// 1. Validate and normalize the target URL
    /// 2. Without an alias: reuse the active link for this URL if present,
    ///    otherwise allocate a generated code with bounded retries
    /// 3. With an alias: validate it, reuse the alias row if it already maps
    ///    to the same URL, otherwise insert or report a conflict
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] - bad URL, spam rejection, malformed alias
    /// - [`AppError::Conflict`] - alias taken or reserved
    /// - [`AppError::Internal`] - persistence failure or code space exhaustion
    pub async fn shorten(
        &self,
        url: &str,
        custom_alias: Option<&str>,
        created_by: Option<String>,
    ) -> Result<ShortenOutcome, AppError> {
        validate_target_url(url, &self.blacklist)?;

        let normalized = normalize_url(url).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        match custom_alias {
            Some(alias) => self.shorten_with_alias(normalized, alias, created_by).await,
            None => self.shorten_generated(normalized, created_by).await,
        }
    }

    /// Resolves a short code to its link.
    ///
    /// Lookup is case-insensitive. Unknown and deactivated codes produce the
    /// same NotFound so the public path does not leak which links existed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] as described, [`AppError::Internal`]
    /// on database errors.
    pub async fn resolve(&self, code: &str) -> Result<Link, AppError> {
        let folded = code.to_ascii_lowercase();

        self.links
            .find_by_code(&folded)
            .await?
            .filter(|link| link.is_active)
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": folded })))
    }

    /// Constructs the full short URL for a code.
    pub fn short_url(&self, base_url: &str, code: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), code)
    }

    async fn shorten_generated(
        &self,
        normalized: String,
        created_by: Option<String>,
    ) -> Result<ShortenOutcome, AppError> {
        if let Some(existing) = self.links.find_active_by_url(&normalized).await? {
            return Ok(ShortenOutcome {
                link: existing,
                existing: true,
            });
        }

        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_code(self.code_length);

            if is_reserved(&code) {
                continue;
            }

            let new_link = NewLink {
                short_code: code,
                original_url: normalized.clone(),
                created_by: created_by.clone(),
            };

            match self.links.create(new_link).await {
                Ok(link) => return Ok(ShortenOutcome {
                    link,
                    existing: false,
                }),
                // Lost the race for this code; retry with a fresh candidate.
                Err(AppError::Conflict { .. }) => continue,
                Err(e) => return Err(e),
            }
        }

        warn!(
            attempts = MAX_CODE_ATTEMPTS,
            code_length = self.code_length,
            "Short code allocation exhausted; code space may be too small"
        );

        Err(AppError::internal(
            "Failed to allocate a unique short code",
            json!({ "attempts": MAX_CODE_ATTEMPTS, "code_length": self.code_length }),
        ))
    }

    async fn shorten_with_alias(
        &self,
        normalized: String,
        alias: &str,
        created_by: Option<String>,
    ) -> Result<ShortenOutcome, AppError> {
        let folded = validate_custom_alias(alias)?;

        if let Some(existing) = self.links.find_by_code(&folded).await? {
            if existing.is_active && existing.original_url == normalized {
                return Ok(ShortenOutcome {
                    link: existing,
                    existing: true,
                });
            }

            return Err(AppError::conflict(
                "Custom alias already exists",
                json!({ "alias": folded }),
            ));
        }

        let new_link = NewLink {
            short_code: folded.clone(),
            original_url: normalized,
            created_by,
        };

        match self.links.create(new_link).await {
            Ok(link) => Ok(ShortenOutcome {
                link,
                existing: false,
            }),
            // A concurrent request claimed the alias between the lookup and
            // the insert; first committer wins.
            Err(AppError::Conflict { .. }) => Err(AppError::conflict(
                "Custom alias already exists",
                json!({ "alias": folded }),
            )),
            Err(e) => Err(e),
        }
    }
}
