//! Link creation, resolution, moderation, and deletion.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::{info, warn};

use crate::application::services::ValidationService;
use crate::domain::entities::{
    NewRotationDestination, NewShortLink, RotationType, ShortLink, ValidationResult,
};
use crate::domain::repositories::{DetachOutcome, LinkRepository, RotationRepository};
use crate::error::AppError;
use crate::infrastructure::cache::LinkCache;
use crate::utils::code_generator::{CODE_LENGTH, WIDENED_CODE_LENGTH, generate_code};
use crate::utils::hashing::hash_url;
use crate::utils::password::hash_password;
use crate::utils::url_normalizer::normalize_url;

/// Collision retries at each code length before widening or giving up.
const MAX_ATTEMPTS_PER_LENGTH: usize = 5;

/// Input for creating a short link.
#[derive(Debug, Clone)]
pub struct CreateLinkInput {
    pub url: String,
    pub password: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub rotation_type: Option<RotationType>,
    pub destinations: Vec<NewRotationDestination>,
    /// Trusted integrations may skip the scanner chain.
    pub bypass_security: bool,
}

/// Result of a creation request.
#[derive(Debug, Clone)]
pub struct CreatedLink {
    pub link: ShortLink,
    /// False when dedup returned an existing link.
    pub is_new: bool,
    pub validation: Option<ValidationResult>,
}

/// Core shortener: normalization, threat validation, dedup, code generation,
/// lazy expiry, flagging, and reference-counted deletion.
pub struct ShortenerService {
    links: Arc<dyn LinkRepository>,
    rotations: Arc<dyn RotationRepository>,
    cache: Arc<dyn LinkCache>,
    validation: Arc<ValidationService>,
    non_auth_expiry_days: i64,
}

impl ShortenerService {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        rotations: Arc<dyn RotationRepository>,
        cache: Arc<dyn LinkCache>,
        validation: Arc<ValidationService>,
        non_auth_expiry_days: i64,
    ) -> Self {
        Self {
            links,
            rotations,
            cache,
            validation,
            non_auth_expiry_days,
        }
    }

    /// Creates a short link, or attaches the account to an existing one when
    /// the destination deduplicates.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for malformed URLs or rejected rotation sets
    /// - [`AppError::Forbidden`] when the scanner chain rejects the URL
    /// - [`AppError::Internal`] on code-generation exhaustion
    pub async fn create(
        &self,
        account_id: Option<&str>,
        input: CreateLinkInput,
    ) -> Result<CreatedLink, AppError> {
        let normalized = normalize_url(&input.url).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        let is_rotation = !input.destinations.is_empty();
        if is_rotation && input.rotation_type.is_none() {
            return Err(AppError::bad_request(
                "Rotation links require a rotation type",
                json!({}),
            ));
        }
        if !is_rotation && input.rotation_type.is_some() {
            return Err(AppError::bad_request(
                "Rotation type given without destinations",
                json!({}),
            ));
        }

        let mut normalized_destinations = Vec::with_capacity(input.destinations.len());
        for destination in input.destinations {
            let url = normalize_url(&destination.destination).map_err(|e| {
                AppError::bad_request(
                    "Invalid rotation destination",
                    json!({ "destination": destination.destination, "reason": e.to_string() }),
                )
            })?;
            if destination.weight < 1 {
                return Err(AppError::bad_request(
                    "Rotation weights must be positive",
                    json!({ "destination": url }),
                ));
            }
            normalized_destinations.push(NewRotationDestination {
                destination: url,
                weight: destination.weight,
                label: destination.label,
            });
        }

        let validation = if input.bypass_security {
            None
        } else {
            let result = self.validation.validate(&normalized).await?;
            if !result.is_safe {
                return Err(AppError::forbidden(
                    "URL failed security validation",
                    json!({
                        "reason": result.reason,
                        "scans": result.scans.len(),
                    }),
                ));
            }
            Some(result)
        };

        let content_hash = hash_url(&normalized);

        // Dedup applies to plain links only; rotation sets are never
        // collapsed onto an existing code.
        if !is_rotation {
            if let Some(existing) = self.links.find_active_by_hash(&content_hash).await? {
                if !existing.is_expired() && !existing.is_rotation {
                    if let Some(account_id) = account_id {
                        self.links.attach_owner(account_id, existing.id).await?;
                    }
                    return Ok(CreatedLink {
                        link: existing,
                        is_new: false,
                        validation,
                    });
                }
            }
        }

        let password_hash = match input.password.as_deref() {
            Some(password) => Some(hash_password(password).map_err(|e| {
                AppError::internal("Failed to hash password", json!({ "reason": e.to_string() }))
            })?),
            None => None,
        };

        // Anonymous links always expire.
        let expires_at = match account_id {
            Some(_) => input.expires_at,
            None => Some(Utc::now() + Duration::days(self.non_auth_expiry_days)),
        };

        let link = self
            .create_with_unique_code(NewShortLink {
                short_code: String::new(),
                original_url: normalized,
                content_hash,
                expires_at,
                password_hash,
                is_rotation,
                rotation_type: input.rotation_type,
            })
            .await?;

        if is_rotation {
            self.rotations
                .create_many(link.id, normalized_destinations)
                .await?;
        }

        if let Some(account_id) = account_id {
            self.links.attach_owner(account_id, link.id).await?;
        }

        info!(short_code = %link.short_code, is_rotation, "short link created");
        Ok(CreatedLink {
            link,
            is_new: true,
            validation,
        })
    }

    /// Resolves a short code for redirecting: cache first, persistence on a
    /// miss (writing the cache back), lazy expiry on read.
    ///
    /// Returns `None` for absent, inactive, flagged, or expired links.
    pub async fn resolve(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        if let Ok(Some(cached)) = self.cache.get(code).await {
            if cached.is_resolvable() {
                return Ok(Some(cached));
            }
            // Stale cached state; fall through to persistence for the truth.
        }

        let Some(link) = self.links.find_by_code(code).await? else {
            return Ok(None);
        };

        if link.is_expired() && link.is_active {
            self.links.deactivate(link.id).await?;
            self.invalidate(code).await?;
            return Ok(None);
        }

        if !link.is_resolvable() {
            return Ok(None);
        }

        if let Err(e) = self.cache.set(code, &link).await {
            warn!(%code, error = %e, "cache write-back failed");
        }
        Ok(Some(link))
    }

    /// Looks a link up by code without lifecycle filtering (owner and admin
    /// views).
    pub async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        self.links.find_by_code(code).await
    }

    /// Flags a link and synchronously invalidates its cache entry.
    pub async fn flag(&self, link: &ShortLink, reason: &str) -> Result<(), AppError> {
        if !self.links.flag(link.id, reason).await? {
            return Err(AppError::not_found(
                "Short link not found",
                json!({ "id": link.id }),
            ));
        }
        self.invalidate(&link.short_code).await?;
        info!(short_code = %link.short_code, reason, "link flagged");
        Ok(())
    }

    /// Clears a flag (admin moderation reversal) and invalidates the cache.
    pub async fn unflag(&self, link: &ShortLink) -> Result<(), AppError> {
        if !self.links.unflag(link.id).await? {
            return Err(AppError::not_found(
                "Short link not found",
                json!({ "id": link.id }),
            ));
        }
        self.invalidate(&link.short_code).await?;
        Ok(())
    }

    /// Detaches an owner; destroys the link when the last owner leaves.
    pub async fn detach(
        &self,
        account_id: &str,
        link: &ShortLink,
    ) -> Result<DetachOutcome, AppError> {
        let outcome = self.links.detach_owner(account_id, link.id).await?;
        if outcome == DetachOutcome::Deleted {
            self.invalidate(&link.short_code).await?;
        }
        Ok(outcome)
    }

    /// Destroys a link regardless of remaining owners (admin force-delete).
    pub async fn force_delete(&self, link: &ShortLink) -> Result<(), AppError> {
        if !self.links.force_delete(link.id).await? {
            return Err(AppError::not_found(
                "Short link not found",
                json!({ "id": link.id }),
            ));
        }
        self.invalidate(&link.short_code).await?;
        Ok(())
    }

    pub async fn list_for_account(&self, account_id: &str) -> Result<Vec<ShortLink>, AppError> {
        self.links.list_for_account(account_id).await
    }

    pub async fn is_owner(&self, account_id: &str, link_id: i64) -> Result<bool, AppError> {
        self.links.is_owner(account_id, link_id).await
    }

    /// Periodic sweep deactivating expired rows; correctness does not depend
    /// on it, listings do.
    pub async fn sweep_expired(&self) -> Result<u64, AppError> {
        self.links.deactivate_expired().await
    }

    async fn invalidate(&self, code: &str) -> Result<(), AppError> {
        self.cache.invalidate(code).await.map_err(|e| {
            AppError::internal(
                "Cache invalidation failed",
                json!({ "reason": e.to_string() }),
            )
        })
    }

    /// Generates codes until one inserts cleanly, widening after bounded
    /// retries. A duplicate-code race surfaces as a conflict and counts as a
    /// collision.
    async fn create_with_unique_code(&self, template: NewShortLink) -> Result<ShortLink, AppError> {
        for length in [CODE_LENGTH, WIDENED_CODE_LENGTH] {
            for _ in 0..MAX_ATTEMPTS_PER_LENGTH {
                let code = generate_code(length);
                if self.links.find_by_code(&code).await?.is_some() {
                    continue;
                }

                let mut new_link = template.clone();
                new_link.short_code = code;
                match self.links.create(new_link).await {
                    Ok(link) => return Ok(link),
                    // Benign race: someone inserted this code between the
                    // pre-check and the insert.
                    Err(AppError::Conflict { .. }) => continue,
                    Err(e) => return Err(e),
                }
            }
        }

        Err(AppError::internal(
            "Failed to generate unique code",
            json!({ "reason": "Too many collisions" }),
        ))
    }
}
