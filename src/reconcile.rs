//! Reconciler - links inspector documents to identity accounts
//!
//! The reconcile operation is idempotent: running it twice for the same
//! inspector, or against an email that already has an account, converges on
//! the same `uid` instead of erroring. Per-record failures are contained so
//! batch and watch drivers keep going after one bad record.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::db::schemas::{InspectorDoc, UserProfileDoc};
use crate::identity::{IdentityProvider, ProviderError};
use crate::types::Result;

/// Store operations on the inspectors collection
#[async_trait::async_trait]
pub trait InspectorStore: Send + Sync {
    /// Fetch an inspector document by id
    async fn fetch(&self, id: &str) -> Result<Option<InspectorDoc>>;

    /// Write the linked account id into the inspector document ($set only)
    async fn link_uid(&self, id: &str, uid: &str) -> Result<()>;

    /// List inspector documents whose uid is absent, null, or empty
    async fn list_unlinked(&self) -> Result<Vec<InspectorDoc>>;
}

/// Store operations on the users collection
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// Merge a profile document at key = account id, preserving fields not
    /// named in the profile. `newly_created` selects which timestamp the
    /// merge stamps (createdAt vs updatedAt).
    async fn upsert_profile(&self, profile: &UserProfileDoc, newly_created: bool) -> Result<()>;
}

/// Settings applied to every reconciliation
#[derive(Debug, Clone)]
pub struct ReconcileSettings {
    /// Domain for synthesized fallback emails
    pub email_domain: String,

    /// Initial password for newly created accounts
    pub default_password: String,
}

/// What a single reconciliation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A new identity account was created and linked
    Created { uid: String, email: String },

    /// An account with the resolved email already existed and was linked
    Linked { uid: String, email: String },

    /// No inspector document with the given id; nothing written
    NotFound,
}

/// Resolve the effective email for an inspector document.
///
/// Three-tier fallback: the document's own email (trimmed), then
/// `inspector{inspectorNo}@{domain}`, then `inspector_{id}@{domain}`.
/// Every document yields a deterministic, non-empty candidate.
pub fn effective_email(record: &InspectorDoc, domain: &str) -> String {
    let email = record.email.as_deref().unwrap_or("").trim();
    if !email.is_empty() {
        return email.to_string();
    }

    let inspector_no = record.inspector_no.as_deref().unwrap_or("").trim();
    if !inspector_no.is_empty() {
        format!("inspector{}@{}", inspector_no, domain)
    } else {
        format!("inspector_{}@{}", record.id, domain)
    }
}

/// Resolve the display name: the document's displayName if non-empty,
/// otherwise first and last name joined with a single space, trimmed.
pub fn resolved_display_name(record: &InspectorDoc) -> String {
    if let Some(name) = record.display_name.as_deref() {
        if !name.is_empty() {
            return name.trim().to_string();
        }
    }

    let first = record.first_name.as_deref().unwrap_or("");
    let last = record.last_name.as_deref().unwrap_or("");
    format!("{} {}", first, last).trim().to_string()
}

/// Performs the record-to-account reconciliation
pub struct Reconciler {
    records: Arc<dyn InspectorStore>,
    profiles: Arc<dyn ProfileStore>,
    identity: Arc<dyn IdentityProvider>,
    settings: ReconcileSettings,
}

impl Reconciler {
    pub fn new(
        records: Arc<dyn InspectorStore>,
        profiles: Arc<dyn ProfileStore>,
        identity: Arc<dyn IdentityProvider>,
        settings: ReconcileSettings,
    ) -> Self {
        Self {
            records,
            profiles,
            identity,
            settings,
        }
    }

    /// The inspector store, for drivers that enumerate records
    pub fn records(&self) -> &Arc<dyn InspectorStore> {
        &self.records
    }

    /// Ensure the inspector has a linked identity account.
    ///
    /// Creates the account, or on an email collision looks up and links the
    /// existing one, then writes `uid` into the inspector document and
    /// merges the user profile. A missing document short-circuits with
    /// `Outcome::NotFound` and zero writes.
    pub async fn reconcile(&self, record_id: &str) -> Result<Outcome> {
        let Some(record) = self.records.fetch(record_id).await? else {
            return Ok(Outcome::NotFound);
        };

        let email = effective_email(&record, &self.settings.email_domain);
        let display_name = resolved_display_name(&record);

        let (uid, newly_created) = match self
            .identity
            .create_account(&email, &self.settings.default_password, &display_name)
            .await
        {
            Ok(uid) => (uid, true),
            Err(ProviderError::AlreadyExists(_)) => {
                let uid = self.identity.account_id_by_email(&email).await?;
                (uid, false)
            }
            Err(e) => return Err(e.into()),
        };

        self.records.link_uid(record_id, &uid).await?;

        let profile = UserProfileDoc::new(&uid, &email, &display_name);
        self.profiles.upsert_profile(&profile, newly_created).await?;

        Ok(if newly_created {
            Outcome::Created { uid, email }
        } else {
            Outcome::Linked { uid, email }
        })
    }

    /// Reconcile one record, containing every failure to a log line.
    ///
    /// Drivers call this so one bad record never aborts a batch or watch
    /// run. Exactly one line is emitted per outcome.
    pub async fn reconcile_logged(&self, record_id: &str) {
        match self.reconcile(record_id).await {
            Ok(Outcome::Created { uid, email }) => {
                info!(
                    "Created auth account {} for inspector {} ({}) and wrote users/{}",
                    uid, record_id, email, uid
                );
            }
            Ok(Outcome::Linked { uid, email }) => {
                info!(
                    "Linked existing auth account {} to inspector {} ({}) and wrote users/{}",
                    uid, record_id, email, uid
                );
            }
            Ok(Outcome::NotFound) => {
                warn!("Inspector document not found: {}", record_id);
            }
            Err(e) => {
                error!("Failed to reconcile inspector {}: {}", record_id, e);
            }
        }
    }
}
