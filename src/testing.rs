//! In-memory fakes for unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::db::schemas::{InspectorDoc, UserProfileDoc};
use crate::identity::{IdentityProvider, ProviderError};
use crate::reconcile::{InspectorStore, ProfileStore};
use crate::types::{ProvisionError, Result};

/// Build a bare inspector record with the given id
pub fn record(id: &str) -> InspectorDoc {
    InspectorDoc {
        id: id.to_string(),
        ..Default::default()
    }
}

/// A stored profile plus fields the reconciler does not own, so merge
/// behavior can be asserted
#[derive(Clone)]
pub struct ProfileEntry {
    pub doc: UserProfileDoc,
    pub extra: HashMap<String, String>,
}

/// In-memory stand-in for both collections
#[derive(Default)]
pub struct MemoryDirectory {
    inspectors: Mutex<HashMap<String, InspectorDoc>>,
    profiles: Mutex<HashMap<String, ProfileEntry>>,
    /// Total write operations (link_uid + upsert_profile)
    pub writes: AtomicUsize,
}

impl MemoryDirectory {
    pub fn put(&self, record: InspectorDoc) {
        self.inspectors
            .lock()
            .unwrap()
            .insert(record.id.clone(), record);
    }

    pub fn uid_of(&self, id: &str) -> Option<String> {
        self.inspectors
            .lock()
            .unwrap()
            .get(id)
            .and_then(|r| r.uid.clone())
    }

    pub fn profile(&self, uid: &str) -> Option<ProfileEntry> {
        self.profiles.lock().unwrap().get(uid).cloned()
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.lock().unwrap().len()
    }

    /// Plant a field on a profile that the reconciler never writes
    pub fn seed_profile_field(&self, uid: &str, key: &str, value: &str) {
        let mut profiles = self.profiles.lock().unwrap();
        let entry = profiles.entry(uid.to_string()).or_insert_with(|| ProfileEntry {
            doc: UserProfileDoc::new(uid, "", ""),
            extra: HashMap::new(),
        });
        entry.extra.insert(key.to_string(), value.to_string());
    }
}

#[async_trait::async_trait]
impl InspectorStore for MemoryDirectory {
    async fn fetch(&self, id: &str) -> Result<Option<InspectorDoc>> {
        Ok(self.inspectors.lock().unwrap().get(id).cloned())
    }

    async fn link_uid(&self, id: &str, uid: &str) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut inspectors = self.inspectors.lock().unwrap();
        match inspectors.get_mut(id) {
            Some(record) => {
                record.uid = Some(uid.to_string());
                Ok(())
            }
            None => Err(ProvisionError::Database(format!(
                "no inspector {} to update",
                id
            ))),
        }
    }

    async fn list_unlinked(&self) -> Result<Vec<InspectorDoc>> {
        let mut records: Vec<InspectorDoc> = self
            .inspectors
            .lock()
            .unwrap()
            .values()
            .filter(|r| !r.has_uid())
            .cloned()
            .collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }
}

#[async_trait::async_trait]
impl ProfileStore for MemoryDirectory {
    async fn upsert_profile(&self, profile: &UserProfileDoc, newly_created: bool) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut profiles = self.profiles.lock().unwrap();
        let entry = profiles
            .entry(profile.id.clone())
            .or_insert_with(|| ProfileEntry {
                doc: UserProfileDoc::new(&profile.id, "", ""),
                extra: HashMap::new(),
            });
        entry.doc.email = profile.email.clone();
        entry.doc.authid = profile.authid.clone();
        entry.doc.role = profile.role.clone();
        entry.doc.display_name = profile.display_name.clone();
        if newly_created {
            entry.doc.created_at = Some(bson::DateTime::now());
        } else {
            entry.doc.updated_at = Some(bson::DateTime::now());
        }
        Ok(())
    }
}

/// In-memory identity provider with call accounting
#[derive(Default)]
pub struct MemoryIdentityProvider {
    accounts: Mutex<HashMap<String, String>>,
    next_id: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub lookup_calls: AtomicUsize,
    /// Force create_account to fail with a Service error
    pub fail_create: AtomicBool,
    /// Artificial latency per create call, to surface ordering bugs
    pub delay_ms: AtomicU64,
    /// Concurrency accounting over create calls
    pub active: AtomicUsize,
    pub max_active: AtomicUsize,
}

impl MemoryIdentityProvider {
    pub fn seed_account(&self, email: &str, uid: &str) {
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), uid.to_string());
    }

    pub fn account_count(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn create_account(
        &self,
        email: &str,
        _password: &str,
        _display_name: &str,
    ) -> std::result::Result<String, ProviderError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);

        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let result = if self.fail_create.load(Ordering::SeqCst) {
            Err(ProviderError::Service("simulated provider failure".to_string()))
        } else {
            let mut accounts = self.accounts.lock().unwrap();
            if accounts.contains_key(email) {
                Err(ProviderError::AlreadyExists(email.to_string()))
            } else {
                let uid = format!("uid-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
                accounts.insert(email.to_string(), uid.clone());
                Ok(uid)
            }
        };

        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn account_id_by_email(&self, email: &str) -> std::result::Result<String, ProviderError> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        self.accounts
            .lock()
            .unwrap()
            .get(email)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(email.to_string()))
    }
}
