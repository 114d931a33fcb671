//! Typed access to the inspectors and users collections

use bson::{doc, DateTime, Document};
use futures_util::{Stream, StreamExt};
use mongodb::options::FullDocumentType;
use mongodb::Collection;
use tracing::error;

use crate::db::mongo::MongoClient;
use crate::db::schemas::{InspectorDoc, UserProfileDoc, INSPECTOR_COLLECTION, USER_COLLECTION};
use crate::drivers::RecordTouch;
use crate::reconcile::{InspectorStore, ProfileStore};
use crate::types::{ProvisionError, Result};

/// Handles for the two collections this tool touches
pub struct MongoDirectory {
    inspectors: Collection<InspectorDoc>,
    users: Collection<Document>,
}

impl MongoDirectory {
    /// Create collection handles on the configured database
    pub fn new(client: &MongoClient) -> Self {
        let db = client.database();
        Self {
            inspectors: db.collection(INSPECTOR_COLLECTION),
            users: db.collection(USER_COLLECTION),
        }
    }

    /// Open a change stream on the inspectors collection.
    ///
    /// Full-document lookup is enabled so update events carry the complete
    /// document, not just the changed fields. Stream errors are logged and
    /// the offending event is dropped; delete events have no full document
    /// and are filtered out the same way.
    pub async fn watch_records(&self) -> Result<impl Stream<Item = RecordTouch>> {
        let stream = self
            .inspectors
            .watch()
            .full_document(FullDocumentType::UpdateLookup)
            .await
            .map_err(|e| {
                ProvisionError::Database(format!("Failed to open change stream: {}", e))
            })?;

        Ok(stream.filter_map(|event| async move {
            match event {
                Ok(ev) => ev.full_document.map(|record| RecordTouch {
                    has_uid: record.has_uid(),
                    id: record.id,
                }),
                Err(e) => {
                    error!("Change stream error: {}", e);
                    None
                }
            }
        }))
    }
}

#[async_trait::async_trait]
impl InspectorStore for MongoDirectory {
    async fn fetch(&self, id: &str) -> Result<Option<InspectorDoc>> {
        self.inspectors
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| ProvisionError::Database(format!("Failed to fetch inspector {}: {}", id, e)))
    }

    async fn link_uid(&self, id: &str, uid: &str) -> Result<()> {
        self.inspectors
            .update_one(doc! { "_id": id }, doc! { "$set": { "uid": uid } })
            .await
            .map_err(|e| {
                ProvisionError::Database(format!("Failed to set uid on inspector {}: {}", id, e))
            })?;
        Ok(())
    }

    async fn list_unlinked(&self) -> Result<Vec<InspectorDoc>> {
        let filter = doc! {
            "$or": [
                { "uid": { "$exists": false } },
                { "uid": null },
                { "uid": "" },
            ]
        };

        let cursor = self
            .inspectors
            .find(filter)
            .await
            .map_err(|e| ProvisionError::Database(format!("Failed to list inspectors: {}", e)))?;

        let records: Vec<InspectorDoc> = cursor
            .filter_map(|record| async {
                match record {
                    Ok(r) => Some(r),
                    Err(e) => {
                        error!("Error reading inspector document: {}", e);
                        None
                    }
                }
            })
            .collect()
            .await;

        Ok(records)
    }
}

#[async_trait::async_trait]
impl ProfileStore for MongoDirectory {
    async fn upsert_profile(&self, profile: &UserProfileDoc, newly_created: bool) -> Result<()> {
        // Merge semantics: $set only the named fields, never replace the
        // document. createdAt is written on the create path, updatedAt when
        // linking an existing account.
        let stamp = if newly_created { "createdAt" } else { "updatedAt" };
        let mut fields = doc! {
            "email": profile.email.as_str(),
            "authid": profile.authid.as_str(),
            "role": profile.role.as_str(),
            "displayName": profile.display_name.as_str(),
        };
        fields.insert(stamp, DateTime::now());
        let update = doc! { "$set": fields };

        self.users
            .update_one(doc! { "_id": profile.id.as_str() }, update)
            .upsert(true)
            .await
            .map_err(|e| {
                ProvisionError::Database(format!("Failed to upsert users/{}: {}", profile.id, e))
            })?;
        Ok(())
    }
}
