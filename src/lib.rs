//! inspector-auth - identity account provisioning for inspector records
//!
//! Reads inspector documents from MongoDB, ensures each one has a matching
//! identity-provider account, writes the account id back into the document
//! as `uid`, and mirrors a role profile into the `users` collection.
//!
//! ## Modes
//!
//! - **single id**: reconcile one inspector document, then exit
//! - **`--all`**: reconcile every inspector missing a `uid`, sequentially
//! - **`--watch`**: follow the collection change stream and reconcile
//!   documents as they appear, until interrupted

pub mod config;
pub mod db;
pub mod drivers;
pub mod identity;
pub mod reconcile;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Args;
pub use reconcile::{Outcome, ReconcileSettings, Reconciler};
pub use types::{ProvisionError, Result};
