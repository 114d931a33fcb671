//! Document schemas for the inspectors and users collections

mod inspector;
mod profile;

pub use inspector::{InspectorDoc, INSPECTOR_COLLECTION};
pub use profile::{UserProfileDoc, INSPECTOR_ROLE, USER_COLLECTION};
