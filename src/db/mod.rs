//! MongoDB access for inspector-auth

pub mod mongo;
pub mod schemas;
pub mod store;

pub use mongo::MongoClient;
pub use store::MongoDirectory;
