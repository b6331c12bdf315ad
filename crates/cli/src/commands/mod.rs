//! Command handlers for the vectorlink CLI.

pub mod init;
pub mod query;
pub mod store;
pub mod upsert;

pub use init::InitCommand;
pub use query::QueryCommand;
pub use store::StoreCommand;
pub use upsert::UpsertCommand;
