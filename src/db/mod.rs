pub mod memory;
pub mod mongo;
pub mod store;

pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use store::{decode, encode, DocumentStore, Push, StoreError};

pub const USERS: &str = "users";
pub const TRIPS: &str = "trips";

/// Fields no two documents of a collection may share.
pub const UNIQUE_FIELDS: [(&str, &str); 1] = [(USERS, "email")];
