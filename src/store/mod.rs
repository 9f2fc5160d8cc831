pub mod client;
pub mod errors;
pub mod memory;
pub mod query;
pub mod records;
pub mod traits;

pub use client::RecordStoreClient;
pub use errors::StoreError;
pub use memory::{InMemoryStore, StoreOp};
pub use query::{Query, SortDirection};
pub use records::{ContractPatch, ContractRow, RowPage};
pub use traits::ContractStore;
