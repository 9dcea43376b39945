//! Storage for stored policies and their host and vendor associations.
//!
//! The traits define the read-only interface the engine needs. An in-memory
//! backend and a JSON snapshot loader are provided for embedding and tests.

mod memory;
mod snapshot;
mod traits;

pub use memory::{
    InMemoryHostPolicyStore, InMemoryPolicyStore, InMemoryStores, InMemoryVendorPolicyStore,
};
pub use snapshot::StoreSnapshot;
pub use traits::{HostPolicyStore, PolicyStores, StorageError, TlsPolicyStore, VendorPolicyStore};
