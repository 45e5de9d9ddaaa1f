pub mod client;
pub mod error;
pub mod memory;
pub mod sync;
pub mod value;

pub use client::{DocumentStore, FirestoreClient, StoredDoc, WriteOp};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use sync::{
    write_categories, write_products, WriteCounts, CATEGORIES_COLLECTION, PRODUCTS_COLLECTION,
};
pub use value::{record_to_fields, DocFields, DocValue};
