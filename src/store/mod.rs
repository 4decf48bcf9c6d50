//! Persistence module - document/file store traits and their implementations

pub mod files;
pub mod memory;
pub mod records;
pub mod remote;
pub mod traits;

pub use files::DiskFileStore;
pub use memory::MemoryStore;
pub use remote::RemoteStore;
pub use traits::{Document, DocumentStore, FileStore, Filter, Page, Query, StoredFile};
