mod error;
mod hash;
mod store;

pub use error::StorageError;
pub use hash::ContentHash;
pub use store::{BlobStore, BoxReader, FilesystemBlobStore};
