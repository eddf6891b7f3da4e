//! Shared types and result types for the persistence layer

pub mod errors;

pub use errors::{DatabaseError, StoreError, UniqueField};

pub type DatabaseResult<T> = Result<T, DatabaseError>;
pub type StoreResult<T> = Result<T, StoreError>;
