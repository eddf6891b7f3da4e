//! Domain entities for the persistence layer

pub mod user;

pub use user::{NewUser, User, UserPatch};
