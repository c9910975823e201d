//! Data models for the application
//!
//! The inspection aggregate and the records it owns. Each sub-module covers one
//! collection of the remote datastore.

mod consent;
mod damage;
mod inspection;
mod photo;

// Re-export all models for convenient imports
pub use consent::*;
pub use damage::*;
pub use inspection::*;
pub use photo::*;
