//! Collection of general utility modules.
//!
//! Token signing and password hashing live here; both are configured once at
//! startup and shared by the services that need them.

pub mod jwt;
pub mod password;
