//! Core types and traits for the follow relationship service.
//!
//! Response DTOs keep the camelCase field names the mobile and web clients already consume.

mod dto;
mod edge;
mod traits;

pub use dto::*;
pub use edge::*;
pub use traits::*;
