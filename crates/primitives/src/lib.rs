//! Shared data model for the storefront workspace.
//!
//! These types mirror the shape of the remote commerce API closely enough to be
//! deserialized from it, while staying independent of any transport.

pub mod cart;
pub mod errors;
pub mod money;
pub mod product;
