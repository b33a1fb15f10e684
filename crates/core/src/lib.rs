//! Functional core of the dynodm document store adapter.
//!
//! Everything in this crate is pure: schema derivation, value marshalling,
//! criteria compilation and the store client boundary types. I/O lives in
//! the `dynodm` crate.

pub mod codec;
pub mod criteria;
pub mod schema;
pub mod store;
