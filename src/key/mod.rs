//! Key Module
//!
//! Order-preserving encoding of primary-key attributes into composite keys.
//!
//! ## Responsibilities
//! - Encode typed attribute values into string fragments
//! - Join a type discriminator and fragments into one lookup key
//! - Produce partial keys usable as prefixes for range scans
//!
//! ## Key Layout
//! ```text
//! ┌────┬───────────────┬────┬──────────┬────┬─────┬──────────┬────┐
//! │ \0 │ discriminator │ \0 │ frag(a1) │ \0 │ ... │ frag(an) │ \0 │
//! └────┴───────────────┴────┴──────────┴────┴─────┴──────────┴────┘
//! ```
//! Every segment is terminated by the delimiter, so a key built from the
//! first `k` attributes is a byte prefix of every key sharing those values
//! and of no other key.

mod composite;
mod encoder;
mod value;

pub use composite::{build, build_partial, build_type_prefix, CompositeKey, DELIMITER, NAMESPACE};
pub use encoder::{Encoder, Width};
pub use value::AttrValue;
