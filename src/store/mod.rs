//! Lifecycle store: the key/value parameter boundary.
//!
//! The storage engine itself is an external collaborator; this module holds
//! the interface the loop consumes ([`ParamStore`]), the clearing-category
//! registry ([`ParamKeyType`], [`key_type`]), and the init-time helpers
//! (default values, on-road flags). [`MemParams`] is the in-memory
//! implementation used by the binary and by tests.

mod mem;
mod params;

pub use mem::MemParams;
pub use params::{
    key_type, write_default_params, write_onroad_params, ParamKeyType, ParamStore, SHUTDOWN_FLAGS,
};
