//! Restart-delay policies.
//!
//! A crashed process is only restarted after a minimum delay computed by
//! [`BackoffPolicy`] from its consecutive-crash count; [`JitterPolicy`] adds
//! optional randomness so that many crashing processes do not restart in
//! lockstep.

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
