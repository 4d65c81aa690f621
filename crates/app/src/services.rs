//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod control_run;
pub mod override_tracker;
pub mod reconciler;
pub mod time_context;
pub mod weather_service;

#[cfg(test)]
pub(crate) mod test_support;
