//! # sunswitch-domain
//!
//! Pure domain model for the sunswitch lighting controller.
//!
//! ## Responsibilities
//! - Foundational types: error taxonomy, local wall-clock helpers
//! - Describe **where** the controller runs ([`location::Location`]) and the
//!   weather it sees ([`location::CloudCover`])
//! - Define the per-run **time context** (now, sunrise, sunset, weekday)
//! - Define **rules** (on/off time windows) and their resolution into
//!   concrete instants
//! - Define **devices** (switches and lights) and their expected power state
//! - Define the **override ledger** used to detect manual intervention
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod device;
pub mod ledger;
pub mod location;
pub mod power;
pub mod rule;
pub mod time_context;
pub mod weekday;
