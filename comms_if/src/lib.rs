//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the software: the command channel grammar,
//! the traits behind which the rover's equipment sits, and the network plumbing.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Command grammar and responses shared by the serial, wireless and script command sources.
pub mod cmd;

/// Interfaces to equipment (sensors and actuators)
pub mod eqpt;

/// Network module
pub mod net;
