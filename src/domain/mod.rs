//! Domain layer - value objects and aggregates of the realtime core.
//!
//! Nothing in here performs I/O; transports, platform capabilities and
//! HTTP live behind the ports.

pub mod alerts;
pub mod connection;
pub mod foundation;
pub mod notification;
