//! Internship Realtime - push connection and notification core
//!
//! Keeps one authenticated push session to the internship tracker's
//! server, routes what it sends to subscribers, maintains the local
//! notification ledger, and turns notable events into toasts, sounds and
//! desktop notifications.
//!
//! Start from [`application::RealtimeClient`].

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
