//! Attendance tracking engine for branch-based organizations.
//!
//! This crate implements the core of a workday presence system: the
//! check-in/check-out state machine with lateness and overtime
//! derivation, break management under a per-type policy table, and the
//! correction approval workflow. Each branch has its own time zone and
//! working-hour policy; every timestamp is persisted in both UTC and
//! branch-local form at write time.
//!
//! The engine is protocol-agnostic: persistence, transport, and
//! authentication live behind the trait seams in [`external`].

#![warn(missing_docs)]

pub mod cancel;
pub mod config;
pub mod engine;
pub mod error;
pub mod external;
pub mod models;
pub mod policy;
pub mod time;
