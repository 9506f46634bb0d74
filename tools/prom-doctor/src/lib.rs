//! Prometheus Doctor
//!
//! Inspects a Prometheus server and reports:
//! - Server reachability and version
//! - Target health for key jobs (`up` metric)
//! - Whether key metrics have samples
//!
//! # Modules
//! - `client`: Query API seam and its reqwest implementation
//! - `model`: Response documents and the per-target / per-metric records
//! - `classify`: Pure OK/WARN/FATAL classification of fetched documents
//! - `report`: Line-oriented report, written as it is built
//! - `audit`: The sequential run tying the steps together
//!
//! Only an unreachable server is fatal. Everything else is a warning and the
//! run carries on.

pub mod audit;
pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod report;
