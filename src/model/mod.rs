//! Core data model: fetched messages and their classification results.

pub mod bounce;
pub mod message;
