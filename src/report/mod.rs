//! Report output: the CSV bounce report and the per-day message count.

pub mod count;
pub mod csv;
