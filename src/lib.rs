//! Roster interpretation and payroll engine for airline cabin crew
//!
//! This crate turns monthly roster rows into classified duties, pairs
//! layover legs into per-diem rests, and computes fixed and variable pay
//! per payroll month against versioned rate tables. Every monetary figure
//! carries an audit trail of the rule that produced it.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod replacement;
