//! Domain data types
//!
//! Grouped by concern: calendar fan-out types, course roster types, and the
//! syncable domain entities.

pub mod calendar;
pub mod course;
pub mod entity;
