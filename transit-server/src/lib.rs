//! Urban transit journey planner.
//!
//! Answers point-to-point journey queries over a time-banded transit
//! network: the right network snapshot is selected for the time of day,
//! paths are computed with boarding-cost-aware Dijkstra, and results are
//! cached in memory and on disk for reuse within the travel day.

pub mod cache;
pub mod domain;
pub mod graph;
pub mod planner;
pub mod web;
