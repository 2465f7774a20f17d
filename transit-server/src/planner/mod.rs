//! Shortest-path planning over the active snapshot.

pub mod dijkstra;
pub mod router;

pub use dijkstra::{RouteError, RoutePath, shortest_path};
pub use router::RoutePlanner;
