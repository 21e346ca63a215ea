pub mod cost_graph;
pub mod fleet;
pub mod location;
pub mod profile;
pub mod vrp;
