pub mod elements;
pub mod error;
pub mod positions;
pub mod status;
pub mod trajectories;
