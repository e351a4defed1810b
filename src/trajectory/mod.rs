mod computer;
mod types;

pub use computer::{compute_trajectory, TrajectoryComputer};
pub use types::{
    TrajectoryBatchReport, TrajectoryRecord, TRAJECTORY_POINTS, TRAJECTORY_STEP_SECONDS,
};
