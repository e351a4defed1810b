use std::sync::Arc;

use crate::config::Config;
use crate::pipeline::Pipeline;
use crate::propagation::Sgp4Engine;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<Pipeline<Sgp4Engine>>,
}
