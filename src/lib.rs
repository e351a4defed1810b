pub mod batch;
pub mod broadcast;
pub mod cache;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod live;
pub mod metrics;
pub mod periodic;
pub mod pipeline;
pub mod propagation;
pub mod readiness;
pub mod store;
pub mod trajectory;
pub mod web;

pub use config::Config;
pub use pipeline::Pipeline;
