pub mod coordinator;
pub mod errors;
pub mod liveness;
pub mod models;
pub mod orchestrator;
pub mod tasks;
