pub mod hierarchy;
pub mod orchestrator;
pub mod scheduler;
pub mod time;
pub mod trail;
