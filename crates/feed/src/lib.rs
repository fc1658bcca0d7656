pub mod adapter;
pub mod banks;
pub mod extract;
pub mod http;
pub mod orchestrator;
pub mod score;
pub mod strategy;
pub mod validate;
