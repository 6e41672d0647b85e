pub mod collaborator;
pub mod constants;
pub mod simulator;
pub mod types;
