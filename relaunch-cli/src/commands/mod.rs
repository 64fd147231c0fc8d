pub mod plan;
pub mod status;
pub mod target;
pub mod update;
