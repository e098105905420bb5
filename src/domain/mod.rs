// Domain layer - Vehicle, telemetry and dashboard models
pub mod chat;
pub mod dashboard;
pub mod diagnostics;
pub mod fleet;
pub mod prediction;
pub mod telemetry;
pub mod vehicle;
