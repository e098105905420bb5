// Application layer - Use cases, polling and the backend seam
pub mod chat_service;
pub mod diagnostics_service;
pub mod fallback;
pub mod fleet_service;
pub mod notifications;
pub mod polling;
pub mod recommendations;
pub mod search;
pub mod vehicle_backend;

#[cfg(test)]
pub mod testing;
