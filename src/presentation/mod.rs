// Presentation layer - HTTP surface and JSON view models
pub mod app_state;
pub mod event_stream;
pub mod handlers;
pub mod view_models;
