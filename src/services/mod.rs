// Services
// Stateless helpers around the store: settings, export and legacy conversion.

pub mod conversion;
pub mod export_service;
pub mod settings_engine;
