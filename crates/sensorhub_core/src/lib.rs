//! # SensorHub Core
//!
//! Crate compartilhada que define os tipos de dados, o codec JSON dos
//! payloads trocados com o serviço de telemetria e a configuração TOML
//! do sistema SensorHub.
//!
//! ## Módulos
//! - [`types`] – Structs de dados (Reading, DeviceConfig)
//! - [`payload`] – Encode/decode dos payloads JSON de telemetria/estado/config
//! - [`config`] – Configuração local via TOML

pub mod types;
pub mod payload;
pub mod config;

// Re-exports convenientes
pub use types::{DeviceConfig, Reading};
pub use payload::{PayloadError, encode_device_state, encode_telemetry, parse_device_config};
pub use config::HubConfig;
