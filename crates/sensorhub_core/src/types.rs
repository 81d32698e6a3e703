//! Tipos de dados compartilhados do SensorHub.
//!
//! `Reading` é a medição escalar produzida pelos coletores a cada ciclo de
//! poll; `DeviceConfig` é a configuração remota já validada pelo codec.

use serde::{Deserialize, Serialize};

// ──────────────────────────────────────────────
// Reading
// ──────────────────────────────────────────────

/// Uma medição escalar com timestamp de captura.
///
/// Imutável depois de construída; o coletor a empurra para a sequência de
/// saída do chamador e não retém nenhuma referência.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Nome estável do canal (ex: "temperature", "accel_x")
    pub sensor_name: String,
    /// Milissegundos desde epoch; nunca decresce por coletor
    pub timestamp: u64,
    /// Valor medido (unidade depende do canal)
    pub value: f32,
}

impl Reading {
    /// Cria uma nova leitura.
    pub fn new(sensor_name: &str, timestamp: u64, value: f32) -> Self {
        Self {
            sensor_name: sensor_name.into(),
            timestamp,
            value,
        }
    }
}

// ──────────────────────────────────────────────
// DeviceConfig
// ──────────────────────────────────────────────

fn default_alert() -> String {
    "OFF".into()
}

/// Configuração remota do dispositivo (mensagem inbound).
///
/// O parse é atômico: ou todos os campos obrigatórios estão presentes e bem
/// tipados, ou o parse inteiro falha — nunca existe um `DeviceConfig` parcial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Versão monotônica; o chamador usa para ignorar config antiga/repetida
    pub version: u32,
    #[serde(rename = "telemetry-events-per-hour")]
    pub telemetry_events_per_hour: u32,
    #[serde(rename = "state-updates-per-hour")]
    pub state_updates_per_hour: u32,
    /// Canais a habilitar, em ordem; todos os demais ficam desabilitados
    #[serde(rename = "active-sensors")]
    pub active_sensors: Vec<String>,
    /// Flag de alerta; "OFF" quando ausente no payload
    #[serde(default = "default_alert")]
    pub alert: String,
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
