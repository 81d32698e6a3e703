//! Codec dos payloads JSON trocados com o serviço de telemetria.
//!
//! Funções puras e sem estado — nenhum acesso a dispositivo ou rede.
//! Formatos no fio:
//!
//! ```text
//! Telemetria: {"data":[{"timestamp_<nome>": <int>, "<nome>": <float>}, ...]}
//! Estado:     {"version":N, "telemetry-events-per-hour":N,
//!              "state-updates-per-hour":N, "sensors":[...], "active-sensors":[...]}
//! Config:     {"version":N, "telemetry-events-per-hour":N,
//!              "state-updates-per-hour":N, "active-sensors":[...],
//!              "alert": <string, opcional — "OFF" quando ausente>}
//! ```

use crate::types::{DeviceConfig, Reading};
use serde::Serialize;
use serde_json::{Map, Number, Value, json};

/// Erros do codec de payloads.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// Leitura não representável em JSON (valor não finito).
    #[error("valor não finito no canal {sensor}: {value}")]
    Encode { sensor: String, value: f32 },

    /// Falha de serialização ao montar uma mensagem outbound.
    #[error("falha ao serializar payload: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Payload inbound malformado; carrega o texto original para log.
    #[error("payload de configuração inválido: {payload}")]
    Decode {
        payload: String,
        #[source]
        source: serde_json::Error,
    },
}

// ──────────────────────────────────────────────
// Encode
// ──────────────────────────────────────────────

/// Serializa leituras em uma mensagem de telemetria.
///
/// Uma entrada por leitura, na ordem de entrada, sem deduplicação — leituras
/// repetidas do mesmo canal viram entradas próprias. Um valor não finito é
/// um [`PayloadError::Encode`]; nada é descartado em silêncio.
pub fn encode_telemetry(readings: &[Reading]) -> Result<String, PayloadError> {
    let mut data = Vec::with_capacity(readings.len());
    for reading in readings {
        let value =
            Number::from_f64(f64::from(reading.value)).ok_or_else(|| PayloadError::Encode {
                sensor: reading.sensor_name.clone(),
                value: reading.value,
            })?;
        let mut entry = Map::new();
        entry.insert(
            format!("timestamp_{}", reading.sensor_name),
            Value::from(reading.timestamp),
        );
        entry.insert(reading.sensor_name.clone(), Value::Number(value));
        data.push(Value::Object(entry));
    }
    Ok(json!({ "data": data }).to_string())
}

#[derive(Serialize)]
struct DeviceState<'a> {
    version: u32,
    #[serde(rename = "telemetry-events-per-hour")]
    telemetry_events_per_hour: u32,
    #[serde(rename = "state-updates-per-hour")]
    state_updates_per_hour: u32,
    sensors: &'a [&'a str],
    #[serde(rename = "active-sensors")]
    active_sensors: &'a [&'a str],
}

/// Serializa o estado do dispositivo em uma mensagem de atualização.
///
/// Os arrays preservam a ordem de entrada.
pub fn encode_device_state(
    version: u32,
    telemetry_events_per_hour: u32,
    state_updates_per_hour: u32,
    all_sensors: &[&str],
    active_sensors: &[&str],
) -> Result<String, PayloadError> {
    let state = DeviceState {
        version,
        telemetry_events_per_hour,
        state_updates_per_hour,
        sensors: all_sensors,
        active_sensors,
    };
    serde_json::to_string(&state).map_err(PayloadError::Serialize)
}

// ──────────────────────────────────────────────
// Decode
// ──────────────────────────────────────────────

/// Valida e deserializa uma mensagem de configuração inbound.
///
/// Campos desconhecidos são ignorados (um documento no formato de estado
/// também parseia). Em caso de falha o [`PayloadError::Decode`] carrega o
/// texto original, para que o chamador logue o payload ofensor na íntegra.
pub fn parse_device_config(payload: &str) -> Result<DeviceConfig, PayloadError> {
    serde_json::from_str(payload).map_err(|e| PayloadError::Decode {
        payload: payload.to_string(),
        source: e,
    })
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telemetry_single_reading_has_exact_keys() {
        let readings = [Reading::new("t", 1000, 21.5)];
        let msg = encode_telemetry(&readings).unwrap();

        let doc: Value = serde_json::from_str(&msg).unwrap();
        let data = doc["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);

        let entry = data[0].as_object().unwrap();
        assert_eq!(entry.len(), 2);
        assert_eq!(entry["timestamp_t"], json!(1000));
        assert_eq!(entry["t"], json!(21.5));
    }

    #[test]
    fn telemetry_keeps_duplicate_channels() {
        let readings = [
            Reading::new("temperature", 1000, 21.0),
            Reading::new("temperature", 2000, 22.0),
        ];
        let msg = encode_telemetry(&readings).unwrap();
        let doc: Value = serde_json::from_str(&msg).unwrap();
        // Sem deduplicação: duas entradas, ordem de entrada
        let data = doc["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["timestamp_temperature"], json!(1000));
        assert_eq!(data[1]["timestamp_temperature"], json!(2000));
    }

    #[test]
    fn telemetry_empty_is_valid() {
        let msg = encode_telemetry(&[]).unwrap();
        assert_eq!(msg, r#"{"data":[]}"#);
    }

    #[test]
    fn telemetry_rejects_non_finite_value() {
        let readings = [Reading::new("temperature", 1000, f32::NAN)];
        let err = encode_telemetry(&readings).unwrap_err();
        assert!(matches!(err, PayloadError::Encode { ref sensor, .. } if sensor == "temperature"));

        let readings = [Reading::new("ambient_pressure", 1000, f32::INFINITY)];
        assert!(encode_telemetry(&readings).is_err());
    }

    #[test]
    fn state_message_has_verbatim_fields() {
        let msg = encode_device_state(7, 120, 12, &["a", "b", "c"], &["c", "a"]).unwrap();
        let doc: Value = serde_json::from_str(&msg).unwrap();
        assert_eq!(doc["version"], json!(7));
        assert_eq!(doc["telemetry-events-per-hour"], json!(120));
        assert_eq!(doc["state-updates-per-hour"], json!(12));
        assert_eq!(doc["sensors"], json!(["a", "b", "c"]));
        // Ordem de entrada preservada
        assert_eq!(doc["active-sensors"], json!(["c", "a"]));
    }

    #[test]
    fn state_message_roundtrips_into_config() {
        let msg = encode_device_state(1, 20, 10, &["a", "b", "c"], &["a", "b"]).unwrap();
        let config = parse_device_config(&msg).unwrap();
        assert_eq!(config.active_sensors, vec!["a", "b"]);
        assert_eq!(config.version, 1);
        // Campo "sensors" extra é ignorado; "alert" ausente vira "OFF"
        assert_eq!(config.alert, "OFF");
    }

    #[test]
    fn config_full_example_parses() {
        let json = r#"{"version":1,"telemetry-events-per-hour":10,
            "state-updates-per-hour":5,"active-sensors":["a","b"],"alert":"ON"}"#;
        let config = parse_device_config(json).unwrap();
        assert_eq!(config.version, 1);
        assert_eq!(config.telemetry_events_per_hour, 10);
        assert_eq!(config.state_updates_per_hour, 5);
        assert_eq!(config.active_sensors, vec!["a", "b"]);
        assert_eq!(config.alert, "ON");
    }

    #[test]
    fn config_rejects_garbage_and_keeps_payload_text() {
        let err = parse_device_config("{not json").unwrap_err();
        assert!(matches!(err, PayloadError::Decode { .. }));
        assert!(err.to_string().contains("{not json"));
    }

    #[test]
    fn config_rejects_missing_required_field() {
        // Sem "active-sensors": parse falha por inteiro
        let json = r#"{"version":1,"telemetry-events-per-hour":10,"state-updates-per-hour":5}"#;
        assert!(parse_device_config(json).is_err());
    }

    #[test]
    fn config_rejects_mistyped_fields() {
        let json = r#"{"version":"um","telemetry-events-per-hour":10,
            "state-updates-per-hour":5,"active-sensors":[]}"#;
        assert!(parse_device_config(json).is_err());

        // Taxa negativa não é um u32 válido
        let json = r#"{"version":1,"telemetry-events-per-hour":-10,
            "state-updates-per-hour":5,"active-sensors":[]}"#;
        assert!(parse_device_config(json).is_err());

        let json = r#"{"version":1,"telemetry-events-per-hour":10,
            "state-updates-per-hour":5,"active-sensors":[1,2]}"#;
        assert!(parse_device_config(json).is_err());
    }
}
