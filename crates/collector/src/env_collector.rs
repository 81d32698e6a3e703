//! Coletor do chip ambiental.
//!
//! Três canais escalares: temperatura e pressão compartilham uma única
//! transação de barramento quando ambos habilitados (e por isso o mesmo
//! timestamp de captura — os valores ficam comparáveis no mesmo instante);
//! umidade existe só em algumas revisões do chip e é sempre uma transação
//! própria, com timestamp independente.

use crate::collector::{CaptureClock, SensorCollector};
use crate::device::{DeviceError, EnvDevice, Oversampling};
use sensorhub_core::Reading;
use tracing::{debug, info, warn};

pub const SENSOR_TEMPERATURE: &str = "temperature";
pub const SENSOR_PRESSURE: &str = "ambient_pressure";
pub const SENSOR_HUMIDITY: &str = "humidity";

/// Coletor do chip ambiental, genérico sobre o handle do driver.
pub struct EnvCollector<D: EnvDevice> {
    bus: String,
    device: Option<D>,
    temperature_enabled: bool,
    pressure_enabled: bool,
    humidity_enabled: bool,
    /// Fato de hardware, descoberto no activate; nunca configurável
    humidity_available: bool,
    clock: CaptureClock,
}

impl<D: EnvDevice> EnvCollector<D> {
    /// Cria o coletor com todos os canais habilitados.
    ///
    /// Estado inicial diferente: chamar `set_enabled` antes de `activate`.
    pub fn new(bus: &str) -> Self {
        Self {
            bus: bus.into(),
            device: None,
            temperature_enabled: true,
            pressure_enabled: true,
            humidity_enabled: true,
            humidity_available: false,
            clock: CaptureClock::default(),
        }
    }

    fn try_activate(&mut self) -> Result<(), DeviceError> {
        let mut dev = D::open(&self.bus)?;
        self.humidity_available = dev.has_humidity();
        dev.set_temperature_oversampling(Oversampling::from_enabled(self.temperature_enabled))?;
        dev.set_pressure_oversampling(Oversampling::from_enabled(self.pressure_enabled))?;
        if self.humidity_available {
            dev.set_humidity_oversampling(Oversampling::from_enabled(self.humidity_enabled))?;
        }
        dev.set_normal_mode()?;
        self.device = Some(dev);
        Ok(())
    }

    /// Empurra o modo de amostragem de um canal ao chip conectado.
    /// Falha de push é logada e engolida; o flag em memória ainda vale.
    fn push_oversampling(&mut self, sensor: &str, enabled: bool) {
        let Some(dev) = self.device.as_mut() else {
            return;
        };
        let os = Oversampling::from_enabled(enabled);
        let result = match sensor {
            SENSOR_TEMPERATURE => dev.set_temperature_oversampling(os),
            SENSOR_PRESSURE => dev.set_pressure_oversampling(os),
            SENSOR_HUMIDITY if self.humidity_available => dev.set_humidity_oversampling(os),
            _ => Ok(()),
        };
        if let Err(e) = result {
            warn!("não foi possível configurar {sensor} = {enabled} no chip: {e}");
        }
    }
}

impl<D: EnvDevice> SensorCollector for EnvCollector<D> {
    fn activate(&mut self) -> bool {
        if self.device.is_some() {
            return true;
        }
        match self.try_activate() {
            Ok(()) => {
                info!(
                    "✓ chip ambiental inicializado em {} (umidade: {})",
                    self.bus,
                    if self.humidity_available { "presente" } else { "ausente" }
                );
                true
            }
            Err(e) => {
                info!("✗ chip ambiental indisponível em {}: {e}", self.bus);
                false
            }
        }
    }

    fn set_enabled(&mut self, sensor: &str, enabled: bool) {
        match sensor {
            SENSOR_TEMPERATURE => {
                self.push_oversampling(sensor, enabled);
                self.temperature_enabled = enabled;
            }
            SENSOR_PRESSURE => {
                self.push_oversampling(sensor, enabled);
                self.pressure_enabled = enabled;
            }
            SENSOR_HUMIDITY => {
                if enabled && self.device.is_some() && !self.humidity_available {
                    info!("canal de umidade ausente nesta unidade; pedido ignorado");
                    return;
                }
                self.push_oversampling(sensor, enabled);
                self.humidity_enabled = enabled;
            }
            _ => warn!("canal desconhecido {sensor}; pedido ignorado"),
        }
    }

    fn is_enabled(&self, sensor: &str) -> bool {
        match sensor {
            SENSOR_TEMPERATURE => self.temperature_enabled,
            SENSOR_PRESSURE => self.pressure_enabled,
            SENSOR_HUMIDITY => self.humidity_available && self.humidity_enabled,
            _ => false,
        }
    }

    fn available_sensors(&self) -> Vec<&'static str> {
        let mut sensors = vec![SENSOR_TEMPERATURE, SENSOR_PRESSURE];
        if self.humidity_available {
            sensors.push(SENSOR_HUMIDITY);
        }
        sensors
    }

    fn enabled_sensors(&self) -> Vec<&'static str> {
        self.available_sensors()
            .into_iter()
            .filter(|s| self.is_enabled(s))
            .collect()
    }

    fn collect_recent_readings(&mut self, output: &mut Vec<Reading>) {
        let Self {
            device,
            clock,
            temperature_enabled,
            pressure_enabled,
            humidity_enabled,
            humidity_available,
            ..
        } = self;
        let Some(dev) = device.as_mut() else {
            return;
        };

        let mut poll = || -> Result<(), DeviceError> {
            if *temperature_enabled && *pressure_enabled {
                // Transação única: os dois valores compartilham o timestamp
                let ts = clock.capture();
                let (temperature, pressure) = dev.read_temperature_and_pressure()?;
                output.push(Reading::new(SENSOR_TEMPERATURE, ts, temperature));
                output.push(Reading::new(SENSOR_PRESSURE, ts, pressure));
            } else if *temperature_enabled {
                let temperature = dev.read_temperature()?;
                output.push(Reading::new(SENSOR_TEMPERATURE, clock.capture(), temperature));
            } else if *pressure_enabled {
                let pressure = dev.read_pressure()?;
                output.push(Reading::new(SENSOR_PRESSURE, clock.capture(), pressure));
            }
            if *humidity_available && *humidity_enabled {
                // Transação própria, timestamp independente do par
                let humidity = dev.read_humidity()?;
                output.push(Reading::new(SENSOR_HUMIDITY, clock.capture(), humidity));
            }
            Ok(())
        };

        if let Err(e) = poll() {
            warn!("falha ao coletar do chip ambiental; ciclo truncado: {e}");
        }
    }

    fn close_quietly(&mut self) {
        if let Some(dev) = self.device.take() {
            if let Err(e) = dev.close() {
                debug!("erro ao fechar o chip ambiental (ignorado): {e}");
            }
        }
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Mock do handle ambiental; comportamento configurado pelo nome do
    /// barramento ("ausente", "sem-umidade", "umidade-falha", "config-falha").
    struct MockEnvDevice {
        humidity: bool,
        fail_humidity_read: bool,
        fail_pushes_when_armed: bool,
        armed: bool,
    }

    impl MockEnvDevice {
        fn push(&mut self) -> Result<(), DeviceError> {
            if self.armed && self.fail_pushes_when_armed {
                Err(DeviceError::Io("nack no registrador de controle".into()))
            } else {
                Ok(())
            }
        }
    }

    impl EnvDevice for MockEnvDevice {
        fn open(bus: &str) -> Result<Self, DeviceError> {
            if bus.contains("ausente") {
                return Err(DeviceError::Open {
                    bus: bus.into(),
                    reason: "sem resposta do chip".into(),
                });
            }
            Ok(Self {
                humidity: !bus.contains("sem-umidade"),
                fail_humidity_read: bus.contains("umidade-falha"),
                fail_pushes_when_armed: bus.contains("config-falha"),
                armed: false,
            })
        }

        fn has_humidity(&self) -> bool {
            self.humidity
        }

        fn set_temperature_oversampling(&mut self, _os: Oversampling) -> Result<(), DeviceError> {
            self.push()
        }

        fn set_pressure_oversampling(&mut self, _os: Oversampling) -> Result<(), DeviceError> {
            self.push()
        }

        fn set_humidity_oversampling(&mut self, _os: Oversampling) -> Result<(), DeviceError> {
            self.push()
        }

        fn set_normal_mode(&mut self) -> Result<(), DeviceError> {
            self.armed = true;
            Ok(())
        }

        fn read_temperature_and_pressure(&mut self) -> Result<(f32, f32), DeviceError> {
            Ok((21.5, 1013.2))
        }

        fn read_temperature(&mut self) -> Result<f32, DeviceError> {
            Ok(21.5)
        }

        fn read_pressure(&mut self) -> Result<f32, DeviceError> {
            Ok(1013.2)
        }

        fn read_humidity(&mut self) -> Result<f32, DeviceError> {
            if self.fail_humidity_read {
                Err(DeviceError::Io("leitura de umidade falhou".into()))
            } else {
                Ok(48.0)
            }
        }

        fn close(self) -> Result<(), DeviceError> {
            Ok(())
        }
    }

    fn collector(bus: &str) -> EnvCollector<MockEnvDevice> {
        EnvCollector::new(bus)
    }

    #[test]
    fn collect_without_activate_appends_nothing() {
        let mut c = collector("I2C1");
        let mut out = Vec::new();
        c.collect_recent_readings(&mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn activate_failure_keeps_collector_disconnected() {
        let mut c = collector("I2C1-ausente");
        assert!(!c.activate());
        assert!(!c.activate());

        let mut out = Vec::new();
        c.collect_recent_readings(&mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn activate_is_idempotent() {
        let mut c = collector("I2C1");
        assert!(c.activate());
        assert!(c.activate());
    }

    #[test]
    fn combined_pair_shares_timestamp() {
        let mut c = collector("I2C1");
        assert!(c.activate());

        let mut out = Vec::new();
        c.collect_recent_readings(&mut out);

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].sensor_name, SENSOR_TEMPERATURE);
        assert_eq!(out[1].sensor_name, SENSOR_PRESSURE);
        // Par lido em uma transação: mesmo instante de captura
        assert_eq!(out[0].timestamp, out[1].timestamp);
        // Umidade é capturada à parte
        assert_eq!(out[2].sensor_name, SENSOR_HUMIDITY);
        assert!(out[2].timestamp >= out[0].timestamp);
    }

    #[test]
    fn single_channel_read_when_pair_is_broken() {
        let mut c = collector("I2C1");
        c.set_enabled(SENSOR_PRESSURE, false);
        assert!(c.activate());

        let mut out = Vec::new();
        c.collect_recent_readings(&mut out);

        let names: Vec<_> = out.iter().map(|r| r.sensor_name.as_str()).collect();
        assert_eq!(names, vec![SENSOR_TEMPERATURE, SENSOR_HUMIDITY]);
    }

    #[test]
    fn pre_activation_flags_define_initial_state() {
        let mut c = collector("I2C1");
        c.set_enabled(SENSOR_HUMIDITY, false);
        assert!(c.activate());

        let mut out = Vec::new();
        c.collect_recent_readings(&mut out);
        assert!(out.iter().all(|r| r.sensor_name != SENSOR_HUMIDITY));
    }

    #[test]
    fn humidity_absent_unit_hides_the_channel() {
        let mut c = collector("I2C1-sem-umidade");
        assert!(c.activate());

        assert_eq!(c.available_sensors(), vec![SENSOR_TEMPERATURE, SENSOR_PRESSURE]);
        assert!(!c.is_enabled(SENSOR_HUMIDITY));

        // Pedido de habilitação num canal ausente é ignorado
        c.set_enabled(SENSOR_HUMIDITY, true);
        assert!(!c.is_enabled(SENSOR_HUMIDITY));

        let mut out = Vec::new();
        c.collect_recent_readings(&mut out);
        assert!(out.iter().all(|r| r.sensor_name != SENSOR_HUMIDITY));
    }

    #[test]
    fn read_failure_truncates_cycle_keeping_partial() {
        let mut c = collector("I2C1-umidade-falha");
        assert!(c.activate());

        let mut out = Vec::new();
        c.collect_recent_readings(&mut out);

        // O par já anexado é mantido; o ciclo para na falha da umidade
        let names: Vec<_> = out.iter().map(|r| r.sensor_name.as_str()).collect();
        assert_eq!(names, vec![SENSOR_TEMPERATURE, SENSOR_PRESSURE]);
    }

    #[test]
    fn enabled_flags_survive_close() {
        let mut c = collector("I2C1");
        assert!(c.activate());
        c.set_enabled(SENSOR_PRESSURE, false);

        c.close_quietly();
        c.close_quietly();

        assert!(c.is_enabled(SENSOR_TEMPERATURE));
        assert!(!c.is_enabled(SENSOR_PRESSURE));
        assert!(c.is_enabled(SENSOR_HUMIDITY));
    }

    #[test]
    fn unknown_channel_is_ignored() {
        let mut c = collector("I2C1");
        c.set_enabled("motion", true);
        assert!(!c.is_enabled("motion"));
        assert!(c.is_enabled(SENSOR_TEMPERATURE));
        assert!(c.is_enabled(SENSOR_PRESSURE));
    }

    #[test]
    fn push_failure_still_updates_flag() {
        let mut c = collector("I2C1-config-falha");
        assert!(c.activate());

        // O push ao chip falha, mas o flag em memória muda mesmo assim
        c.set_enabled(SENSOR_TEMPERATURE, false);
        assert!(!c.is_enabled(SENSOR_TEMPERATURE));

        let mut out = Vec::new();
        c.collect_recent_readings(&mut out);
        let names: Vec<_> = out.iter().map(|r| r.sensor_name.as_str()).collect();
        assert_eq!(names, vec![SENSOR_PRESSURE, SENSOR_HUMIDITY]);
    }

    #[test]
    fn enabled_sensors_keeps_fixed_order() {
        let mut c = collector("I2C1");
        assert!(c.activate());
        c.set_enabled(SENSOR_TEMPERATURE, false);
        assert_eq!(c.enabled_sensors(), vec![SENSOR_PRESSURE, SENSOR_HUMIDITY]);
    }
}
