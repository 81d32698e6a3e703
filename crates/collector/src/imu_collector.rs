//! Coletor do chip inercial.
//!
//! Três canais vetoriais (aceleração, giroscópio, magnetômetro), cada um lido
//! na sua própria transação, mas todas as leituras de um ciclo compartilham um
//! único timestamp de captura. O chip também expõe uma temperatura auxiliar
//! que é lida e anexada em todo ciclo, independente de flags — assimetria
//! herdada do comportamento do dispositivo em produção, fixada por teste.

use crate::collector::{CaptureClock, SensorCollector};
use crate::device::{DeviceError, ImuDevice};
use sensorhub_core::Reading;
use tracing::{debug, info, warn};

pub const SENSOR_ACCEL: &str = "accel";
pub const SENSOR_GYRO: &str = "gyro";
pub const SENSOR_MAG: &str = "mag";
pub const SENSOR_IMU_TEMPERATURE: &str = "imu_temperature";

const ACCEL_AXES: [&str; 3] = ["accel_x", "accel_y", "accel_z"];
const GYRO_AXES: [&str; 3] = ["gyro_x", "gyro_y", "gyro_z"];
const MAG_AXES: [&str; 3] = ["mag_x", "mag_y", "mag_z"];

/// Coletor do chip inercial, genérico sobre o handle do driver.
pub struct ImuCollector<D: ImuDevice> {
    bus: String,
    device: Option<D>,
    accel_enabled: bool,
    gyro_enabled: bool,
    mag_enabled: bool,
    clock: CaptureClock,
}

impl<D: ImuDevice> ImuCollector<D> {
    /// Cria o coletor com os três canais vetoriais habilitados.
    ///
    /// Estado inicial diferente: chamar `set_enabled` antes de `activate`.
    pub fn new(bus: &str) -> Self {
        Self {
            bus: bus.into(),
            device: None,
            accel_enabled: true,
            gyro_enabled: true,
            mag_enabled: true,
            clock: CaptureClock::default(),
        }
    }
}

fn push_axes(output: &mut Vec<Reading>, axes: &[&'static str; 3], ts: u64, values: [f32; 3]) {
    for (name, value) in axes.iter().zip(values) {
        output.push(Reading::new(name, ts, value));
    }
}

impl<D: ImuDevice> SensorCollector for ImuCollector<D> {
    fn activate(&mut self) -> bool {
        if self.device.is_some() {
            return true;
        }
        // Este chip é configurado por inteiro no open; não há pushes
        // por canal depois de conectado.
        match D::open(&self.bus) {
            Ok(dev) => {
                self.device = Some(dev);
                info!("✓ chip inercial inicializado em {}", self.bus);
                true
            }
            Err(e) => {
                info!("✗ chip inercial indisponível em {}: {e}", self.bus);
                false
            }
        }
    }

    fn set_enabled(&mut self, sensor: &str, enabled: bool) {
        match sensor {
            SENSOR_ACCEL => self.accel_enabled = enabled,
            SENSOR_GYRO => self.gyro_enabled = enabled,
            SENSOR_MAG => self.mag_enabled = enabled,
            _ => warn!("canal desconhecido {sensor}; pedido ignorado"),
        }
    }

    fn is_enabled(&self, sensor: &str) -> bool {
        match sensor {
            SENSOR_ACCEL => self.accel_enabled,
            SENSOR_GYRO => self.gyro_enabled,
            SENSOR_MAG => self.mag_enabled,
            _ => false,
        }
    }

    fn available_sensors(&self) -> Vec<&'static str> {
        vec![SENSOR_ACCEL, SENSOR_GYRO, SENSOR_MAG]
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
            accel_enabled,
            gyro_enabled,
            mag_enabled,
            ..
        } = self;
        let Some(dev) = device.as_mut() else {
            return;
        };

        // Um timestamp por ciclo, compartilhado por todas as leituras mesmo
        // com cada vetor na sua própria transação.
        let ts = clock.capture();

        let mut poll = || -> Result<(), DeviceError> {
            if *accel_enabled {
                push_axes(output, &ACCEL_AXES, ts, dev.read_acceleration()?);
            }
            if *gyro_enabled {
                push_axes(output, &GYRO_AXES, ts, dev.read_angular_velocity()?);
            }
            if *mag_enabled {
                push_axes(output, &MAG_AXES, ts, dev.read_magnetic_field()?);
            }
            // Temperatura auxiliar: sempre lida, sem flag próprio
            output.push(Reading::new(SENSOR_IMU_TEMPERATURE, ts, dev.read_temperature()?));
            Ok(())
        };

        if let Err(e) = poll() {
            warn!("falha ao coletar do chip inercial; ciclo truncado: {e}");
        }
    }

    fn close_quietly(&mut self) {
        if let Some(dev) = self.device.take() {
            if let Err(e) = dev.close() {
                debug!("erro ao fechar o chip inercial (ignorado): {e}");
            }
        }
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
