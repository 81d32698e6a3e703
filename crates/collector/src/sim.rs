//! Dispositivos simulados.
//!
//! Geram sinais determinísticos com deriva lenta para rodar o binário de
//! ponta a ponta sem hardware no barramento. Cumprem os mesmos contratos dos
//! drivers reais, incluindo a descoberta de capacidade do chip ambiental.

use crate::device::{DeviceError, EnvDevice, ImuDevice, Oversampling};
use tracing::debug;

/// Onda triangular em [-1, 1] com o período dado em ticks.
fn wave(tick: u32, period: u32) -> f32 {
    let phase = (tick % period) as f32 / period as f32;
    if phase < 0.5 {
        4.0 * phase - 1.0
    } else {
        3.0 - 4.0 * phase
    }
}

/// Chip ambiental simulado (com sensor de umidade presente).
pub struct SimEnvDevice {
    tick: u32,
}

impl SimEnvDevice {
    fn advance(&mut self) -> u32 {
        self.tick = self.tick.wrapping_add(1);
        self.tick
    }
}

impl EnvDevice for SimEnvDevice {
    fn open(bus: &str) -> Result<Self, DeviceError> {
        debug!("chip ambiental simulado aberto em {bus}");
        Ok(Self { tick: 0 })
    }

    fn has_humidity(&self) -> bool {
        true
    }

    fn set_temperature_oversampling(&mut self, _os: Oversampling) -> Result<(), DeviceError> {
        Ok(())
    }

    fn set_pressure_oversampling(&mut self, _os: Oversampling) -> Result<(), DeviceError> {
        Ok(())
    }

    fn set_humidity_oversampling(&mut self, _os: Oversampling) -> Result<(), DeviceError> {
        Ok(())
    }

    fn set_normal_mode(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }

    fn read_temperature_and_pressure(&mut self) -> Result<(f32, f32), DeviceError> {
        let t = self.advance();
        Ok((21.0 + 2.0 * wave(t, 120), 1013.0 + 4.0 * wave(t, 300)))
    }

    fn read_temperature(&mut self) -> Result<f32, DeviceError> {
        let t = self.advance();
        Ok(21.0 + 2.0 * wave(t, 120))
    }

    fn read_pressure(&mut self) -> Result<f32, DeviceError> {
        let t = self.advance();
        Ok(1013.0 + 4.0 * wave(t, 300))
    }

    fn read_humidity(&mut self) -> Result<f32, DeviceError> {
        let t = self.advance();
        Ok(48.0 + 6.0 * wave(t, 200))
    }

    fn close(self) -> Result<(), DeviceError> {
        Ok(())
    }
}

/// Chip inercial simulado (em repouso, com ruído leve).
pub struct SimImuDevice {
    tick: u32,
}

impl SimImuDevice {
    fn advance(&mut self) -> u32 {
        self.tick = self.tick.wrapping_add(1);
        self.tick
    }
}

impl ImuDevice for SimImuDevice {
    fn open(bus: &str) -> Result<Self, DeviceError> {
        debug!("chip inercial simulado aberto em {bus}");
        Ok(Self { tick: 0 })
    }

    fn read_acceleration(&mut self) -> Result<[f32; 3], DeviceError> {
        let t = self.advance();
        Ok([0.02 * wave(t, 50), 0.02 * wave(t, 70), 0.98 + 0.01 * wave(t, 90)])
    }

    fn read_angular_velocity(&mut self) -> Result<[f32; 3], DeviceError> {
        let t = self.advance();
        Ok([0.5 * wave(t, 40), 0.5 * wave(t, 60), 0.5 * wave(t, 80)])
    }

    fn read_magnetic_field(&mut self) -> Result<[f32; 3], DeviceError> {
        let t = self.advance();
        Ok([0.21 + 0.01 * wave(t, 110), 0.02, 0.43 + 0.01 * wave(t, 130)])
    }

    fn read_temperature(&mut self) -> Result<f32, DeviceError> {
        let t = self.advance();
        Ok(24.0 + 1.5 * wave(t, 150))
    }

    fn close(self) -> Result<(), DeviceError> {
        Ok(())
    }
}
