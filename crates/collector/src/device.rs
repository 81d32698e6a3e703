//! Fronteira com os drivers de dispositivo.
//!
//! Os drivers reais de barramento ficam fora deste crate; aqui vivem apenas
//! os contratos que um handle de dispositivo cumpre e o erro de I/O comum.
//! Nenhuma operação falha é re-tentada neste nível — política de retry
//! pertence ao chamador.

/// Erros na fronteira do dispositivo.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("falha ao abrir dispositivo em {bus}: {reason}")]
    Open { bus: String, reason: String },

    #[error("falha de I/O: {0}")]
    Io(String),
}

/// Modo de amostragem por canal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Oversampling {
    /// Canal desligado (amostragem pulada)
    Skipped,
    /// Amostragem 1x
    X1,
}

impl Oversampling {
    /// Modo correspondente ao flag de habilitação de um canal.
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled { Self::X1 } else { Self::Skipped }
    }
}

/// Handle do chip ambiental (temperatura/pressão/umidade).
///
/// Aberto a partir do identificador do barramento. A presença do canal de
/// umidade varia por revisão do chip e é descoberta via [`has_humidity`]
/// depois do open.
///
/// [`has_humidity`]: EnvDevice::has_humidity
pub trait EnvDevice: Sized {
    fn open(bus: &str) -> Result<Self, DeviceError>;

    /// Descoberta de capacidade: esta unidade tem o sensor de umidade?
    fn has_humidity(&self) -> bool;

    fn set_temperature_oversampling(&mut self, os: Oversampling) -> Result<(), DeviceError>;
    fn set_pressure_oversampling(&mut self, os: Oversampling) -> Result<(), DeviceError>;
    fn set_humidity_oversampling(&mut self, os: Oversampling) -> Result<(), DeviceError>;

    /// Liga o chip em modo de medição contínua.
    fn set_normal_mode(&mut self) -> Result<(), DeviceError>;

    /// Temperatura e pressão em uma única transação de barramento.
    fn read_temperature_and_pressure(&mut self) -> Result<(f32, f32), DeviceError>;
    /// Temperatura (°C).
    fn read_temperature(&mut self) -> Result<f32, DeviceError>;
    /// Pressão atmosférica (hPa).
    fn read_pressure(&mut self) -> Result<f32, DeviceError>;
    /// Umidade relativa (%).
    fn read_humidity(&mut self) -> Result<f32, DeviceError>;

    fn close(self) -> Result<(), DeviceError>;
}

/// Handle do chip inercial (acelerômetro/giroscópio/magnetômetro).
pub trait ImuDevice: Sized {
    fn open(bus: &str) -> Result<Self, DeviceError>;

    /// Aceleração [x, y, z] em g — uma transação.
    fn read_acceleration(&mut self) -> Result<[f32; 3], DeviceError>;
    /// Velocidade angular [x, y, z] em °/s — uma transação.
    fn read_angular_velocity(&mut self) -> Result<[f32; 3], DeviceError>;
    /// Indução magnética [x, y, z] em gauss — uma transação.
    fn read_magnetic_field(&mut self) -> Result<[f32; 3], DeviceError>;
    /// Temperatura interna do chip (°C).
    fn read_temperature(&mut self) -> Result<f32, DeviceError>;

    fn close(self) -> Result<(), DeviceError>;
}
