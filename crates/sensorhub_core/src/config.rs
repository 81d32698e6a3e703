//! Configuração local via TOML.
//!
//! Define o ponto de partida do processo (endpoint de transporte, taxas
//! iniciais, barramentos); a configuração *remota* ([`crate::DeviceConfig`])
//! chega pelo fio e pode sobrescrever as taxas em runtime.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Endpoint de transporte do hub.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// IP do serviço de telemetria
    pub dest_ip: String,
    /// Porta UDP de destino dos payloads outbound
    pub telemetry_port: u16,
    /// Porta local onde mensagens de configuração são recebidas
    pub config_listen_port: u16,
    /// IP local para bind (vazio = todas as interfaces)
    pub bind_ip: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            dest_ip: "127.0.0.1".into(),
            telemetry_port: 5060,
            config_listen_port: 5061,
            bind_ip: String::new(),
        }
    }
}

/// Taxas iniciais de publicação (até uma config remota sobrescrever).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatesConfig {
    /// Eventos de telemetria por hora
    pub telemetry_events_per_hour: u32,
    /// Atualizações de estado por hora
    pub state_updates_per_hour: u32,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            telemetry_events_per_hour: 120,
            state_updates_per_hour: 12,
        }
    }
}

/// Identificadores de barramento dos chips físicos.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Barramento do chip ambiental
    pub env_bus: String,
    /// Barramento do chip inercial
    pub imu_bus: String,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            env_bus: "I2C1".into(),
            imu_bus: "I2C1".into(),
        }
    }
}

/// Configuração raiz do hub.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    pub transport: TransportConfig,
    pub rates: RatesConfig,
    pub buses: BusConfig,
}

impl HubConfig {
    /// Carrega configuração de um arquivo TOML.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<HubConfig>(&content) {
                    Ok(config) => {
                        info!("Configuração carregada de {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Erro ao parsear {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Erro ao ler {}: {}", path.display(), e);
                }
            }
        }

        info!("Usando configuração padrão");
        HubConfig::default()
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = toml::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, content).map_err(|e| e.to_string())?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Retorna o caminho padrão do config.toml.
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join("config.toml")
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.transport.dest_ip.is_empty() {
            errors.push("IP de destino não pode ser vazio".into());
        }
        if self.transport.telemetry_port == 0 {
            errors.push("Porta de telemetria não pode ser 0".into());
        }
        if self.transport.config_listen_port == 0 {
            errors.push("Porta de configuração não pode ser 0".into());
        }
        if self.rates.telemetry_events_per_hour > 3600 {
            errors.push(format!(
                "Taxa de telemetria inválida: {} (máximo 3600/h)",
                self.rates.telemetry_events_per_hour
            ));
        }
        if self.buses.env_bus.is_empty() || self.buses.imu_bus.is_empty() {
            errors.push("Identificador de barramento não pode ser vazio".into());
        }

        errors
    }
}
