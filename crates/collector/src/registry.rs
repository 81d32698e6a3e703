//! Registro de coletores.
//!
//! Possui os coletores ativos, dirige os ciclos de coleta em sequência numa
//! única thread de controle e aplica a configuração remota. Um coletor em
//! falha nunca impede o poll do próximo.

use crate::collector::SensorCollector;
use sensorhub_core::{DeviceConfig, Reading};
use tracing::{debug, info};

/// Conjunto de coletores registrados, na ordem de registro.
#[derive(Default)]
pub struct CollectorRegistry {
    collectors: Vec<Box<dyn SensorCollector>>,
    /// Última versão de config aplicada; config repetida/antiga é ignorada
    applied_version: Option<u32>,
}

impl CollectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra um coletor; o registro passa a ser o dono.
    pub fn register(&mut self, collector: Box<dyn SensorCollector>) {
        self.collectors.push(collector);
    }

    /// Ativa todos os coletores e retorna quantos conectaram.
    ///
    /// Falha de ativação não é fatal: o coletor fica desconectado e o poll
    /// segue normalmente (anexando nada) até uma nova tentativa.
    pub fn activate_all(&mut self) -> usize {
        self.collectors.iter_mut().map(|c| c.activate()).filter(|&ok| ok).count()
    }

    /// Um ciclo de poll: coleta de cada coletor, em ordem, na mesma
    /// sequência de saída compartilhada.
    pub fn collect_all(&mut self, output: &mut Vec<Reading>) {
        for collector in &mut self.collectors {
            collector.collect_recent_readings(output);
        }
    }

    /// Todos os canais conhecidos, concatenados na ordem de registro.
    pub fn all_sensors(&self) -> Vec<&'static str> {
        self.collectors
            .iter()
            .flat_map(|c| c.available_sensors())
            .collect()
    }

    /// Canais habilitados, concatenados na ordem de registro.
    pub fn active_sensors(&self) -> Vec<&'static str> {
        self.collectors
            .iter()
            .flat_map(|c| c.enabled_sensors())
            .collect()
    }

    /// Versão da última config aplicada (0 = nenhuma).
    pub fn applied_version(&self) -> u32 {
        self.applied_version.unwrap_or(0)
    }

    /// Aplica uma config remota: habilita os canais listados e desabilita
    /// todos os demais conhecidos. Retorna `false` se a config foi ignorada
    /// por versão antiga ou repetida.
    pub fn apply_config(&mut self, config: &DeviceConfig) -> bool {
        if let Some(applied) = self.applied_version {
            if config.version <= applied {
                debug!("config v{} ignorada (aplicada: v{})", config.version, applied);
                return false;
            }
        }

        for collector in &mut self.collectors {
            for sensor in collector.available_sensors() {
                let wanted = config.active_sensors.iter().any(|s| s == sensor);
                collector.set_enabled(sensor, wanted);
            }
        }

        self.applied_version = Some(config.version);
        info!(
            "config v{} aplicada: {} canais ativos",
            config.version,
            self.active_sensors().len()
        );
        true
    }

    /// Fecha todos os coletores, liberando os handles de dispositivo.
    pub fn close_all(&mut self) {
        for collector in &mut self.collectors {
            collector.close_quietly();
        }
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
