//! Contrato polimórfico dos coletores de sensores.
//!
//! Um coletor por chip físico. O registro chama os métodos sempre na mesma
//! thread de controle; nenhum coletor é seguro para acesso concorrente — cada
//! um embrulha um handle exclusivo de barramento.

use sensorhub_core::Reading;
use std::time::{SystemTime, UNIX_EPOCH};

/// Contrato uniforme sobre chips fisicamente distintos.
///
/// Máquina de estados por instância:
/// `NOT_CONNECTED →(activate ok)→ CONNECTED →(close_quietly)→ NOT_CONNECTED`.
/// Falha de activate é um self-loop em NOT_CONNECTED. Toda operação é legal
/// nos dois estados; desconectado, o comportamento degrada para escrituração
/// de flags em vez de falhar.
pub trait SensorCollector {
    /// Abre o handle do dispositivo e aplica o estado de habilitação desejado.
    ///
    /// Idempotente enquanto conectado (no-op retornando `true`). Qualquer
    /// falha de abertura/configuração abandona a tentativa: a instância fica
    /// desconectada, a falha vai para o log e o retorno é `false`. Nunca
    /// propaga pânico ou erro ao chamador.
    fn activate(&mut self) -> bool;

    /// Atualiza o estado desejado de um canal.
    ///
    /// Desconectado, só o flag muda (vale no próximo `activate`). Conectado,
    /// o modo de amostragem também é empurrado ao chip; se o push falhar, o
    /// flag ainda é atualizado e a falha é logada e engolida — um canal mal
    /// configurado não bloqueia o resto do pipeline. Canal desconhecido ou
    /// ausente: no-op logado.
    fn set_enabled(&mut self, sensor: &str, enabled: bool);

    /// Consulta pura; nomes desconhecidos retornam `false`, e um canal
    /// fisicamente ausente retorna `false` independente do flag armazenado.
    fn is_enabled(&self, sensor: &str) -> bool;

    /// Lista fixa de canais do chip, filtrada aos fisicamente presentes.
    fn available_sensors(&self) -> Vec<&'static str>;

    /// Subconjunto habilitado de [`available_sensors`], na mesma ordem.
    ///
    /// [`available_sensors`]: SensorCollector::available_sensors
    fn enabled_sensors(&self) -> Vec<&'static str>;

    /// Executa um ciclo de poll e anexa zero ou mais leituras.
    ///
    /// Desconectado: no-op silencioso (o registro pode fazer poll de um
    /// coletor que nunca ativou sem caso especial). Canais que compartilham
    /// uma transação de barramento compartilham um timestamp de captura.
    /// Falha de leitura encerra o ciclo cedo mantendo as leituras já
    /// anexadas, logada e engolida.
    fn collect_recent_readings(&mut self, output: &mut Vec<Reading>);

    /// Libera o handle do dispositivo, engolindo qualquer falha de close.
    /// Seguro chamar repetidamente ou numa instância nunca ativada; os flags
    /// de habilitação sobrevivem à desconexão.
    fn close_quietly(&mut self);
}

/// Relógio de captura por coletor.
///
/// Timestamps nunca decrescem dentro da vida do processo, mesmo se o relógio
/// do sistema retroceder (ajuste de NTP).
#[derive(Debug, Default)]
pub struct CaptureClock {
    last_ms: u64,
}

impl CaptureClock {
    /// Timestamp da transação atual, em ms desde epoch.
    pub fn capture(&mut self) -> u64 {
        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        self.last_ms = self.last_ms.max(wall);
        self.last_ms
    }
}
