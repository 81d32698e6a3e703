//! # SensorHub Collector
//!
//! Faz o poll dos sensores físicos no barramento, normaliza as leituras e
//! troca payloads JSON com o serviço remoto de telemetria via UDP: telemetria
//! e estado do dispositivo saem; configuração remota entra.
//!
//! ## Uso
//! ```bash
//! sensorhub_collector                  # usa config.toml ao lado do executável
//! RUST_LOG=debug sensorhub_collector   # logging detalhado
//! ```

mod collector;
mod device;
mod env_collector;
mod imu_collector;
mod registry;
mod sim;

use env_collector::EnvCollector;
use imu_collector::ImuCollector;
use registry::CollectorRegistry;
use sensorhub_core::{HubConfig, encode_device_state, encode_telemetry, parse_device_config};
use sim::{SimEnvDevice, SimImuDevice};
use std::net::UdpSocket;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Intervalo entre eventos para uma taxa por hora; `None` = pausado.
fn interval_for(rate_per_hour: u32) -> Option<Duration> {
    if rate_per_hour == 0 {
        None
    } else {
        Some(Duration::from_secs_f64(3600.0 / f64::from(rate_per_hour)))
    }
}

fn main() {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── Carregar config ──
    let config_path = HubConfig::default_path();
    let config = HubConfig::load(&config_path);

    // Salva config padrão se não existir
    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            warn!("Não foi possível salvar config padrão: {e}");
        }
    }
    for problem in config.validate() {
        warn!("Config inválida: {problem}");
    }

    // ── Coletores ──
    let mut registry = CollectorRegistry::new();
    registry.register(Box::new(EnvCollector::<SimEnvDevice>::new(&config.buses.env_bus)));
    registry.register(Box::new(ImuCollector::<SimImuDevice>::new(&config.buses.imu_bus)));

    let connected = registry.activate_all();
    info!("{connected} coletores conectados");

    // ── Socket UDP (telemetria outbound + config inbound) ──
    let bind_addr = if config.transport.bind_ip.is_empty() {
        format!("0.0.0.0:{}", config.transport.config_listen_port)
    } else {
        format!(
            "{}:{}",
            config.transport.bind_ip, config.transport.config_listen_port
        )
    };
    let sock = UdpSocket::bind(&bind_addr).expect("Falha ao criar socket UDP");
    sock.set_read_timeout(Some(Duration::from_millis(200))).ok();

    let dest_addr = format!(
        "{}:{}",
        config.transport.dest_ip, config.transport.telemetry_port
    );

    // Taxas atuais; uma config remota mais nova sobrescreve
    let mut telemetry_rate = config.rates.telemetry_events_per_hour;
    let mut state_rate = config.rates.state_updates_per_hour;

    // ── Banner ──
    println!();
    println!("══════════════════════════════════════════════");
    println!("   ⚡ SENSORHUB COLLECTOR – ATIVO");
    println!("══════════════════════════════════════════════");
    println!("  Destino:    {dest_addr}");
    println!("  Telemetria: {telemetry_rate}/h");
    println!("  Estado:     {state_rate}/h");
    println!("  Config em:  {bind_addr}");
    println!("══════════════════════════════════════════════");
    println!();

    // ── Loop principal ──
    let mut last_state_update: Option<Instant> = None;
    loop {
        let cycle_start = Instant::now();

        // Telemetria: um ciclo de poll por evento
        if interval_for(telemetry_rate).is_some() {
            let mut readings = Vec::new();
            registry.collect_all(&mut readings);

            match encode_telemetry(&readings) {
                Ok(msg) => match sock.send_to(msg.as_bytes(), &dest_addr) {
                    Ok(sent) => {
                        info!("→ {sent} bytes para {dest_addr} ({} leituras)", readings.len());
                    }
                    Err(e) => error!("Erro ao enviar telemetria: {e}"),
                },
                Err(e) => error!("Erro ao montar payload de telemetria: {e}"),
            }
        }

        // Estado do dispositivo, na cadência própria
        if let Some(interval) = interval_for(state_rate) {
            if last_state_update.is_none_or(|t| t.elapsed() >= interval) {
                let all = registry.all_sensors();
                let active = registry.active_sensors();
                match encode_device_state(
                    registry.applied_version(),
                    telemetry_rate,
                    state_rate,
                    &all,
                    &active,
                ) {
                    Ok(msg) => {
                        if let Err(e) = sock.send_to(msg.as_bytes(), &dest_addr) {
                            error!("Erro ao enviar estado: {e}");
                        }
                        last_state_update = Some(Instant::now());
                    }
                    Err(e) => error!("Erro ao montar payload de estado: {e}"),
                }
            }
        }

        // Escuta config inbound até o próximo ciclo
        let cycle = interval_for(telemetry_rate).unwrap_or(Duration::from_secs(1));
        let mut buf = [0u8; 4096];
        while cycle_start.elapsed() < cycle {
            match sock.recv_from(&mut buf) {
                Ok((size, addr)) => {
                    let payload = String::from_utf8_lossy(&buf[..size]);
                    match parse_device_config(&payload) {
                        Ok(remote) => {
                            if registry.apply_config(&remote) {
                                telemetry_rate = remote.telemetry_events_per_hour;
                                state_rate = remote.state_updates_per_hour;
                                if remote.alert == "ON" {
                                    warn!("⚠ ALERTA remoto ativado (config v{})", remote.version);
                                }
                            }
                        }
                        // O erro carrega o payload ofensor na íntegra
                        Err(e) => warn!("Config inválida de {addr}: {e}"),
                    }
                }
                Err(ref e)
                    if e.kind() == std::io::ErrorKind::TimedOut
                        || e.kind() == std::io::ErrorKind::WouldBlock => {}
                Err(e) => warn!("Erro ao receber UDP: {e}"),
            }
        }
    }
}
