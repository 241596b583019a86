//! Tournament Host Binary
//!
//! Reads its configuration from the environment, serves one table on
//! BIND_ADDR, and exits 0 when the match completes. Misconfiguration is
//! fatal at startup.
//!
//! Knobs: BIND_ADDR, SEATS, STARTING_STACK, SB, BB, MOVE_TIME_MS,
//! HAND_CONTROL (auto|operator), CLOCK (wall|pause), PRESENTATION
//! (off|on), PRESENTATION_DELAY_MS, REQUIRE_JOIN_CODE (off|on).

use anyhow::Context;
use arena_gameplay::HandControl;
use arena_gameplay::TableConfig;
use arena_gameroom::ClockPolicy;
use arena_gameroom::HostConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    arena_core::log();
    let config = config_from_env()?;
    log::info!(
        "starting host: {} seats, stacks {}, blinds {}/{}, move time {}ms",
        config.table.seats,
        config.table.starting_stack,
        config.table.sb,
        config.table.bb,
        config.table.move_time_ms
    );
    arena_server::run(config).await
}

fn config_from_env() -> anyhow::Result<HostConfig> {
    let defaults = HostConfig::default();
    let table = TableConfig {
        seats: var("SEATS", defaults.table.seats)?,
        starting_stack: var("STARTING_STACK", defaults.table.starting_stack)?,
        sb: var("SB", defaults.table.sb)?,
        bb: var("BB", defaults.table.bb)?,
        move_time_ms: var("MOVE_TIME_MS", defaults.table.move_time_ms)?,
        ..defaults.table
    };
    table.validate().context("invalid table configuration")?;

    let hand_control: HandControl = match std::env::var("HAND_CONTROL") {
        Ok(raw) => raw.parse().map_err(anyhow::Error::msg)?,
        Err(_) => defaults.hand_control,
    };
    // operator-run tournaments default to the crash-fair clock; auto mode
    // runs on the wall clock unless overridden
    let clock: ClockPolicy = match std::env::var("CLOCK") {
        Ok(raw) => raw.parse().map_err(anyhow::Error::msg)?,
        Err(_) => match hand_control {
            HandControl::Operator => ClockPolicy::PauseOnDisconnect,
            HandControl::Auto => ClockPolicy::WallClock,
        },
    };

    Ok(HostConfig {
        table,
        hand_control,
        clock,
        presentation: flag("PRESENTATION", defaults.presentation)?,
        presentation_delay_ms: var("PRESENTATION_DELAY_MS", defaults.presentation_delay_ms)?,
        require_join_code: flag("REQUIRE_JOIN_CODE", defaults.require_join_code)?,
        bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
    })
}

fn var<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {}: {}", key, e)),
        Err(_) => Ok(default),
    }
}

fn flag(key: &str, default: bool) -> anyhow::Result<bool> {
    match std::env::var(key) {
        Ok(raw) => match raw.to_lowercase().as_str() {
            "on" | "true" | "1" => Ok(true),
            "off" | "false" | "0" => Ok(false),
            other => Err(anyhow::anyhow!("invalid {}: {}", key, other)),
        },
        Err(_) => Ok(default),
    }
}
