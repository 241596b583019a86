//! Core type aliases and runtime utilities for the poker arena workspace.

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Stack sizes, bets, and pot amounts in chips.
pub type Chips = u32;
/// Seat index around the table, stable for the whole match.
pub type Position = usize;
/// Monotonic hand counter within a match.
pub type HandNo = u64;

/// Wire protocol version carried in every envelope.
pub const PROTOCOL_VERSION: u32 = 1;

/// Table identifier for the single hosted table.
pub const TABLE_ID: &str = "T-1";

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
