use crate::clock::ClockPolicy;
use arena_gameplay::HandControl;
use arena_gameplay::TableConfig;

/// Everything the host needs at startup: the table rules plus the
/// transport and control knobs around them.
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub table: TableConfig,
    pub hand_control: HandControl,
    pub clock: ClockPolicy,
    /// Default delivery mode for spectators that do not pick one.
    pub presentation: bool,
    pub presentation_delay_ms: u64,
    pub require_join_code: bool,
    pub bind_addr: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            table: TableConfig::default(),
            hand_control: HandControl::Auto,
            clock: ClockPolicy::WallClock,
            presentation: false,
            presentation_delay_ms: 1_500,
            require_join_code: false,
            bind_addr: "0.0.0.0:8765".to_string(),
        }
    }
}

impl HostConfig {
    /// Tournament preset: operator-gated hands with a crash-fair clock.
    pub fn operator_controlled(mut self) -> Self {
        self.hand_control = HandControl::Operator;
        self.clock = ClockPolicy::PauseOnDisconnect;
        self
    }
}
