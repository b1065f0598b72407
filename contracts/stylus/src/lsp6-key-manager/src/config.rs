/// Runtime policy knobs of a key manager instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyManagerConfig {
    /// When false, every `DELEGATECALL` through the manager is rejected outright,
    /// regardless of the caller's DELEGATECALL / SUPER_DELEGATECALL bits.
    pub delegatecall_enabled: bool,
}

impl Default for KeyManagerConfig {
    fn default() -> Self {
        Self {
            delegatecall_enabled: true,
        }
    }
}
