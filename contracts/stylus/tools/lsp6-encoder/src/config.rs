use alloy_primitives::{Address, Bytes, FixedBytes};
use serde::{Deserialize, Serialize};

/// Controller setup file.
///
/// ```json
/// {
///   "existingControllers": 1,
///   "controllers": [{
///     "address": "0x…",
///     "permissions": ["CALL", "TRANSFERVALUE"],
///     "allowedCalls": [{ "callTypes": ["CALL", "VALUE"], "address": "0x…" }],
///     "allowedDataKeys": ["0x4e6f7465"]
///   }]
/// }
/// ```
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupFile {
    /// Current length of `AddressPermissions[]`; new controllers are appended after it.
    #[serde(default)]
    pub existing_controllers: u128,
    pub controllers: Vec<ControllerConfig>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerConfig {
    pub address: Address,
    /// Permission names, eg `SETDATA` or `ALL_PERMISSIONS`.
    pub permissions: Vec<String>,
    #[serde(default)]
    pub allowed_calls: Vec<AllowedCallConfig>,
    /// Full keys or key prefixes.
    #[serde(default)]
    pub allowed_data_keys: Vec<Bytes>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowedCallConfig {
    /// `VALUE`, `CALL`, `STATICCALL` or `DELEGATECALL`.
    pub call_types: Vec<String>,
    /// Omitted means any address.
    #[serde(default)]
    pub address: Option<Address>,
    /// ERC165 interface id; omitted means any.
    #[serde(default)]
    pub standard: Option<FixedBytes<4>>,
    /// Function selector; omitted means any.
    #[serde(default)]
    pub function: Option<FixedBytes<4>>,
}
