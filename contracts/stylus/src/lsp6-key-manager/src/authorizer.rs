//! Permission verification: maps a decoded payload to the permissions its caller must hold,
//! then checks the caller's allow-lists for anything not covered by a SUPER permission.

use alloc::vec::Vec;

use stylus_sdk::alloy_primitives::{Address, B256, U256};

use lsp6_key_manager_types::{
    AllowedCalls, AllowedDataKeys, CallRestriction, CallTypes, DataKeyRestriction, Erc725Profile, OperationType,
    PermissionDataKey, Permissions,
};

use crate::{
    config::KeyManagerConfig,
    decoder::{DecodedOperation, ExecuteCall},
    errors::{
        CallingKeyManagerNotAllowed, CannotSendValueToSetData, DelegateCallDisallowedViaKeyManager,
        ERC725X_MsgValueDisallowedInStaticCall, InvalidEncodedAllowedCalls, InvalidEncodedAllowedERC725YDataKeys,
        InvalidWhitelistedCall, KeyManagerError, LSP14CannotTransferOwnershipToSelf, NoCallsAllowed,
        NoERC725YDataKeysAllowed, NotAllowedCall, NotAllowedERC725YDataKey,
    },
    permission_store::PermissionStore,
};

/// What writing one data key demands of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyRequirement {
    /// A fixed permission; the key bypasses the data-key allow-list.
    Permission(Permissions),
    /// SETDATA, plus the allow-list unless the caller has SUPER_SETDATA.
    SetData,
}

pub struct AuthorizationEngine<'a, P: Erc725Profile + ?Sized> {
    profile: &'a P,
    store: PermissionStore<'a, P>,
    key_manager: Address,
    config: KeyManagerConfig,
}

impl<'a, P: Erc725Profile + ?Sized> AuthorizationEngine<'a, P> {
    pub fn new(profile: &'a P, key_manager: Address, config: KeyManagerConfig) -> Self {
        Self {
            profile,
            store: PermissionStore::new(profile),
            key_manager,
            config,
        }
    }

    pub fn store(&self) -> &PermissionStore<'a, P> {
        &self.store
    }

    /// Decide whether `caller` may have the profile run `operation` with `msg_value` attached.
    pub fn authorize(
        &self,
        caller: Address,
        msg_value: U256,
        operation: &DecodedOperation,
        is_relay: bool,
    ) -> Result<(), KeyManagerError> {
        let permissions = self.store.get_permissions(caller)?;
        if permissions.is_empty() {
            return Err(KeyManagerError::no_permissions_set(caller));
        }
        if is_relay {
            require(caller, permissions, Permissions::EXECUTE_RELAY_CALL)?;
        }

        match operation {
            DecodedOperation::SetData { key, value } => {
                if !msg_value.is_zero() {
                    return Err(KeyManagerError::CannotSendValueToSetData(CannotSendValueToSetData {}));
                }
                self.verify_set_data(caller, permissions, &[*key], &[value.as_slice()])
            }
            DecodedOperation::SetDataBatch { keys, values } => {
                if !msg_value.is_zero() {
                    return Err(KeyManagerError::CannotSendValueToSetData(CannotSendValueToSetData {}));
                }
                let values: Vec<&[u8]> = values.iter().map(|v| v.as_slice()).collect();
                self.verify_set_data(caller, permissions, keys, &values)
            }
            DecodedOperation::Execute(call) => self.verify_execute(caller, permissions, call),
            DecodedOperation::ExecuteBatch(calls) => {
                for call in calls {
                    self.verify_execute(caller, permissions, call)?;
                }
                Ok(())
            }
            DecodedOperation::TransferOwnership { new_owner } => {
                if *new_owner == self.profile.address() {
                    return Err(KeyManagerError::CannotTransferOwnershipToSelf(
                        LSP14CannotTransferOwnershipToSelf {},
                    ));
                }
                require(caller, permissions, Permissions::CHANGEOWNER)
            }
            DecodedOperation::AcceptOwnership => {
                // identity-based: only the manager the profile is waiting on may accept
                if self.profile.pending_owner()? != self.key_manager {
                    return Err(KeyManagerError::no_permissions_set(self.key_manager));
                }
                Ok(())
            }
            DecodedOperation::RenounceOwnership => require(caller, permissions, Permissions::CHANGEOWNER),
        }
    }

    /// `setData` / `setDataBatch`: check each key's permission in order, then run the
    /// allow-list over the keys that only SETDATA governs.
    fn verify_set_data(
        &self,
        caller: Address,
        permissions: Permissions,
        keys: &[B256],
        values: &[&[u8]],
    ) -> Result<(), KeyManagerError> {
        let check_allow_list = !permissions.has_all(Permissions::SUPER_SETDATA);
        let mut skip = Vec::with_capacity(keys.len());
        let mut generic_keys = false;

        for (key, value) in keys.iter().zip(values.iter()) {
            match self.required_for_key(*key, value)? {
                KeyRequirement::Permission(p) => {
                    require(caller, permissions, p)?;
                    skip.push(true);
                }
                KeyRequirement::SetData => {
                    if check_allow_list && !generic_keys {
                        require(caller, permissions, Permissions::SETDATA)?;
                    }
                    generic_keys = true;
                    skip.push(false);
                }
            }
        }

        if !(generic_keys && check_allow_list) {
            return Ok(());
        }
        let allowed: AllowedDataKeys = self.store.get_allowed_data_keys(caller)?;
        allowed.verify_multiple_keys(keys, &skip).map_err(|e| match e {
            DataKeyRestriction::Empty => {
                KeyManagerError::NoERC725YDataKeysAllowed(NoERC725YDataKeysAllowed { from: caller })
            }
            DataKeyRestriction::NotAllowed(key) => KeyManagerError::NotAllowedERC725YDataKey(NotAllowedERC725YDataKey {
                from: caller,
                disallowedKey: key,
            }),
        })
    }

    fn required_for_key(&self, key: B256, value: &[u8]) -> Result<KeyRequirement, KeyManagerError> {
        let add_or_edit = |adding: bool| {
            KeyRequirement::Permission(if adding {
                Permissions::ADDCONTROLLER
            } else {
                Permissions::EDITPERMISSIONS
            })
        };

        match PermissionDataKey::parse(key)? {
            PermissionDataKey::ArrayLength => {
                if value.len() != 16 {
                    return Err(KeyManagerError::invalid_data_value(key, value));
                }
                let mut buf = [0u8; 16];
                buf.copy_from_slice(value);
                let new_length = u128::from_be_bytes(buf);
                let current_length = self.store.get_controller_count()?;
                Ok(add_or_edit(new_length > current_length))
            }
            PermissionDataKey::ArrayIndex(_) => {
                if !value.is_empty() && value.len() != 20 {
                    return Err(KeyManagerError::invalid_data_value(key, value));
                }
                Ok(add_or_edit(self.store.raw(key)?.is_empty()))
            }
            PermissionDataKey::Permissions(controller) => {
                if !value.is_empty() && value.len() != 32 {
                    return Err(KeyManagerError::invalid_data_value(key, value));
                }
                Ok(add_or_edit(self.store.get_permissions(controller)?.is_empty()))
            }
            PermissionDataKey::AllowedCalls(_) => {
                if AllowedCalls::decode(value).is_err() {
                    return Err(KeyManagerError::InvalidEncodedAllowedCalls(InvalidEncodedAllowedCalls {
                        allowedCallsValue: value.to_vec().into(),
                    }));
                }
                Ok(add_or_edit(self.store.raw(key)?.is_empty()))
            }
            PermissionDataKey::AllowedDataKeys(_) => {
                if AllowedDataKeys::decode(value).is_err() {
                    return Err(KeyManagerError::InvalidEncodedAllowedERC725YDataKeys(
                        InvalidEncodedAllowedERC725YDataKeys {
                            value: value.to_vec().into(),
                        },
                    ));
                }
                Ok(add_or_edit(self.store.raw(key)?.is_empty()))
            }
            PermissionDataKey::UniversalReceiverDelegate(_) => {
                Ok(KeyRequirement::Permission(if self.store.raw(key)?.is_empty() {
                    Permissions::ADDUNIVERSALRECEIVERDELEGATE
                } else {
                    Permissions::CHANGEUNIVERSALRECEIVERDELEGATE
                }))
            }
            PermissionDataKey::Lsp17Extension(_) => Ok(KeyRequirement::Permission(if self.store.raw(key)?.is_empty() {
                Permissions::ADDEXTENSIONS
            } else {
                Permissions::CHANGEEXTENSIONS
            })),
            PermissionDataKey::Generic(_) => Ok(KeyRequirement::SetData),
        }
    }

    fn verify_execute(
        &self,
        caller: Address,
        permissions: Permissions,
        call: &ExecuteCall,
    ) -> Result<(), KeyManagerError> {
        if call.target == self.key_manager {
            return Err(KeyManagerError::CallingKeyManagerNotAllowed(CallingKeyManagerNotAllowed {}));
        }

        match call.operation {
            OperationType::Create | OperationType::Create2 => {
                let mut required = Permissions::DEPLOY;
                if !call.value.is_zero() {
                    required |= Permissions::SUPER_TRANSFERVALUE;
                }
                require(caller, permissions, required)
            }
            OperationType::Call => self.verify_call(caller, permissions, call),
            OperationType::StaticCall => {
                if !call.value.is_zero() {
                    return Err(KeyManagerError::MsgValueDisallowedInStaticCall(
                        ERC725X_MsgValueDisallowedInStaticCall {},
                    ));
                }
                if permissions.has_any_super(Permissions::STATICCALL) {
                    return Ok(());
                }
                require(caller, permissions, Permissions::STATICCALL)?;
                self.verify_allowed_call(caller, CallTypes::STATICCALL, call)
            }
            OperationType::DelegateCall => {
                if !self.config.delegatecall_enabled {
                    return Err(KeyManagerError::DelegateCallDisallowedViaKeyManager(
                        DelegateCallDisallowedViaKeyManager {},
                    ));
                }
                if permissions.has_any_super(Permissions::DELEGATECALL) {
                    return Ok(());
                }
                require(caller, permissions, Permissions::DELEGATECALL)?;
                self.verify_allowed_call(caller, CallTypes::DELEGATECALL, call)
            }
        }
    }

    /// CALL carries two categories: the value transfer and the call itself (data, or
    /// neither data nor value). Each is covered by its plain permission plus the
    /// allow-list, or by its SUPER permission alone. Value is checked first.
    fn verify_call(&self, caller: Address, permissions: Permissions, call: &ExecuteCall) -> Result<(), KeyManagerError> {
        let has_value = !call.value.is_zero();
        let has_data = !call.data.is_empty();
        let mut required_types = CallTypes::NONE;

        if has_value && !permissions.has_any_super(Permissions::TRANSFERVALUE) {
            require(caller, permissions, Permissions::TRANSFERVALUE)?;
            required_types = required_types.union(CallTypes::VALUE);
        }
        if (has_data || !has_value) && !permissions.has_any_super(Permissions::CALL) {
            require(caller, permissions, Permissions::CALL)?;
            required_types = required_types.union(CallTypes::CALL);
        }

        if required_types.is_empty() {
            return Ok(());
        }
        self.verify_allowed_call(caller, required_types, call)
    }

    fn verify_allowed_call(
        &self,
        caller: Address,
        required: CallTypes,
        call: &ExecuteCall,
    ) -> Result<(), KeyManagerError> {
        let allowed = self.store.get_allowed_calls(caller)?;
        let selector = call.selector();
        allowed
            .verify(required, call.target, selector, |target, interface_id| {
                self.profile.supports_interface(target, interface_id)
            })
            .map_err(|e| match e {
                CallRestriction::Empty => KeyManagerError::NoCallsAllowed(NoCallsAllowed { from: caller }),
                CallRestriction::MalformedEntry => {
                    KeyManagerError::InvalidWhitelistedCall(InvalidWhitelistedCall { from: caller })
                }
                CallRestriction::NotAllowed => KeyManagerError::NotAllowedCall(NotAllowedCall {
                    from: caller,
                    to: call.target,
                    selector,
                }),
            })
    }
}

/// Fail with the name of the lowest missing bit of `required`.
pub fn require(caller: Address, permissions: Permissions, required: Permissions) -> Result<(), KeyManagerError> {
    match permissions.first_missing_name(required) {
        Some(name) => Err(KeyManagerError::not_authorised(caller, name)),
        None => Ok(()),
    }
}
