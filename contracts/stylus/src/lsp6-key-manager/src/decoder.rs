use alloc::vec::Vec;

use alloy_sol_types::SolCall;
use stylus_sdk::alloy_primitives::{Address, FixedBytes, B256, U256};

use lsp6_key_manager_types::OperationType;

use crate::{interfaces::IERC725, utils::bytes::selector_of};

const SET_DATA: [u8; 4] = IERC725::setDataCall::SELECTOR;
const SET_DATA_BATCH: [u8; 4] = IERC725::setDataBatchCall::SELECTOR;
const EXECUTE: [u8; 4] = IERC725::executeCall::SELECTOR;
const EXECUTE_BATCH: [u8; 4] = IERC725::executeBatchCall::SELECTOR;
const TRANSFER_OWNERSHIP: [u8; 4] = IERC725::transferOwnershipCall::SELECTOR;
const ACCEPT_OWNERSHIP: [u8; 4] = IERC725::acceptOwnershipCall::SELECTOR;
const RENOUNCE_OWNERSHIP: [u8; 4] = IERC725::renounceOwnershipCall::SELECTOR;

/// Errors during payload decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Fewer than 4 bytes, or arguments that do not ABI-decode.
    Malformed,
    UnknownSelector(FixedBytes<4>),
    UnknownOperationType(U256),
    ExecuteParamsLengthMismatch,
    ExecuteParamsEmpty,
    DataKeysValuesLengthMismatch,
    DataKeysValuesEmpty,
}

/// One ERC725X call, as found in `execute` or one lane of `executeBatch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteCall {
    pub operation: OperationType,
    pub target: Address,
    pub value: U256,
    pub data: Vec<u8>,
}

impl ExecuteCall {
    /// First four bytes of the call data; zero when there are fewer.
    pub fn selector(&self) -> FixedBytes<4> {
        if self.data.len() < 4 {
            return FixedBytes::ZERO;
        }
        selector_of(&self.data)
    }
}

/// Payload the key manager is asked to forward to its profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedOperation {
    SetData { key: B256, value: Vec<u8> },
    SetDataBatch { keys: Vec<B256>, values: Vec<Vec<u8>> },
    Execute(ExecuteCall),
    ExecuteBatch(Vec<ExecuteCall>),
    TransferOwnership { new_owner: Address },
    AcceptOwnership,
    RenounceOwnership,
}

impl DecodedOperation {
    pub fn selector(&self) -> FixedBytes<4> {
        let selector = match self {
            DecodedOperation::SetData { .. } => SET_DATA,
            DecodedOperation::SetDataBatch { .. } => SET_DATA_BATCH,
            DecodedOperation::Execute(_) => EXECUTE,
            DecodedOperation::ExecuteBatch(_) => EXECUTE_BATCH,
            DecodedOperation::TransferOwnership { .. } => TRANSFER_OWNERSHIP,
            DecodedOperation::AcceptOwnership => ACCEPT_OWNERSHIP,
            DecodedOperation::RenounceOwnership => RENOUNCE_OWNERSHIP,
        };
        FixedBytes(selector)
    }
}

/// Decode a profile payload into a closed set of operations.
pub fn decode_operation(payload: &[u8]) -> Result<DecodedOperation, DecodeError> {
    if payload.len() < 4 {
        return Err(DecodeError::Malformed);
    }
    let selector = selector_of(payload);

    match selector.0 {
        SET_DATA => {
            let call = IERC725::setDataCall::abi_decode(payload, false).map_err(|_| DecodeError::Malformed)?;
            Ok(DecodedOperation::SetData {
                key: call.dataKey,
                value: call.dataValue.to_vec(),
            })
        }
        SET_DATA_BATCH => {
            let call = IERC725::setDataBatchCall::abi_decode(payload, false).map_err(|_| DecodeError::Malformed)?;
            if call.dataKeys.len() != call.dataValues.len() {
                return Err(DecodeError::DataKeysValuesLengthMismatch);
            }
            if call.dataKeys.is_empty() {
                return Err(DecodeError::DataKeysValuesEmpty);
            }
            Ok(DecodedOperation::SetDataBatch {
                keys: call.dataKeys,
                values: call.dataValues.into_iter().map(|v| v.to_vec()).collect(),
            })
        }
        EXECUTE => {
            dirty_address_word(payload, 1)?;
            let call = IERC725::executeCall::abi_decode(payload, false).map_err(|_| DecodeError::Malformed)?;
            Ok(DecodedOperation::Execute(execute_call(
                call.operationType,
                call.target,
                call.value,
                call.data.to_vec(),
            )?))
        }
        EXECUTE_BATCH => {
            let call = IERC725::executeBatchCall::abi_decode(payload, false).map_err(|_| DecodeError::Malformed)?;
            let n = call.operationsType.len();
            if call.targets.len() != n || call.values.len() != n || call.datas.len() != n {
                return Err(DecodeError::ExecuteParamsLengthMismatch);
            }
            if n == 0 {
                return Err(DecodeError::ExecuteParamsEmpty);
            }
            let mut calls = Vec::with_capacity(n);
            for i in 0..n {
                calls.push(execute_call(
                    call.operationsType[i],
                    call.targets[i],
                    call.values[i],
                    call.datas[i].to_vec(),
                )?);
            }
            Ok(DecodedOperation::ExecuteBatch(calls))
        }
        TRANSFER_OWNERSHIP => {
            dirty_address_word(payload, 0)?;
            let call =
                IERC725::transferOwnershipCall::abi_decode(payload, false).map_err(|_| DecodeError::Malformed)?;
            Ok(DecodedOperation::TransferOwnership {
                new_owner: call.newOwner,
            })
        }
        ACCEPT_OWNERSHIP => Ok(DecodedOperation::AcceptOwnership),
        RENOUNCE_OWNERSHIP => Ok(DecodedOperation::RenounceOwnership),
        _ => Err(DecodeError::UnknownSelector(selector)),
    }
}

/// Head words are decoded leniently, so an address argument's 12 high bytes are checked here.
fn dirty_address_word(payload: &[u8], word: usize) -> Result<(), DecodeError> {
    let start = 4 + 32 * word;
    match payload.get(start..start + 12) {
        Some(padding) if padding.iter().any(|b| *b != 0) => Err(DecodeError::Malformed),
        _ => Ok(()),
    }
}

fn execute_call(operation: U256, target: Address, value: U256, data: Vec<u8>) -> Result<ExecuteCall, DecodeError> {
    let operation = OperationType::try_from(operation).map_err(|_| DecodeError::UnknownOperationType(operation))?;
    Ok(ExecuteCall {
        operation,
        target,
        value,
        data,
    })
}
