use alloy_primitives::U256;

/// ERC725X operation types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum OperationType {
    Call = 0,
    Create = 1,
    Create2 = 2,
    StaticCall = 3,
    DelegateCall = 4,
}

impl TryFrom<u8> for OperationType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OperationType::Call),
            1 => Ok(OperationType::Create),
            2 => Ok(OperationType::Create2),
            3 => Ok(OperationType::StaticCall),
            4 => Ok(OperationType::DelegateCall),
            _ => Err(()),
        }
    }
}

impl TryFrom<U256> for OperationType {
    type Error = ();

    fn try_from(value: U256) -> Result<Self, Self::Error> {
        if value > U256::from(u8::MAX) {
            return Err(());
        }
        OperationType::try_from(value.as_limbs()[0] as u8)
    }
}

impl OperationType {
    pub fn is_contract_creation(self) -> bool {
        matches!(self, OperationType::Create | OperationType::Create2)
    }
}
