//! LSP14 two-step ownership of the controlled profile.
//!
//! Transfers are proposed by the owner and completed by the pending owner. Renouncing
//! takes two calls: the first opens a countdown, the second must land inside the
//! confirmation window that follows it.
//!
//! The key manager never holds this state; the profile does. [`Ownable2Step`] is the
//! profile-side machine, exported so in-memory ERC725 profiles used to simulate the key
//! manager off-chain follow the same window arithmetic as a deployed LSP14 profile.

use alloy_primitives::Address;

/// Blocks to wait after the first `renounceOwnership()` before the window opens.
pub const RENOUNCE_OWNERSHIP_CONFIRMATION_DELAY: u64 = 200;
/// Length of the confirmation window, in blocks.
pub const RENOUNCE_OWNERSHIP_CONFIRMATION_PERIOD: u64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipError {
    CallerNotOwner(Address),
    CallerNotPendingOwner(Address),
    CannotTransferOwnershipToSelf,
    /// Second renounce call arrived before the window opened.
    NotInRenounceOwnershipInterval { start: u64, end: u64 },
}

/// What a successful ownership call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipEvent {
    TransferStarted { previous_owner: Address, new_owner: Address },
    Transferred { previous_owner: Address, new_owner: Address },
    RenounceStarted { at_block: u64 },
    Renounced { previous_owner: Address },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownable2Step {
    owner: Address,
    pending_owner: Address,
    /// Block of the first renounce call; zero when no countdown is running.
    renounce_started_at: u64,
    delay: u64,
    period: u64,
}

impl Ownable2Step {
    pub fn new(owner: Address) -> Self {
        Self::with_window(
            owner,
            RENOUNCE_OWNERSHIP_CONFIRMATION_DELAY,
            RENOUNCE_OWNERSHIP_CONFIRMATION_PERIOD,
        )
    }

    pub fn with_window(owner: Address, delay: u64, period: u64) -> Self {
        Self {
            owner,
            pending_owner: Address::ZERO,
            renounce_started_at: 0,
            delay,
            period,
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn pending_owner(&self) -> Address {
        self.pending_owner
    }

    pub fn renounce_started_at(&self) -> u64 {
        self.renounce_started_at
    }

    /// `[start, end]` blocks in which a second renounce call completes the renounce.
    pub fn renounce_window(&self) -> Option<(u64, u64)> {
        if self.renounce_started_at == 0 {
            return None;
        }
        let start = self.renounce_started_at.saturating_add(self.delay);
        Some((start, start.saturating_add(self.period)))
    }

    /// Owner proposes `new_owner`; `this` is the owned contract itself.
    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
        this: Address,
    ) -> Result<OwnershipEvent, OwnershipError> {
        self.only_owner(caller)?;
        if new_owner == this {
            return Err(OwnershipError::CannotTransferOwnershipToSelf);
        }
        self.pending_owner = new_owner;
        self.renounce_started_at = 0;
        Ok(OwnershipEvent::TransferStarted {
            previous_owner: self.owner,
            new_owner,
        })
    }

    /// Pending owner completes the transfer. Any running renounce countdown is discarded.
    pub fn accept_ownership(&mut self, caller: Address) -> Result<OwnershipEvent, OwnershipError> {
        if caller != self.pending_owner || caller == Address::ZERO {
            return Err(OwnershipError::CallerNotPendingOwner(caller));
        }
        let previous_owner = self.owner;
        self.owner = caller;
        self.pending_owner = Address::ZERO;
        self.renounce_started_at = 0;
        Ok(OwnershipEvent::Transferred {
            previous_owner,
            new_owner: caller,
        })
    }

    pub fn renounce_ownership(
        &mut self,
        caller: Address,
        block_number: u64,
    ) -> Result<OwnershipEvent, OwnershipError> {
        self.only_owner(caller)?;

        if let Some((start, end)) = self.renounce_window() {
            if block_number < start {
                return Err(OwnershipError::NotInRenounceOwnershipInterval { start, end });
            }
            if block_number <= end {
                let previous_owner = self.owner;
                self.owner = Address::ZERO;
                self.pending_owner = Address::ZERO;
                self.renounce_started_at = 0;
                return Ok(OwnershipEvent::Renounced { previous_owner });
            }
            // window elapsed: fall through and restart the countdown
        }

        // zero means "not started", so block 0 is recorded as 1
        self.renounce_started_at = block_number.max(1);
        self.pending_owner = Address::ZERO;
        Ok(OwnershipEvent::RenounceStarted {
            at_block: self.renounce_started_at,
        })
    }

    fn only_owner(&self, caller: Address) -> Result<(), OwnershipError> {
        if caller != self.owner {
            return Err(OwnershipError::CallerNotOwner(caller));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const OWNER: Address = address!("000000000000000000000000000000000000000a");
    const NEXT: Address = address!("000000000000000000000000000000000000000b");
    const THIS: Address = address!("00000000000000000000000000000000000000c0");

    #[test]
    fn two_step_transfer() {
        let mut o = Ownable2Step::new(OWNER);
        assert_eq!(
            o.transfer_ownership(NEXT, NEXT, THIS),
            Err(OwnershipError::CallerNotOwner(NEXT))
        );
        o.transfer_ownership(OWNER, NEXT, THIS).unwrap();
        assert_eq!(o.owner(), OWNER);
        assert_eq!(o.pending_owner(), NEXT);

        assert_eq!(
            o.accept_ownership(OWNER),
            Err(OwnershipError::CallerNotPendingOwner(OWNER))
        );
        assert_eq!(
            o.accept_ownership(NEXT),
            Ok(OwnershipEvent::Transferred {
                previous_owner: OWNER,
                new_owner: NEXT
            })
        );
        assert_eq!(o.owner(), NEXT);
        assert_eq!(o.pending_owner(), Address::ZERO);
    }

    #[test]
    fn cannot_transfer_to_self() {
        let mut o = Ownable2Step::new(OWNER);
        assert_eq!(
            o.transfer_ownership(OWNER, THIS, THIS),
            Err(OwnershipError::CannotTransferOwnershipToSelf)
        );
    }

    #[test]
    fn renounce_requires_second_call_inside_window() {
        let mut o = Ownable2Step::new(OWNER);
        o.transfer_ownership(OWNER, NEXT, THIS).unwrap();

        assert_eq!(
            o.renounce_ownership(OWNER, 1_000),
            Ok(OwnershipEvent::RenounceStarted { at_block: 1_000 })
        );
        assert_eq!(o.pending_owner(), Address::ZERO);

        assert_eq!(
            o.renounce_ownership(OWNER, 1_199),
            Err(OwnershipError::NotInRenounceOwnershipInterval {
                start: 1_200,
                end: 1_400
            })
        );

        assert_eq!(
            o.renounce_ownership(OWNER, 1_200),
            Ok(OwnershipEvent::Renounced {
                previous_owner: OWNER
            })
        );
        assert_eq!(o.owner(), Address::ZERO);
    }

    #[test]
    fn renounce_restarts_after_window_elapses() {
        let mut o = Ownable2Step::new(OWNER);
        o.renounce_ownership(OWNER, 10).unwrap();
        assert_eq!(
            o.renounce_ownership(OWNER, 411),
            Ok(OwnershipEvent::RenounceStarted { at_block: 411 })
        );
        assert_eq!(o.owner(), OWNER);
        assert_eq!(o.renounce_window(), Some((611, 811)));
    }

    #[test]
    fn accept_resets_renounce_countdown() {
        let mut o = Ownable2Step::new(OWNER);
        o.renounce_ownership(OWNER, 10).unwrap();
        o.transfer_ownership(OWNER, NEXT, THIS).unwrap();
        o.accept_ownership(NEXT).unwrap();
        assert_eq!(o.renounce_window(), None);
    }
}
