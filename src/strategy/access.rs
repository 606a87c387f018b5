//! Capability checks for privileged strategy entry points.
//!
//! Callers pass the [`Role`] they act under into every mutating
//! operation; nothing is looked up from ambient state.

use crate::error::StrategyError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Strategy owner, the only role allowed to change configuration.
    Owner,
    /// Operator bot that rebalances, harvests and can pull the brake.
    Keeper,
    /// Share-accounting vault moving funds in and out of idle balances.
    Vault,
    /// Anyone else.
    Public,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Rebalance,
    Harvest,
    Panic,
    Unpause,
    Configure,
    Deposit,
    Withdraw,
}

impl Role {
    pub fn permits(self, action: Action) -> bool {
        match action {
            Action::Rebalance | Action::Harvest | Action::Panic | Action::Unpause => {
                matches!(self, Role::Owner | Role::Keeper)
            }
            Action::Configure => self == Role::Owner,
            Action::Deposit | Action::Withdraw => self == Role::Vault,
        }
    }

    pub fn require(self, action: Action) -> Result<(), StrategyError> {
        if self.permits(action) {
            Ok(())
        } else {
            Err(StrategyError::Unauthorized { role: self, action })
        }
    }
}
