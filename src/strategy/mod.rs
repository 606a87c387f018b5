//! The two-range strategy: keeps a `main` and an `alt` position centered
//! on the pool price, moves them only in calm markets, and vests harvested
//! fees.
//!
//! Every mutating call takes `&mut self` and the caller's [`Role`], so
//! calls are serialized and authorization is explicit. The withdraw,
//! compute and deposit steps of a rebalance are tracked in [`Phase`].

pub mod access;
pub mod calm_guard;
pub mod config;
pub mod pool;
pub mod range_sizer;
pub mod vesting;

#[cfg(test)]
mod mock_pool;

use crate::error::{Error, MathError, PoolError, StrategyError};
use crate::math::liquidity_amounts::{get_amounts_for_liquidity, get_liquidity_for_amounts};
use crate::math::price_math::raw_price_from_sqrt_price;
use crate::math::tick_math::get_sqrt_ratio_at_tick;
use access::{Action, Role};
use alloy_primitives::U256;
use calm_guard::CalmStatus;
use config::StrategyConfig;
use pool::{Pool, PoolState};
use range_sizer::{Position, PositionKind, RangeLayout, RangePlan, Skew, layout_ranges};
use vesting::LockedProfit;

/// Where the strategy is in its operation cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Withdrawing,
    Computing,
    Depositing,
    Paused,
}

impl Phase {
    pub fn can_transition_to(self, next: Phase) -> bool {
        use Phase::*;

        match (self, next) {
            (_, Paused) => true,
            (Idle, Withdrawing)
            | (Withdrawing, Computing)
            | (Computing, Depositing)
            | (Depositing, Idle)
            | (Paused, Idle) => true,
            // deposits deferred after a failed withdrawal
            (Computing, Idle) => true,
            _ => false,
        }
    }
}

/// A position currently holding liquidity in the pool.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Deployment {
    pub position: Position,
    pub liquidity: u128,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenAmounts {
    pub amount0: U256,
    pub amount1: U256,
}

impl TokenAmounts {
    pub fn new(amount0: U256, amount1: U256) -> Self {
        Self { amount0, amount1 }
    }

    pub fn is_zero(&self) -> bool {
        self.amount0.is_zero() && self.amount1.is_zero()
    }

    fn credit(&mut self, amount0: U256, amount1: U256) {
        self.amount0 = self.amount0.saturating_add(amount0);
        self.amount1 = self.amount1.saturating_add(amount1);
    }

    fn take(&mut self) -> TokenAmounts {
        std::mem::take(self)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PositionsSnapshot {
    pub main: Option<Deployment>,
    pub alt: Option<Deployment>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DepositOutcome {
    Deposited {
        liquidity: u128,
        used0: U256,
        used1: U256,
    },
    /// Idle balances could not back any liquidity in the range.
    Skipped,
    /// The pool refused the mint; the funds stayed idle.
    Rejected { reason: String },
    /// Not attempted because a withdrawal in the same rebalance failed.
    Deferred,
}

impl DepositOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, DepositOutcome::Rejected { .. })
    }
}

/// Principal and fees pulled out of the pool by a withdrawal.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct WithdrawReport {
    pub principal: TokenAmounts,
    pub fees: TokenAmounts,
}

impl WithdrawReport {
    fn absorb(&mut self, other: WithdrawReport) {
        self.principal
            .credit(other.principal.amount0, other.principal.amount1);
        self.fees.credit(other.fees.amount0, other.fees.amount1);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WithdrawOutcome {
    /// Nothing was deployed in this slot.
    Empty,
    Withdrawn(WithdrawReport),
    /// The pool did not release the position; it is still tracked as
    /// deployed. Fees collected before the failure are kept.
    Failed { reason: String },
}

impl WithdrawOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, WithdrawOutcome::Failed { .. })
    }
}

/// Totals over a main and an alt withdrawal.
fn sum_withdrawals(outcomes: [&WithdrawOutcome; 2]) -> WithdrawReport {
    let mut total = WithdrawReport::default();
    for outcome in outcomes {
        if let WithdrawOutcome::Withdrawn(report) = outcome {
            total.absorb(*report);
        }
    }
    total
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RebalanceReport {
    pub plan: RangePlan,
    pub main_withdrawal: WithdrawOutcome,
    pub alt_withdrawal: WithdrawOutcome,
    pub main: DepositOutcome,
    pub alt: DepositOutcome,
}

impl RebalanceReport {
    pub fn withdrawn(&self) -> WithdrawReport {
        sum_withdrawals([&self.main_withdrawal, &self.alt_withdrawal])
    }

    /// Whether a withdrawal failed or the pool rejected a mint.
    pub fn partial(&self) -> bool {
        self.main_withdrawal.is_failed()
            || self.alt_withdrawal.is_failed()
            || self.main.is_rejected()
            || self.alt.is_rejected()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanicReport {
    pub main: WithdrawOutcome,
    pub alt: WithdrawOutcome,
}

impl PanicReport {
    pub fn withdrawn(&self) -> WithdrawReport {
        sum_withdrawals([&self.main, &self.alt])
    }

    /// Whether every deployed position made it back to idle.
    pub fn is_complete(&self) -> bool {
        !self.main.is_failed() && !self.alt.is_failed()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HarvestFollowUp {
    Rebalanced(RebalanceReport),
    SkippedNotCalm(CalmStatus),
    SkippedPaused,
    /// Fees were locked but a collection or the follow-up rebalance could
    /// not go ahead.
    Failed { reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HarvestReport {
    /// Fees recognized by this harvest, including those collected earlier
    /// by withdrawals.
    pub fees: TokenAmounts,
    pub follow_up: HarvestFollowUp,
}

pub struct Strategy<P> {
    pool: P,
    config: StrategyConfig,
    phase: Phase,
    main: Option<Deployment>,
    alt: Option<Deployment>,
    idle: TokenAmounts,
    // fees pulled out by withdrawals, held back until the next harvest
    unharvested: TokenAmounts,
    locked: LockedProfit,
}

impl<P: Pool> Strategy<P> {
    /// Creates an idle strategy with no positions, validating `config`
    /// against the pool's spacing.
    pub fn new(pool: P, config: StrategyConfig) -> Result<Self, Error> {
        let state = pool.current_state()?;
        config.validate(state.tick_spacing)?;

        Ok(Self {
            pool,
            config,
            phase: Phase::Idle,
            main: None,
            alt: None,
            idle: TokenAmounts::default(),
            unharvested: TokenAmounts::default(),
            locked: LockedProfit::default(),
        })
    }

    pub fn pool(&self) -> &P {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut P {
        &mut self.pool
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn idle_balances(&self) -> TokenAmounts {
        self.idle
    }

    pub fn unharvested_fees(&self) -> TokenAmounts {
        self.unharvested
    }

    pub fn positions_snapshot(&self) -> PositionsSnapshot {
        PositionsSnapshot {
            main: self.main,
            alt: self.alt,
        }
    }

    /// Locked profit not yet released at `now`.
    pub fn locked_profit(&self, now: u64) -> TokenAmounts {
        let (amount0, amount1) = self.locked.unvested(now);
        TokenAmounts::new(amount0, amount1)
    }

    /// Calm-guard outcome against a fresh pool read.
    pub fn calm_status(&self) -> Result<CalmStatus, Error> {
        let state = self.pool.current_state()?;
        Ok(self.calm_status_at(&state))
    }

    /// `false` whenever the guard cannot positively confirm calm, including
    /// when the pool cannot be read.
    pub fn is_calm(&self) -> bool {
        self.calm_status().is_ok_and(CalmStatus::is_calm)
    }

    /// Idle balances plus the value of both positions at the current pool
    /// price, minus profit still vesting at `now`.
    pub fn reported_balance(&self, now: u64) -> Result<TokenAmounts, Error> {
        let state = self.pool.current_state()?;
        let mut total = self.idle;

        for deployment in [self.main, self.alt].into_iter().flatten() {
            let (amount0, amount1) = position_value(&state, &deployment)?;
            total.credit(amount0, amount1);
        }

        let (locked0, locked1) = self.locked.unvested(now);
        Ok(TokenAmounts::new(
            total.amount0.saturating_sub(locked0),
            total.amount1.saturating_sub(locked1),
        ))
    }

    /// Totals reported to the vault, see [`Strategy::reported_balance`].
    pub fn balances(&self, now: u64) -> Result<(U256, U256), Error> {
        let reported = self.reported_balance(now)?;
        Ok((reported.amount0, reported.amount1))
    }

    pub fn set_config(&mut self, role: Role, config: StrategyConfig) -> Result<(), Error> {
        role.require(Action::Configure)?;
        self.ensure_settled()?;

        let state = self.pool.current_state()?;
        config.validate(state.tick_spacing)?;

        tracing::info!(
            position_width = config.position_width,
            max_tick_deviation = config.max_tick_deviation,
            twap_interval_seconds = config.twap_interval_seconds,
            "strategy config updated"
        );
        self.config = config;
        Ok(())
    }

    /// Credits funds the vault transferred in to the idle balances.
    pub fn deposit(&mut self, role: Role, amount0: U256, amount1: U256) -> Result<(), Error> {
        role.require(Action::Deposit)?;
        self.ensure_settled()?;
        self.idle.credit(amount0, amount1);
        Ok(())
    }

    /// Releases idle funds to the vault. Deployed liquidity is not touched.
    pub fn withdraw(&mut self, role: Role, amount0: U256, amount1: U256) -> Result<(), Error> {
        role.require(Action::Withdraw)?;
        self.ensure_settled()?;

        if self.idle.amount0 < amount0 || self.idle.amount1 < amount1 {
            return Err(StrategyError::InsufficientIdle.into());
        }
        self.idle.amount0 -= amount0;
        self.idle.amount1 -= amount1;
        Ok(())
    }

    /// Moves both positions to freshly sized ranges around the current
    /// tick.
    ///
    /// Fails without touching anything when the market is not calm or the
    /// new ranges cannot be placed. Once the first position is touched the
    /// call always returns a report: a withdrawal the pool refuses defers
    /// both deposits, and a mint the pool rejects leaves its funds idle.
    pub fn rebalance(&mut self, role: Role) -> Result<RebalanceReport, Error> {
        role.require(Action::Rebalance)?;
        self.ensure_idle()?;

        let state = self.pool.current_state()?;
        self.require_calm(&state)?;
        self.rebalance_at(state)
    }

    /// Collects fees from both positions and locks them, together with
    /// fees collected by earlier withdrawals, into the vesting schedule.
    /// Rebalances afterwards when not paused and calm.
    ///
    /// Only the role and phase checks return errors. Anything that goes
    /// wrong after the first collection is reported as
    /// [`HarvestFollowUp::Failed`], with the fees gathered so far locked.
    pub fn harvest(&mut self, role: Role, now: u64) -> Result<HarvestReport, Error> {
        role.require(Action::Harvest)?;
        self.ensure_settled()?;

        let mut collect_failure = None;
        for kind in [PositionKind::Main, PositionKind::Alt] {
            let Some(deployment) = *self.slot(kind) else {
                continue;
            };
            let position = deployment.position;
            match self
                .pool
                .collect_fees(position.tick_lower, position.tick_upper)
            {
                Ok((fee0, fee1)) => self.unharvested.credit(fee0, fee1),
                Err(err) => {
                    tracing::warn!(?kind, %err, "fee collection failed");
                    collect_failure = Some(format!("collecting {kind:?} fees: {err}"));
                    break;
                }
            }
        }

        let fees = self.unharvested.take();
        self.idle.credit(fees.amount0, fees.amount1);
        self.locked.lock(now, fees.amount0, fees.amount1);

        tracing::info!(
            fee0 = %fees.amount0,
            fee1 = %fees.amount1,
            locked0 = %self.locked.amount0,
            locked1 = %self.locked.amount1,
            now,
            "harvested fees"
        );

        let follow_up = match collect_failure {
            Some(reason) => HarvestFollowUp::Failed { reason },
            None if self.phase == Phase::Paused => HarvestFollowUp::SkippedPaused,
            None => self.rebalance_after_harvest(),
        };

        Ok(HarvestReport { fees, follow_up })
    }

    /// Pauses the strategy and pulls both positions back to idle.
    ///
    /// Works from any phase and never consults the calm guard. Each
    /// position is withdrawn independently; one the pool refuses to release
    /// stays tracked and is reported as failed while the strategy still
    /// ends up paused.
    pub fn panic(&mut self, role: Role) -> Result<PanicReport, Error> {
        role.require(Action::Panic)?;

        if self.phase != Phase::Paused {
            self.transition(Phase::Paused)?;
        }
        let report = PanicReport {
            main: self.withdraw_position(PositionKind::Main),
            alt: self.withdraw_position(PositionKind::Alt),
        };

        let withdrawn = report.withdrawn();
        if report.is_complete() {
            tracing::info!(
                amount0 = %withdrawn.principal.amount0,
                amount1 = %withdrawn.principal.amount1,
                "strategy paused, liquidity withdrawn"
            );
        } else {
            tracing::warn!(
                amount0 = %withdrawn.principal.amount0,
                amount1 = %withdrawn.principal.amount1,
                "strategy paused, some liquidity still deployed"
            );
        }
        Ok(report)
    }

    /// Lifts a pause. Liquidity stays idle until the next rebalance.
    pub fn unpause(&mut self, role: Role) -> Result<(), Error> {
        role.require(Action::Unpause)?;
        if self.phase != Phase::Paused {
            return Err(StrategyError::NotPaused.into());
        }
        self.transition(Phase::Idle)?;
        tracing::info!("strategy unpaused");
        Ok(())
    }

    fn calm_status_at(&self, state: &PoolState) -> CalmStatus {
        let twap_tick = match self
            .pool
            .time_weighted_tick(self.config.twap_interval_seconds)
        {
            Ok(tick) => Some(tick),
            Err(err) => {
                tracing::debug!(%err, "time-weighted tick unavailable");
                None
            }
        };
        calm_guard::evaluate(state.tick, twap_tick, self.config.deviation_tolerance())
    }

    fn require_calm(&self, state: &PoolState) -> Result<(), StrategyError> {
        match self.calm_status_at(state) {
            CalmStatus::Calm { .. } => Ok(()),
            CalmStatus::Volatile { deviation } => {
                let max = self.config.deviation_tolerance();
                tracing::warn!(tick = state.tick, deviation, max, "market not calm");
                Err(StrategyError::NotCalm { deviation, max })
            }
            CalmStatus::Indeterminate => {
                tracing::warn!(tick = state.tick, "calm check indeterminate");
                Err(StrategyError::OracleUnavailable)
            }
        }
    }

    fn ensure_idle(&self) -> Result<(), StrategyError> {
        match self.phase {
            Phase::Idle => Ok(()),
            Phase::Paused => Err(StrategyError::Paused),
            phase => Err(StrategyError::RebalanceInFlight(phase)),
        }
    }

    fn ensure_settled(&self) -> Result<(), StrategyError> {
        match self.phase {
            Phase::Idle | Phase::Paused => Ok(()),
            phase => Err(StrategyError::RebalanceInFlight(phase)),
        }
    }

    fn transition(&mut self, next: Phase) -> Result<(), StrategyError> {
        if !self.phase.can_transition_to(next) {
            return Err(StrategyError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::debug!(from = ?self.phase, to = ?next, "phase transition");
        self.phase = next;
        Ok(())
    }

    fn slot(&self, kind: PositionKind) -> &Option<Deployment> {
        match kind {
            PositionKind::Main => &self.main,
            PositionKind::Alt => &self.alt,
        }
    }

    fn slot_mut(&mut self, kind: PositionKind) -> &mut Option<Deployment> {
        match kind {
            PositionKind::Main => &mut self.main,
            PositionKind::Alt => &mut self.alt,
        }
    }

    fn rebalance_after_harvest(&mut self) -> HarvestFollowUp {
        let state = match self.pool.current_state() {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!(%err, "pool unreadable after harvest");
                return HarvestFollowUp::Failed {
                    reason: err.to_string(),
                };
            }
        };

        let status = self.calm_status_at(&state);
        if !status.is_calm() {
            tracing::debug!(?status, "harvest left positions in place");
            return HarvestFollowUp::SkippedNotCalm(status);
        }

        match self.rebalance_at(state) {
            Ok(report) => HarvestFollowUp::Rebalanced(report),
            Err(err) => {
                tracing::warn!(%err, "rebalance after harvest refused");
                HarvestFollowUp::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Errors only come from checks made before the first pool call.
    fn rebalance_at(&mut self, state: PoolState) -> Result<RebalanceReport, Error> {
        let price = raw_price_from_sqrt_price(state.sqrt_price_x96)?;
        let layout = layout_ranges(state.tick, state.tick_spacing, self.config.position_width)?;

        self.transition(Phase::Withdrawing)?;
        Ok(self.run_rebalance(&state, price, layout))
    }

    fn run_rebalance(&mut self, state: &PoolState, price: U256, layout: RangeLayout) -> RebalanceReport {
        let main_withdrawal = self.withdraw_position(PositionKind::Main);
        let alt_withdrawal = self.withdraw_position(PositionKind::Alt);

        self.advance(Phase::Computing);
        let plan = layout.plan(Skew::of(self.idle.amount0, self.idle.amount1, price));

        let (main, alt) = if main_withdrawal.is_failed() || alt_withdrawal.is_failed() {
            tracing::warn!("withdrawal failed, deposits deferred");
            (DepositOutcome::Deferred, DepositOutcome::Deferred)
        } else {
            self.advance(Phase::Depositing);
            (
                self.deposit_into(PositionKind::Main, plan.main, state),
                self.deposit_into(PositionKind::Alt, plan.alt, state),
            )
        };
        self.advance(Phase::Idle);

        let report = RebalanceReport {
            plan,
            main_withdrawal,
            alt_withdrawal,
            main,
            alt,
        };
        tracing::info!(
            tick = state.tick,
            main_lower = plan.main.tick_lower,
            main_upper = plan.main.tick_upper,
            alt_lower = plan.alt.tick_lower,
            alt_upper = plan.alt.tick_upper,
            alt_below = plan.skew.alt_below(),
            partial = report.partial(),
            "rebalanced"
        );
        report
    }

    // steps inside a running rebalance, always legal
    fn advance(&mut self, next: Phase) {
        debug_assert!(self.phase.can_transition_to(next));
        tracing::debug!(from = ?self.phase, to = ?next, "phase transition");
        self.phase = next;
    }

    fn withdraw_position(&mut self, kind: PositionKind) -> WithdrawOutcome {
        let Some(deployment) = *self.slot(kind) else {
            return WithdrawOutcome::Empty;
        };
        let Position {
            tick_lower,
            tick_upper,
        } = deployment.position;

        let (fee0, fee1) = match self.pool.collect_fees(tick_lower, tick_upper) {
            Ok(fees) => fees,
            Err(err) => return withdraw_failed(kind, err),
        };
        self.unharvested.credit(fee0, fee1);

        let (owed0, owed1) = match self
            .pool
            .burn(tick_lower, tick_upper, deployment.liquidity)
        {
            Ok(owed) => owed,
            Err(err) => return withdraw_failed(kind, err),
        };
        *self.slot_mut(kind) = None;
        self.idle.credit(owed0, owed1);

        tracing::debug!(
            ?kind,
            tick_lower,
            tick_upper,
            liquidity = deployment.liquidity,
            "withdrew position"
        );

        WithdrawOutcome::Withdrawn(WithdrawReport {
            principal: TokenAmounts::new(owed0, owed1),
            fees: TokenAmounts::new(fee0, fee1),
        })
    }

    /// Mints the largest liquidity the idle balances afford in `position`.
    /// Liquidity beyond `u128::MAX` is capped; the remainder stays idle.
    fn deposit_into(
        &mut self,
        kind: PositionKind,
        position: Position,
        state: &PoolState,
    ) -> DepositOutcome {
        let liquidity = match self.size_deposit(position, state) {
            Ok(liquidity) => liquidity,
            Err(Error::MathError(MathError::Overflow)) => {
                tracing::warn!(?kind, "idle balances exceed u128 liquidity, capping");
                u128::MAX
            }
            Err(err) => {
                tracing::warn!(?kind, %err, "could not size deposit, funds stay idle");
                return DepositOutcome::Rejected {
                    reason: err.to_string(),
                };
            }
        };

        if liquidity == 0 {
            tracing::debug!(?kind, "no liquidity to deposit");
            return DepositOutcome::Skipped;
        }

        match self
            .pool
            .mint(position.tick_lower, position.tick_upper, liquidity)
        {
            Ok((used0, used1)) => {
                if used0 > self.idle.amount0 || used1 > self.idle.amount1 {
                    tracing::warn!(
                        ?kind,
                        used0 = %used0,
                        used1 = %used1,
                        "pool took more than the idle balance"
                    );
                }
                self.idle.amount0 = self.idle.amount0.saturating_sub(used0);
                self.idle.amount1 = self.idle.amount1.saturating_sub(used1);
                *self.slot_mut(kind) = Some(Deployment {
                    position,
                    liquidity,
                });
                DepositOutcome::Deposited {
                    liquidity,
                    used0,
                    used1,
                }
            }
            Err(err) => {
                tracing::warn!(
                    ?kind,
                    tick_lower = position.tick_lower,
                    tick_upper = position.tick_upper,
                    %err,
                    "mint rejected, funds stay idle"
                );
                DepositOutcome::Rejected {
                    reason: err.to_string(),
                }
            }
        }
    }

    fn size_deposit(&self, position: Position, state: &PoolState) -> Result<u128, Error> {
        get_liquidity_for_amounts(
            state.sqrt_price_x96,
            get_sqrt_ratio_at_tick(position.tick_lower)?,
            get_sqrt_ratio_at_tick(position.tick_upper)?,
            self.idle.amount0,
            self.idle.amount1,
        )
    }
}

fn withdraw_failed(kind: PositionKind, err: PoolError) -> WithdrawOutcome {
    tracing::warn!(?kind, %err, "withdrawal failed, position stays deployed");
    WithdrawOutcome::Failed {
        reason: err.to_string(),
    }
}

fn position_value(state: &PoolState, deployment: &Deployment) -> Result<(U256, U256), Error> {
    let position = deployment.position;
    get_amounts_for_liquidity(
        state.sqrt_price_x96,
        get_sqrt_ratio_at_tick(position.tick_lower)?,
        get_sqrt_ratio_at_tick(position.tick_upper)?,
        deployment.liquidity,
    )
}
