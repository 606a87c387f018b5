use thiserror::Error;

#[derive(Debug, Error)]
pub enum MathError {
    #[error("Math error - overflow")]
    Overflow,
    #[error("Math error - division by zero")]
    DivisionByZero,
    #[error("BitMath error - zero input value")]
    ZeroValue,
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("State error - sqrtPrice out of bounds")]
    SqrtPriceOutOfBounds,
    #[error("State error - sqrtPrice is 0")]
    SqrtPriceIsZero,

    #[error("State error - tick out of bounds")]
    TickOutOfBounds,

    #[error("State error - tick spacing must be positive, got {0}")]
    InvalidSpacing(i32),
    #[error("State error - width {width} is not a positive multiple of spacing {spacing}")]
    UnalignedWidth { width: i32, spacing: i32 },
    #[error("State error - invalid range [{tick_lower}, {tick_upper}]")]
    InvalidRange { tick_lower: i32, tick_upper: i32 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config error - position width must be positive")]
    ZeroWidth,
    #[error("Config error - position width {width} is not a multiple of spacing {spacing}")]
    WidthNotSpacingMultiple { width: i32, spacing: i32 },
    #[error("Config error - max tick deviation must not be negative")]
    NegativeDeviation,
    #[error("Config error - max tick deviation {deviation} exceeds limit {limit}")]
    DeviationTooLarge { deviation: i32, limit: i32 },
    #[error("Config error - twap interval {0}s is outside the accepted range")]
    InvalidTwapInterval(u32),
    #[error("Config error - failed to parse: {0}")]
    Parse(String),
}

/// Failures reported by the pool collaborator.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("Pool error - no time-weighted tick available for a {0}s lookback")]
    OracleUnavailable(u32),
    #[error("Pool error - mint rejected at [{tick_lower}, {tick_upper}]: {reason}")]
    MintRejected {
        tick_lower: i32,
        tick_upper: i32,
        reason: String,
    },
    #[error("Pool error - call failed: {0}")]
    Call(String),
}

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("Strategy error - tick deviation {deviation} exceeds max {max}")]
    NotCalm { deviation: u32, max: u32 },
    #[error("Strategy error - time-weighted tick unavailable")]
    OracleUnavailable,
    #[error("Strategy error - strategy is paused")]
    Paused,
    #[error("Strategy error - strategy is not paused")]
    NotPaused,
    #[error("Strategy error - role {role:?} may not {action:?}")]
    Unauthorized {
        role: crate::strategy::access::Role,
        action: crate::strategy::access::Action,
    },
    #[error("Strategy error - an operation is already in flight ({0:?})")]
    RebalanceInFlight(crate::strategy::Phase),
    #[error("Strategy error - illegal phase transition {from:?} -> {to:?}")]
    InvalidTransition {
        from: crate::strategy::Phase,
        to: crate::strategy::Phase,
    },
    #[error("Strategy error - insufficient idle balance")]
    InsufficientIdle,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    MathError(#[from] crate::error::MathError),

    #[error(transparent)]
    StateError(#[from] crate::error::StateError),

    #[error(transparent)]
    ConfigError(#[from] crate::error::ConfigError),

    #[error(transparent)]
    PoolError(#[from] crate::error::PoolError),

    #[error(transparent)]
    StrategyError(#[from] crate::error::StrategyError),
}
