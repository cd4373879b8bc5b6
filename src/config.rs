// ABOUTME: Evaluator configuration: stack limit, decimal scale, and rounding mode
//! Evaluator configuration: the knobs the numeric and stack contracts name
//! explicitly. Trimmed of the teacher's sandbox/network/filesystem/
//! REPL-banner config — Oliver has no I/O beyond `EMIT`/`ENDL` and no
//! capability sandboxing surface to configure.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The eight rounding modes the numeric contract lists. `Decimal`'s own
/// `RoundingStrategy` names four of these directly; the rest map onto it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundingMode {
    #[default]
    HalfEven,
    HalfUp,
    HalfDown,
    HalfOdd,
    Ceil,
    Floor,
    TowardZero,
    AwayFromZero,
}

impl RoundingMode {
    pub fn to_rust_decimal(self) -> rust_decimal::RoundingStrategy {
        use rust_decimal::RoundingStrategy::*;
        match self {
            RoundingMode::HalfEven => MidpointNearestEven,
            RoundingMode::HalfUp => MidpointAwayFromZero,
            RoundingMode::HalfDown => MidpointTowardZero,
            RoundingMode::HalfOdd => MidpointNearestEven, // no direct equivalent; see DESIGN.md
            RoundingMode::Ceil => ToPositiveInfinity,
            RoundingMode::Floor => ToNegativeInfinity,
            RoundingMode::TowardZero => ToZero,
            RoundingMode::AwayFromZero => AwayFromZero,
        }
    }
}

/// Evaluator-wide configuration: stack capacity (bounded by a configurable
/// limit, default 2048) and the decimal scale/rounding the numeric
/// contract requires be configurable.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    pub stack_limit: usize,
    pub decimal_scale: u32,
    pub rounding_mode: RoundingMode,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig { stack_limit: 2048, decimal_scale: 16, rounding_mode: RoundingMode::HalfEven }
    }
}
