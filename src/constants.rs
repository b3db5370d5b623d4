/// Decimal precision for ledger calculations
pub const DECIMAL_PRECISION: u32 = 6;

/// Holding period, in days, beyond which an open lot is classified long-term
pub const LONG_TERM_HOLDING_DAYS: i64 = 365;

/// Annualized rate of the synthetic risk-free return leg
pub const RISK_FREE_ANNUAL_RATE: &str = "0.075";

/// Day-count convention used to prorate the risk-free rate
pub const DAYS_PER_YEAR: i64 = 365;

/// Remark tag carried by synthetic bonus-share trades
pub const BONUS_REMARK: &str = "bonus shares";

/// File-name prefix of the date-keyed adjusted tradebook artifact
pub const ADJUSTED_TRADEBOOK_PREFIX: &str = "adjusted_tradebook";
