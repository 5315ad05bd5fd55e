/// Number of seconds in a calendar day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Records requested per page from the history source.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Upper bound on pages fetched for a single entity before giving up.
pub const DEFAULT_MAX_PAGES: usize = 500;

/// Share balances below this magnitude are treated as an empty position.
pub const SHARES_DUST_THRESHOLD: &str = "0.000000000001";

/// Decimal precision for exported series values
pub const DECIMAL_PRECISION: u32 = 8;

/// Users whose history is fetched concurrently by `get_portfolios`.
pub const MAX_CONCURRENT_USER_FETCHES: usize = 8;
