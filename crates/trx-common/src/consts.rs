use std::time::Duration;

/// Bandwidth consumed by a plain TRX transfer
pub const TRANSFER_BANDWIDTH_UNITS: u64 = 266;

/// A plain TRX transfer runs no contract code
pub const TRANSFER_ENERGY_UNITS: u64 = 0;

/// Fee used when neither chain parameters nor a probe transaction are available (0.1 TRX)
pub const FALLBACK_FEE_SUN: u64 = 100_000;

/// Default upper bound for any single network-bound pipeline stage
pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Default per-request timeout for the HTTP client
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Header TronGrid reads the API key from
pub const TRONGRID_API_KEY_HEADER: &str = "tron-pro-api-key";
