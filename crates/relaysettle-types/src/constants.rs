//! System-wide constants for the relaysettle settlement engine.

/// Default token denomination settled by the engine (micro units).
pub const DEFAULT_DENOM: &str = "upokt";

/// Revenue-share percentages are whole numbers out of this denominator.
pub const PERCENT_DENOMINATOR: u64 = 100;

/// Maximum length of an account address in bytes.
pub const MAX_ADDRESS_LEN: usize = 128;

/// Maximum length of a session or service identifier in bytes.
pub const MAX_ID_LEN: usize = 128;

/// Upper bound for the per-claim global inflation rate (100x the settlement).
pub const MAX_INFLATION_RATE: u64 = 100;

/// Domain separation tag prefixed to every ledger digest.
pub const LEDGER_DIGEST_DOMAIN: &[u8] = b"relaysettle:ledger_digest:v1:";

/// Default treasury (DAO reward) address.
pub const DEFAULT_TREASURY_ADDRESS: &str = "pokt1dao_treasury";
