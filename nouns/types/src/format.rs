use {
    crate::ProposalStatus,
    alloy::primitives::{ruint::ParseError, U256},
    std::time::Duration,
};

/// Number of decimal places in the governance token's base unit.
pub const TOKEN_DECIMALS: u32 = 18;

/// Maximum number of characters kept when deriving a title.
pub const TITLE_MAX_CHARS: usize = 100;

const BASE_UNIT: u64 = 10u64.pow(TOKEN_DECIMALS);

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3_600;
const SECONDS_PER_DAY: u64 = 86_400;

/// Contract state codes, indexed by code. Codes outside this table are not
/// part of the governor's state enum and map to `Unknown`.
const STATE_CODES: [ProposalStatus; 8] = [
    ProposalStatus::Pending,
    ProposalStatus::Active,
    ProposalStatus::Canceled,
    ProposalStatus::Defeated,
    ProposalStatus::Succeeded,
    ProposalStatus::Queued,
    ProposalStatus::Expired,
    ProposalStatus::Executed,
];

/// Convert a fixed-point token amount (18 decimals) into whole token units.
///
/// The integer and fractional parts are converted separately, so amounts up
/// to the token supply keep full `f64` precision.
pub fn to_display_amount(raw: U256) -> f64 {
    let base = U256::from(BASE_UNIT);
    let (whole, fraction) = raw.div_rem(base);

    let whole = u128::try_from(whole).map(|w| w as f64).unwrap_or(f64::MAX);
    // The remainder is always below 10^18, which fits in a `u64`.
    let fraction = u64::try_from(fraction).unwrap_or_default() as f64;

    whole + fraction / BASE_UNIT as f64
}

/// Parse an amount arriving as text, either decimal or `0x`-prefixed hex.
pub fn parse_amount(text: &str) -> Result<U256, ParseError> {
    text.trim().parse()
}

pub fn state_code_to_status(code: u8) -> ProposalStatus {
    STATE_CODES
        .get(code as usize)
        .copied()
        .unwrap_or(ProposalStatus::Unknown)
}

/// Whether `code` is a state code the governor actually defines.
pub fn is_known_state_code(code: u8) -> bool {
    (code as usize) < STATE_CODES.len()
}

pub fn derive_is_active(code: u8) -> bool {
    code == 1
}

/// A proposal has ended once the chain has moved past its end block. The end
/// block itself is still part of the voting period.
pub fn derive_has_ended(current_block: u64, end_block: u64) -> bool {
    current_block > end_block
}

pub fn blocks_remaining(current_block: u64, end_block: u64) -> u64 {
    end_block.saturating_sub(current_block)
}

/// Estimated wall-clock time for `blocks` blocks at the given interval.
pub fn estimate_duration(blocks: u64, block_time: Duration) -> Duration {
    Duration::from_secs(blocks.saturating_mul(block_time.as_secs()))
}

/// Coarse human readable duration: `1d 3h`, `4h 12m`, `7m`, or `Ended`.
pub fn format_time_left(remaining: Duration) -> String {
    let seconds = remaining.as_secs();

    if seconds == 0 {
        return "Ended".to_string();
    }

    let days = seconds / SECONDS_PER_DAY;
    let hours = (seconds % SECONDS_PER_DAY) / SECONDS_PER_HOUR;
    let minutes = (seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;

    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Title of a proposal whose text only lives in its description: the first
/// non-blank line, cut to [`TITLE_MAX_CHARS`] characters.
pub fn derive_title(id: u64, description: &str) -> String {
    let Some(line) = description.lines().find(|line| !line.trim().is_empty()) else {
        return format!("Proposal {id}");
    };

    if line.chars().count() > TITLE_MAX_CHARS {
        let cut: String = line.chars().take(TITLE_MAX_CHARS).collect();
        format!("{cut}...")
    } else {
        line.to_string()
    }
}

// ----------------------------------- tests -----------------------------------
