//! Time-Related Constants
//!
//! Unit conversions, the network time protocol constants and the fixed
//! daylight-saving rule of the station's timezone (UTC+2 standard, UTC+3
//! summer).

// ===== TIME UNIT CONVERSIONS =====

/// Milliseconds per second.
pub const MS_PER_SECOND: u32 = 1000;

/// Seconds per minute.
pub const SECONDS_PER_MINUTE: u32 = 60;

/// Seconds per hour.
pub const SECONDS_PER_HOUR: u32 = 60 * SECONDS_PER_MINUTE;

/// Seconds per day.
pub const SECONDS_PER_DAY: u32 = 24 * SECONDS_PER_HOUR;

/// Seconds per week.
pub const SECONDS_PER_WEEK: u32 = 7 * SECONDS_PER_DAY;

// ===== NETWORK TIME =====

/// Seconds between the NTP era 0 epoch (1900-01-01) and the Unix epoch.
///
/// Source: RFC 5905, section 6
pub const NTP_UNIX_EPOCH_DELTA_S: i64 = 2_208_988_800;

/// Timeout for the single NTP round trip (milliseconds).
pub const NTP_TIMEOUT_MS: u32 = 2000;

/// Size of an SNTP request/response packet in bytes.
pub const NTP_PACKET_LEN: usize = 48;

/// First request byte: LI = 0, version = 3, mode = 3 (client).
pub const NTP_CLIENT_REQUEST: u8 = 0x1B;

/// Byte offset of the transmit timestamp seconds field in a reply.
pub const NTP_TRANSMIT_SECONDS_OFFSET: usize = 40;

// ===== TIMEZONE RULE =====

/// Standard time offset from UTC (seconds).
pub const STANDARD_OFFSET_S: i32 = 2 * SECONDS_PER_HOUR as i32;

/// Summer time offset from UTC (seconds).
pub const DST_OFFSET_S: i32 = 3 * SECONDS_PER_HOUR as i32;

/// Month in which summer time begins (last Sunday).
pub const DST_START_MONTH: u32 = 3;

/// UTC hour on the start Sunday when summer time begins.
pub const DST_START_HOUR_UTC: u32 = 3;

/// Month in which summer time ends (last Sunday).
pub const DST_END_MONTH: u32 = 10;

/// UTC hour on the end Sunday when summer time ends.
pub const DST_END_HOUR_UTC: u32 = 4;
