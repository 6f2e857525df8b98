//! Event stamp generation
//!
//! A stamp is a 16-character base62 identifier built from three parts:
//!
//! ```text
//! ┌──────────────┬─────────────┬──────────┐
//! │ time (8)     │ hash (5)    │ rand (3) │
//! │ 100µs ticks  │ SHA-256 of  │ tie-     │
//! │ since epoch  │ the seed    │ breaker  │
//! └──────────────┴─────────────┴──────────┘
//! ```
//!
//! Ordering is best-effort only. Stamps generated at strictly increasing
//! times sort in non-decreasing lexicographic order, because the time part is
//! fixed-width and the alphabet is in ASCII order. Two stamps generated in the
//! same 100µs tick are distinguished by hash and random parts with high
//! probability, but their relative order is arbitrary and a collision is
//! possible. Anything that needs a strict order must sort by event timestamp,
//! not by stamp.

use chrono::{DateTime, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::types::Stamp;

/// Base62 alphabet in ASCII order
pub const CHARSET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Total stamp length
pub const STAMP_LEN: usize = 16;

const TIME_LEN: usize = 8;
const HASH_LEN: usize = 5;
const RANDOM_LEN: usize = 3;

/// Resolution of the time part
const TICKS_PER_SECOND: i64 = 10_000;

fn digit_value(c: u8) -> Option<u64> {
    match c {
        b'0'..=b'9' => Some(u64::from(c - b'0')),
        b'A'..=b'Z' => Some(u64::from(c - b'A') + 10),
        b'a'..=b'z' => Some(u64::from(c - b'a') + 36),
        _ => None,
    }
}

/// Encode a number in base62 with no padding
pub fn encode_num(mut num: u64) -> String {
    if num == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while num > 0 {
        digits.push(CHARSET[(num % 62) as usize]);
        num /= 62;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Decode a base62 string; `None` on an invalid character or overflow
pub fn decode_num(encoded: &str) -> Option<u64> {
    encoded.bytes().try_fold(0u64, |acc, c| {
        acc.checked_mul(62)?.checked_add(digit_value(c)?)
    })
}

/// Lowest `length` base62 digits of a big-endian integer, most significant first
fn base62_fixed(bytes: &[u8], length: usize) -> String {
    let mut num = bytes.to_vec();
    let mut digits = Vec::with_capacity(length);
    for _ in 0..length {
        let mut rem: u32 = 0;
        for byte in num.iter_mut() {
            let cur = (rem << 8) | u32::from(*byte);
            *byte = (cur / 62) as u8;
            rem = cur % 62;
        }
        digits.push(CHARSET[rem as usize]);
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Deterministic base62 hash of `input`, `length` characters long
pub fn hashify(input: &str, length: usize) -> String {
    let digest = Sha256::digest(input.as_bytes());
    base62_fixed(&digest, length)
}

/// Fixed-width time code for a point in time
pub fn encode_time(time: DateTime<Utc>) -> String {
    let ticks = time.timestamp() * TICKS_PER_SECOND
        + i64::from(time.timestamp_subsec_micros()) / (1_000_000 / TICKS_PER_SECOND);
    let ticks = u64::try_from(ticks).unwrap_or(0);
    base62_fixed(&ticks.to_be_bytes(), TIME_LEN)
}

fn encode_random() -> String {
    let n: u64 = rand::rng().random_range(300_000..900_000);
    let code = format!("000{}", encode_num(n));
    code[code.len() - RANDOM_LEN..].to_string()
}

/// Generate a stamp for the current time
///
/// `seed` is hashed into the middle of the stamp. Seeds of two characters or
/// fewer carry no useful entropy, so the time and random codes are hashed
/// instead.
pub fn generate(seed: Option<&str>) -> Stamp {
    generate_at(Utc::now(), seed)
}

/// Generate a stamp for a given point in time
pub fn generate_at(time: DateTime<Utc>, seed: Option<&str>) -> Stamp {
    let time_code = encode_time(time);
    let random_code = encode_random();
    let hash_code = match seed {
        Some(seed) if seed.chars().count() > 2 => hashify(seed, HASH_LEN),
        _ => hashify(&format!("{}{}", time_code, random_code), HASH_LEN),
    };

    let mut stamp = format!("{}{}{}", time_code, hash_code, random_code);
    stamp.truncate(STAMP_LEN);
    Stamp::new(stamp)
}

/// Unix time in seconds encoded in a stamp's time part
///
/// Intended for diagnostics. Returns `None` for stamps that are too short or
/// contain characters outside the alphabet.
pub fn decode_time(stamp: &str) -> Option<f64> {
    let prefix = stamp.get(..TIME_LEN)?;
    let ticks = decode_num(prefix)?;
    Some(ticks as f64 / TICKS_PER_SECOND as f64)
}
