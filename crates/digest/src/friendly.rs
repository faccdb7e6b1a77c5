//! Human-friendly renderings of sizes, timestamps and paths for digest values.

use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// Zero-width space: a "soft" break opportunity inside a long string.
pub const ZWS: char = '\u{200b}';

const KB: u64 = 1024;
const MB: u64 = 1024 * KB;
const GB: u64 = 1024 * MB;

/// Formats a byte count at base-1024 with one decimal place.
///
/// ```rust
/// use vista_digest::friendly_size;
/// assert_eq!(friendly_size(0), "0 B");
/// assert_eq!(friendly_size(1536), "1.5 KB");
/// assert_eq!(friendly_size(1048576), "1.0 MB");
/// ```
pub fn friendly_size(bytes: u64) -> String {
    let (unit, divisor) = match bytes {
        b if b >= GB => ("GB", GB),
        b if b >= MB => ("MB", MB),
        b if b >= KB => ("KB", KB),
        b => return format!("{b} B"),
    };
    // Precision loss above 2^53 bytes is irrelevant at one decimal place.
    format!("{:.1} {unit}", bytes as f64 / divisor as f64)
}

/// Formats a timestamp in the host's local offset, falling back to UTC when
/// the local offset cannot be determined safely (e.g. multi-threaded
/// runtimes on some platforms). The offset is always part of the output.
pub fn friendly_timestamp(timestamp: OffsetDateTime) -> String {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    friendly_timestamp_in(timestamp, offset)
}

/// Formats a timestamp in an explicit offset, e.g. `2024-03-02 01:30:05 +02:00`.
pub fn friendly_timestamp_in(timestamp: OffsetDateTime, offset: UtcOffset) -> String {
    let local = timestamp.to_offset(offset);
    local
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second] [offset_hour sign:mandatory]:[offset_minute]"
        ))
        .unwrap_or_else(|_| local.to_string())
}

/// Inserts a zero-width space after every path separator so that long paths
/// can wrap in narrow tables.
pub fn wrappable_path(path: &str) -> String {
    let mut wrapped = String::with_capacity(path.len() + path.len() / 4);
    for c in path.chars() {
        wrapped.push(c);
        if c == '/' || c == '\\' {
            wrapped.push(ZWS);
        }
    }
    wrapped
}
