//! Deterministic display colours for releases and feature areas.

/// Colour used when there is no name to derive from.
pub const FALLBACK_COLOR: &str = "#ccc";

const PALETTE: [&str; 15] = [
    "#007bff", "#6610f2", "#6f42c1", "#e83e8c", "#dc3545", "#fd7e14", "#ffc107", "#28a745",
    "#20c997", "#17a2b8", "#343a40", "#6c757d", "#0056b3", "#4c0bce", "#a71d2a",
];

/// Pick a palette colour for `name`.
///
/// Pure function of `name`. Hashes UTF-16 code units with
/// `hash = unit + (hash << 5) - hash`, where the shift operates on the low 32
/// bits of the running hash, so boards saved by the browser front end keep
/// their colours.
pub fn get_color(name: &str) -> &'static str {
    if name.is_empty() {
        return FALLBACK_COLOR;
    }

    let mut hash: i64 = 0;
    for unit in name.encode_utf16() {
        let shifted = i64::from((hash as i32).wrapping_shl(5));
        hash = i64::from(unit) + shifted - hash;
    }

    PALETTE[(hash.unsigned_abs() % PALETTE.len() as u64) as usize]
}

/// The stored colour if there is one, otherwise the derived one.
pub fn color_or_derived<'a>(stored: Option<&'a str>, name: &str) -> &'a str {
    stored.unwrap_or_else(|| get_color(name))
}
