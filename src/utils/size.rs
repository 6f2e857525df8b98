//! Human-readable byte counts

const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

/// Render a byte count with binary prefixes, e.g. `1.50 KB`
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1 << 20), "1.00 MB");
        assert_eq!(format_size(1 << 30), "1.00 GB");
        assert_eq!(format_size(3 << 40), "3.00 TB");
        assert_eq!(format_size(2048 << 40), "2048.00 TB");
    }
}
