//! Human-readable byte-size formatting for storage usage display.

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format a byte count for display: `8.0MB`, `1.5GB`, `512B`.
///
/// Values of ten or more in a unit are shown without decimals, smaller values
/// with one decimal. Zero renders as `0 B`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let index = (((bytes as f64).ln() / 1024_f64.ln()).floor() as usize).min(UNITS.len() - 1);
    let value = bytes as f64 / 1024_f64.powi(index as i32);
    let formatted = if value >= 10.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    };
    format!("{}{}", formatted, UNITS[index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_bytes() {
        assert_eq!(format_file_size(0), "0 B");
    }

    #[test]
    fn test_small_values_keep_one_decimal() {
        assert_eq!(format_file_size(1536), "1.5KB");
        assert_eq!(format_file_size(8 * 1024 * 1024), "8.0MB");
    }

    #[test]
    fn test_large_values_drop_decimals() {
        assert_eq!(format_file_size(512), "512B");
        assert_eq!(format_file_size(20 * 1024 * 1024), "20MB");
    }

    #[test]
    fn test_gigabytes() {
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.0GB");
    }
}
