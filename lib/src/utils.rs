const SIZE_1KB: u64 = 1024;
const SIZE_1MB: u64 = 1024 * SIZE_1KB;
const SIZE_1GB: u64 = 1024 * SIZE_1MB;

pub fn format_file_size(size: u64) -> String {
    if size >= SIZE_1GB * 2 {
        format!("{:.2} GB", (size as f64) / (SIZE_1GB as f64))
    } else if size >= SIZE_1MB * 2 {
        format!("{:.2} MB", (size as f64) / (SIZE_1MB as f64))
    } else if size >= SIZE_1KB * 2 {
        format!("{:.2} KB", (size as f64) / (SIZE_1KB as f64))
    } else {
        format!("{} bytes", size)
    }
}

#[cfg(test)]
mod test {
    use super::format_file_size;

    #[test]
    fn units_switch_at_twice_the_unit() {
        assert_eq!(format_file_size(0), "0 bytes");
        assert_eq!(format_file_size(2047), "2047 bytes");
        assert_eq!(format_file_size(4096), "4.00 KB");
        assert_eq!(format_file_size(3 * 1024 * 1024), "3.00 MB");
        assert_eq!(format_file_size(5 * 1024 * 1024 * 1024), "5.00 GB");
    }
}
