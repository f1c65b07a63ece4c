const KIB: u64 = 1024;
const UNITS: &[&str] = &["KB", "MB", "GB", "TB"];

/// Human-readable size with one decimal, e.g. `812 bytes`, `4.2 MB`.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    if bytes < KIB {
        return format!("{bytes} bytes");
    }

    let mut size = bytes as f64 / KIB as f64;
    let mut unit = 0;
    while size >= KIB as f64 && unit < UNITS.len() - 1 {
        size /= KIB as f64;
        unit += 1;
    }

    format!("{size:.1} {}", UNITS[unit])
}
