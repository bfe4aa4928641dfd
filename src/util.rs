use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn format_duration(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, rest) => format!("{rest} min"),
        (hours, 0) => format!("{hours} h"),
        (hours, rest) => format!("{hours} h {rest} min"),
    }
}

/// Rounds down to a tenth so an unfinished level never reads as 100%.
pub fn format_percentage(value: f32) -> String {
    let tenths = (value * 10.0 + 1e-3).floor() / 10.0;
    if tenths.fract().abs() < 0.05 {
        format!("{tenths:.0}%")
    } else {
        format!("{tenths:.1}%")
    }
}

pub fn truncate_title(title: &str, max_chars: usize) -> String {
    if title.chars().count() <= max_chars {
        return title.to_owned();
    }

    let kept = title.chars().take(max_chars.saturating_sub(1)).collect::<String>();
    format!("{}…", kept.trim_end())
}

pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_read_naturally() {
        assert_eq!(format_duration(45), "45 min");
        assert_eq!(format_duration(120), "2 h");
        assert_eq!(format_duration(95), "1 h 35 min");
    }

    #[test]
    fn percentages_drop_needless_decimals() {
        assert_eq!(format_percentage(40.0), "40%");
        assert_eq!(format_percentage(33.33), "33.3%");
        assert_eq!(format_percentage(100.0), "100%");
    }

    #[test]
    fn nearly_complete_never_shows_full() {
        assert_eq!(format_percentage(99.97), "99.9%");
        assert_eq!(format_percentage(99.99), "99.9%");
        assert_eq!(format_percentage(12.5), "12.5%");
    }

    #[test]
    fn titles_are_truncated_on_char_boundaries() {
        assert_eq!(truncate_title("Loops", 12), "Loops");
        assert_eq!(truncate_title("Asynchronous programming", 10), "Asynchron…");
        assert_eq!(truncate_title("ñññññññ", 4), "ñññ…");
    }

    #[test]
    fn stable_pair_is_deterministic_and_bounded() {
        let (x, y) = stable_pair("level-42");
        assert_eq!(stable_pair("level-42"), (x, y));
        assert!((-1.0..=1.0).contains(&x));
        assert!((-1.0..=1.0).contains(&y));
    }
}
