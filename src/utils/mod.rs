// src/utils/mod.rs

//! Utility functions and helpers.

pub mod http;

use chrono::Local;

/// Timestamp prefix for watch reports: `MM/DD HH:MM`, local time.
pub fn report_stamp() -> String {
    Local::now().format("%m/%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_stamp_shape() {
        let stamp = report_stamp();
        // "MM/DD HH:MM"
        assert_eq!(stamp.len(), 11);
        assert_eq!(&stamp[2..3], "/");
        assert_eq!(&stamp[5..6], " ");
        assert_eq!(&stamp[8..9], ":");
    }
}
