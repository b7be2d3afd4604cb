use alloy::primitives::{Address, B256, U256};
use chrono::{DateTime, Utc};

/// Truncate an address to "0xabcd...ef12" format
pub fn truncate_address(addr: &Address) -> String {
    let s = format!("{addr}");
    if s.len() > 14 {
        format!("{}...{}", &s[..8], &s[s.len() - 4..])
    } else {
        s
    }
}

/// Truncate a hash to "0x1234ab...cdef" format
pub fn truncate_hash(hash: &B256) -> String {
    let s = format!("{hash}");
    format!("{}...{}", &s[..8], &s[s.len() - 4..])
}

/// Lossy conversion used for plotting. Values above f64 range saturate.
pub fn u256_to_f64(value: U256) -> f64 {
    let s = value.to_string();
    s.parse::<f64>().unwrap_or(f64::MAX)
}

/// Format a chart axis value as "1.2k", "3.4M", etc.
pub fn format_compact(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e18 {
        format!("{:.1}E", value / 1e18)
    } else if abs >= 1e15 {
        format!("{:.1}P", value / 1e15)
    } else if abs >= 1e12 {
        format!("{:.1}T", value / 1e12)
    } else if abs >= 1e9 {
        format!("{:.1}G", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1}k", value / 1e3)
    } else if abs >= 1.0 || abs == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.3}")
    }
}

/// Format a number with comma separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format a Unix timestamp with short month names so axis labels stay narrow.
pub fn format_timestamp(timestamp: u64) -> String {
    DateTime::from_timestamp(timestamp as i64, 0)
        .map(|dt| dt.format("%b %d %H:%M").to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Local wall-clock time, used by the status bar.
pub fn now_hms() -> String {
    Utc::now().format("%H:%M:%S").to_string()
}
