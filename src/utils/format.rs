//! Formatting helpers untuk kartu ringkasan dan tabel
//!
//! Rupiah memakai titik sebagai pemisah ribuan ("Rp 1.250.000"), tanggal
//! memakai nama bulan singkat Bahasa Indonesia ("5 Jan 2024").

use chrono::{Datelike, NaiveDate};

const MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

/// Format an amount as Rupiah with `.` thousands separators.
/// Fractions are rounded to whole Rupiah.
pub fn format_rupiah(amount: f64) -> String {
    if !amount.is_finite() {
        return "Rp 0".to_string();
    }
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if rounded < 0 {
        format!("-Rp {}", grouped)
    } else {
        format!("Rp {}", grouped)
    }
}

/// Parse a decimal amount string the way the API sends it ("1500000.00").
/// Returns None for anything that is not a finite number.
pub fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Format an API date ("2024-01-05" or "2024-01-05T08:00:00Z") as "5 Jan 2024".
/// Unparseable input is returned unchanged.
pub fn format_tanggal(raw: &str) -> String {
    let date_part = raw.get(..10).unwrap_or(raw);
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => format!(
            "{} {} {}",
            date.day(),
            MONTHS_SHORT[date.month0() as usize],
            date.year()
        ),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rupiah() {
        assert_eq!(format_rupiah(0.0), "Rp 0");
        assert_eq!(format_rupiah(950.0), "Rp 950");
        assert_eq!(format_rupiah(1_250_000.0), "Rp 1.250.000");
        assert_eq!(format_rupiah(1_000.4), "Rp 1.000");
        assert_eq!(format_rupiah(-25_000.0), "-Rp 25.000");
        assert_eq!(format_rupiah(f64::NAN), "Rp 0");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1500000.00"), Some(1_500_000.0));
        assert_eq!(parse_amount(" 42 "), Some(42.0));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("inf"), None);
    }

    #[test]
    fn test_format_tanggal() {
        assert_eq!(format_tanggal("2024-01-05"), "5 Jan 2024");
        assert_eq!(format_tanggal("2023-08-17T00:00:00.000000Z"), "17 Agu 2023");
        assert_eq!(format_tanggal("kemarin"), "kemarin");
    }
}
