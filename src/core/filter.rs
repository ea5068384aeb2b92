//! Filter helpers - predicate murni atas data yang sudah dimuat
//!
//! Menerapkan filter yang sama dua kali tanpa perubahan data selalu
//! menghasilkan himpunan yang identik.

use std::collections::BTreeSet;

use crate::models::types::{FinanceRecord, IdmVariable};

/// Records that belong to a fiscal year and a category
pub trait YearCategory {
    fn year(&self) -> i32;
    fn category(&self) -> &str;
}

impl YearCategory for FinanceRecord {
    fn year(&self) -> i32 {
        self.tahun_anggaran
    }

    fn category(&self) -> &str {
        &self.kategori
    }
}

impl YearCategory for IdmVariable {
    fn year(&self) -> i32 {
        self.tahun
    }

    fn category(&self) -> &str {
        &self.kategori
    }
}

/// Records of `year`, optionally restricted to `category`, in original order
pub fn by_year_category<'a, T: YearCategory>(
    items: &'a [T],
    category: Option<&str>,
    year: i32,
) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| item.year() == year)
        .filter(|item| category.map_or(true, |c| item.category() == c))
        .collect()
}

/// Distinct years, newest first
pub fn available_years<T: YearCategory>(items: &[T]) -> Vec<i32> {
    let years: BTreeSet<i32> = items.iter().map(YearCategory::year).collect();
    years.into_iter().rev().collect()
}

pub fn latest_year<T: YearCategory>(items: &[T]) -> Option<i32> {
    items.iter().map(YearCategory::year).max()
}

/// Case-insensitive substring match over any field; empty query matches all
pub fn matches_search(query: &str, fields: &[&str]) -> bool {
    let needle = query.trim().to_lowercase();
    needle.is_empty() || fields.iter().any(|f| f.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Row(i32, &'static str);

    impl YearCategory for Row {
        fn year(&self) -> i32 {
            self.0
        }
        fn category(&self) -> &str {
            self.1
        }
    }

    fn rows() -> Vec<Row> {
        vec![Row(2023, "A"), Row(2024, "A"), Row(2024, "B"), Row(2022, "A")]
    }

    #[test]
    fn test_filter_is_idempotent() {
        let data = rows();
        let first = by_year_category(&data, Some("A"), 2024);
        let second = by_year_category(&data, Some("A"), 2024);
        assert_eq!(first, second);
        assert_eq!(first, vec![&Row(2024, "A")]);
        assert_eq!(by_year_category(&data, None, 2024).len(), 2);
    }

    #[test]
    fn test_years() {
        let data = rows();
        assert_eq!(available_years(&data), vec![2024, 2023, 2022]);
        assert_eq!(latest_year(&data), Some(2024));
        assert_eq!(latest_year::<Row>(&[]), None);
    }

    #[test]
    fn test_matches_search() {
        assert!(matches_search("", &["anything"]));
        assert!(matches_search("SAWAH", &["Sawah Padi Desa", ""]));
        assert!(matches_search("jalan", &["Kebun", "Jalan Sawah"]));
        assert!(!matches_search("pasar", &["Sawah", "Jalan"]));
    }
}
