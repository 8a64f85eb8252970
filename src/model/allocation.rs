use crate::Result;
use anyhow::bail;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single row from the `allocations` resource: a percentage share of
/// monthly income earmarked for a spending category.
///
/// Category uniqueness per user is a client convention only; the store does
/// not enforce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub id: String,
    pub category: String,
    pub percentage: Decimal,
    pub user_id: String,
}

/// The insert payload for the `allocations` resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAllocation {
    pub user_id: String,
    pub category: String,
    pub percentage: Decimal,
}

impl NewAllocation {
    /// Client-side validation, applied before any store call: the category is
    /// required and the percentage must lie in (0, 100].
    pub fn validate(&self) -> Result<()> {
        if self.category.trim().is_empty() {
            bail!("An allocation requires a category");
        }
        if self.percentage <= Decimal::ZERO || self.percentage > Decimal::from(100) {
            bail!(
                "The percentage must be between 0 and 100 (got {})",
                self.percentage
            );
        }
        Ok(())
    }
}

/// Sums the percentages of a user's allocations. The add-allocation path
/// checks this running total against the 100% ceiling at submission time;
/// there is no store-side constraint.
pub fn total_percentage(allocations: &[Allocation]) -> Decimal {
    allocations.iter().map(|a| a.percentage).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn allocation(category: &str, percentage: &str) -> Allocation {
        Allocation {
            id: format!("alloc-{category}"),
            category: category.to_string(),
            percentage: Decimal::from_str(percentage).unwrap(),
            user_id: "user-1".to_string(),
        }
    }

    fn new_allocation(percentage: &str) -> NewAllocation {
        NewAllocation {
            user_id: "user-1".to_string(),
            category: "Nabung".to_string(),
            percentage: Decimal::from_str(percentage).unwrap(),
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(new_allocation("30").validate().is_ok());
        assert!(new_allocation("100").validate().is_ok());
        assert!(new_allocation("0.01").validate().is_ok());
    }

    #[test]
    fn test_validate_zero_rejected() {
        assert!(new_allocation("0").validate().is_err());
    }

    #[test]
    fn test_validate_above_hundred_rejected() {
        assert!(new_allocation("100.01").validate().is_err());
    }

    #[test]
    fn test_validate_negative_rejected() {
        assert!(new_allocation("-10").validate().is_err());
    }

    #[test]
    fn test_validate_empty_category() {
        let mut alloc = new_allocation("30");
        alloc.category = String::new();
        assert!(alloc.validate().is_err());
    }

    #[test]
    fn test_total_percentage() {
        let allocations = vec![
            allocation("Nabung", "30"),
            allocation("Sodaqoh", "10.5"),
            allocation("Food", "25"),
        ];
        assert_eq!(
            total_percentage(&allocations),
            Decimal::from_str("65.5").unwrap()
        );
    }

    #[test]
    fn test_total_percentage_empty() {
        assert_eq!(total_percentage(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_deserialize_store_row() {
        let json = r#"{
            "id": "a1",
            "category": "Nabung",
            "percentage": 30,
            "user_id": "user-1"
        }"#;
        let row: Allocation = serde_json::from_str(json).unwrap();
        assert_eq!(row.category, "Nabung");
        assert_eq!(row.percentage, Decimal::from(30));
    }
}
