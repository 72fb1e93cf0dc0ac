//! Read-only parameter tables consumed by the stress engine.
//!
//! - [`CovarianceTable`]: square table indexed by underlying tag; the
//!   diagonal stores annualised volatilities and the upper triangle
//!   correlations (lower-triangle symmetric fill is tolerated and
//!   ignored)
//! - [`DriftTable`]: annualised drift per underlying, zero when absent
//! - [`AccountEquityTable`]: account equity snapshot
//! - [`SupplementSchedule`]: scheduled cash deposits per account and
//!   step (`T+0, T+1, ...`); a missing account means no deposits

use std::collections::{BTreeMap, HashMap};

/// Square volatility/correlation table indexed by underlying tag.
#[derive(Clone, Debug, PartialEq)]
pub struct CovarianceTable {
    labels: Vec<String>,
    index: HashMap<String, usize>,
    data: Vec<f64>,
}

impl CovarianceTable {
    /// Builds a table from labels and row-major data.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != labels.len()²` or labels repeat; tables
    /// come from the loader, which validates shape on ingest.
    pub fn new(labels: Vec<String>, data: Vec<f64>) -> Self {
        assert_eq!(
            data.len(),
            labels.len() * labels.len(),
            "covariance table is not square"
        );
        let index: HashMap<String, usize> = labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), i))
            .collect();
        assert_eq!(index.len(), labels.len(), "duplicate covariance labels");
        Self {
            labels,
            index,
            data,
        }
    }

    /// Underlying labels in table order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of underlyings.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Row/column position of an underlying tag.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Raw element at `(i, j)` in table order.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.labels.len() + j]
    }
}

/// Annualised drift per underlying tag; zero for absent tags.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DriftTable {
    mu: HashMap<String, f64>,
}

impl DriftTable {
    /// An all-zero drift table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from `(underlying, mu)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, f64)>) -> Self {
        Self {
            mu: pairs.into_iter().collect(),
        }
    }

    /// Drift for an underlying, zero when absent.
    pub fn get(&self, label: &str) -> f64 {
        self.mu.get(label).copied().unwrap_or(0.0)
    }
}

/// Account equity snapshot, iterated in account order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AccountEquityTable {
    equity: BTreeMap<String, f64>,
}

impl AccountEquityTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from `(account, equity)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, f64)>) -> Self {
        Self {
            equity: pairs.into_iter().collect(),
        }
    }

    /// Equity of an account.
    pub fn get(&self, account: &str) -> Option<f64> {
        self.equity.get(account).copied()
    }

    /// Accounts and equities in account order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.equity.iter().map(|(account, &e)| (account.as_str(), e))
    }

    /// Number of accounts.
    pub fn len(&self) -> usize {
        self.equity.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.equity.is_empty()
    }
}

/// Scheduled deposits per account: one value per step `T+0, T+1, ...`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SupplementSchedule {
    deposits: HashMap<String, Vec<f64>>,
}

impl SupplementSchedule {
    /// An empty schedule (no deposits for anyone).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a schedule from `(account, deposits)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, Vec<f64>)>) -> Self {
        Self {
            deposits: pairs.into_iter().collect(),
        }
    }

    /// Cumulative deposits over `n_steps` horizons for an account,
    /// zero-padded when the schedule is short or the account absent.
    pub fn cumulative(&self, account: &str, n_steps: usize) -> Vec<f64> {
        let schedule = self.deposits.get(account);
        let mut cumulative = Vec::with_capacity(n_steps);
        let mut running = 0.0;
        for step in 0..n_steps {
            running += schedule
                .and_then(|s| s.get(step))
                .copied()
                .unwrap_or(0.0);
            cumulative.push(running);
        }
        cumulative
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covariance_lookup() {
        let table = CovarianceTable::new(
            vec!["M2405.DCE".to_string(), "RB".to_string()],
            vec![0.25, 0.4, 0.0, 0.3],
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.position("RB"), Some(1));
        assert_eq!(table.position("CU"), None);
        assert_eq!(table.get(0, 0), 0.25);
        assert_eq!(table.get(0, 1), 0.4);
        // Lower triangle may hold anything; callers read the upper.
        assert_eq!(table.get(1, 0), 0.0);
    }

    #[test]
    #[should_panic(expected = "not square")]
    fn test_covariance_shape_checked() {
        CovarianceTable::new(vec!["A".to_string()], vec![0.2, 0.3]);
    }

    #[test]
    fn test_drift_defaults_to_zero() {
        let table = DriftTable::from_pairs([("RB".to_string(), 0.05)]);
        assert_eq!(table.get("RB"), 0.05);
        assert_eq!(table.get("CU"), 0.0);
    }

    #[test]
    fn test_account_table_ordering() {
        let table = AccountEquityTable::from_pairs([
            ("B".to_string(), 2.0),
            ("A".to_string(), 1.0),
        ]);
        let accounts: Vec<_> = table.iter().map(|(a, _)| a.to_string()).collect();
        assert_eq!(accounts, vec!["A", "B"]);
        assert_eq!(table.get("B"), Some(2.0));
        assert_eq!(table.get("C"), None);
    }

    #[test]
    fn test_supplement_cumulative() {
        let schedule =
            SupplementSchedule::from_pairs([("A1".to_string(), vec![1000.0, 500.0])]);
        assert_eq!(schedule.cumulative("A1", 3), vec![1000.0, 1500.0, 1500.0]);
        // Absent account: all zeros.
        assert_eq!(schedule.cumulative("A2", 2), vec![0.0, 0.0]);
    }
}
