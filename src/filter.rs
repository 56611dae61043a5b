//! Seller-group filter applied before every metric and view.

use polars::prelude::*;
use serde::Serialize;

use crate::error::{DashboardError, Result};
use crate::schema::{Field, SellerGroup};
use crate::table::OrderTable;

/// Which seller groups are included. Both are selected by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GroupSelection {
    pub reserved: bool,
    pub other: bool,
}

impl Default for GroupSelection {
    fn default() -> Self {
        Self::all()
    }
}

impl GroupSelection {
    pub fn all() -> Self {
        Self {
            reserved: true,
            other: true,
        }
    }

    pub fn none() -> Self {
        Self {
            reserved: false,
            other: false,
        }
    }

    /// Selection holding exactly the given groups.
    pub fn from_groups(groups: impl IntoIterator<Item = SellerGroup>) -> Self {
        let mut selection = Self::none();
        for group in groups {
            selection.set(group, true);
        }
        selection
    }

    pub fn contains(&self, group: SellerGroup) -> bool {
        match group {
            SellerGroup::Reserved => self.reserved,
            SellerGroup::Other => self.other,
        }
    }

    pub fn set(&mut self, group: SellerGroup, selected: bool) {
        match group {
            SellerGroup::Reserved => self.reserved = selected,
            SellerGroup::Other => self.other = selected,
        }
    }

    pub fn toggle(&mut self, group: SellerGroup) {
        let selected = self.contains(group);
        self.set(group, !selected);
    }

    pub fn is_empty(&self) -> bool {
        !self.reserved && !self.other
    }

    pub fn is_all(&self) -> bool {
        self.reserved && self.other
    }

    /// Selected groups in canonical order.
    pub fn groups(&self) -> Vec<SellerGroup> {
        SellerGroup::ALL
            .into_iter()
            .filter(|g| self.contains(*g))
            .collect()
    }
}

/// Rows whose seller group is selected, in their original order.
///
/// An empty selection is an error: nothing should be rendered for it.
pub fn filter_by_groups(table: &OrderTable, selection: &GroupSelection) -> Result<OrderTable> {
    if selection.is_empty() {
        return Err(DashboardError::EmptySelection);
    }
    if selection.is_all() {
        return Ok(table.clone());
    }
    let predicate = selection
        .groups()
        .into_iter()
        .map(|g| col(Field::SellerGroup.name()).eq(lit(g.key())))
        .reduce(|acc, e| acc.or(e))
        .ok_or(DashboardError::EmptySelection)?;
    OrderTable::from_lazy(table.lazy().filter(predicate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::strings;
    use crate::table::test_support::orders_frame;

    fn sample() -> OrderTable {
        orders_frame(&[
            ("1", "A", 100.0, 0),
            ("2", "킹댕즈", 200.0, 1),
            ("3", "B", 300.0, 0),
            ("4", "킹댕즈", 400.0, 2),
        ])
    }

    fn ids(table: &OrderTable) -> Vec<String> {
        strings(table.frame(), Field::OrderId.name()).unwrap()
    }

    #[test]
    fn test_full_selection_is_identity() {
        let table = sample();
        let filtered = filter_by_groups(&table, &GroupSelection::all()).unwrap();
        assert!(filtered.frame().equals_missing(table.frame()));
    }

    #[test]
    fn test_subset_keeps_matching_rows_in_order() {
        let table = sample();
        let reserved =
            filter_by_groups(&table, &GroupSelection::from_groups([SellerGroup::Reserved]))
                .unwrap();
        assert_eq!(ids(&reserved), vec!["2", "4"]);
        let other =
            filter_by_groups(&table, &GroupSelection::from_groups([SellerGroup::Other])).unwrap();
        assert_eq!(ids(&other), vec!["1", "3"]);
        assert_eq!(reserved.height() + other.height(), table.height());
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let err = filter_by_groups(&sample(), &GroupSelection::none()).unwrap_err();
        assert!(matches!(err, DashboardError::EmptySelection));
    }

    #[test]
    fn test_toggle() {
        let mut selection = GroupSelection::default();
        selection.toggle(SellerGroup::Reserved);
        assert_eq!(selection.groups(), vec![SellerGroup::Other]);
        selection.toggle(SellerGroup::Other);
        assert!(selection.is_empty());
    }
}
