//! How clients keep local state consistent with each table
//!
//! Department composition lists are reordered locally right away and replaced
//! by the authoritative list once the write settles. Everything else is
//! refetched after a write.

use orgdesk_events::Table;
use serde::{Deserialize, Serialize};

use crate::reorder::{reorder, Orderable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyMode {
    /// Apply locally, then replace with the stored list after success or failure
    OptimisticThenReconciled,
    /// Wait for the write, then refetch
    RefetchAfterWrite,
}

impl ConsistencyMode {
    pub fn for_table(table: Table) -> Self {
        match table {
            Table::DepartmentStatCards | Table::DepartmentFeatures | Table::DepartmentTools => {
                ConsistencyMode::OptimisticThenReconciled
            }
            Table::UserPermissions
            | Table::ToolAccessRequests
            | Table::PermissionAuditTrail
            | Table::PermissionTemplates
            | Table::OrganizationUiCustomizations => ConsistencyMode::RefetchAfterWrite,
        }
    }
}

/// Client-side list under [`ConsistencyMode::OptimisticThenReconciled`]
#[derive(Debug, Clone, PartialEq)]
pub struct OptimisticList<T> {
    items: Vec<T>,
    previous: Option<Vec<T>>,
}

impl<T: Orderable + Clone> OptimisticList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            previous: None,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Whether a local move is waiting for reconciliation
    pub fn is_dirty(&self) -> bool {
        self.previous.is_some()
    }

    /// Reorder locally, remembering the last settled order
    pub fn apply_move(&mut self, moved_id: &str, target_id: &str) -> &[T] {
        if self.previous.is_none() {
            self.previous = Some(self.items.clone());
        }
        let items = std::mem::take(&mut self.items);
        self.items = reorder(items, moved_id, target_id);
        &self.items
    }

    /// Replace local state with the stored list
    pub fn reconcile(&mut self, authoritative: Vec<T>) {
        self.items = authoritative;
        self.previous = None;
    }

    /// Restore the last settled order
    pub fn rollback(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.items = previous;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row(String, usize);

    impl Orderable for Row {
        fn id(&self) -> &str {
            &self.0
        }
        fn display_order(&self) -> usize {
            self.1
        }
        fn set_display_order(&mut self, order: usize) {
            self.1 = order;
        }
    }

    fn rows() -> Vec<Row> {
        vec![Row("a".into(), 0), Row("b".into(), 1), Row("c".into(), 2)]
    }

    #[test]
    fn test_modes_per_table() {
        assert_eq!(
            ConsistencyMode::for_table(Table::DepartmentFeatures),
            ConsistencyMode::OptimisticThenReconciled
        );
        assert_eq!(
            ConsistencyMode::for_table(Table::ToolAccessRequests),
            ConsistencyMode::RefetchAfterWrite
        );
        assert_eq!(
            ConsistencyMode::for_table(Table::OrganizationUiCustomizations),
            ConsistencyMode::RefetchAfterWrite
        );
    }

    #[test]
    fn test_rollback_restores_settled_order() {
        let mut list = OptimisticList::new(rows());
        list.apply_move("a", "c");
        list.apply_move("b", "a");
        assert!(list.is_dirty());

        list.rollback();
        assert_eq!(list.items(), rows().as_slice());
        assert!(!list.is_dirty());
    }

    #[test]
    fn test_reconcile_replaces_local_state() {
        let mut list = OptimisticList::new(rows());
        list.apply_move("c", "a");
        assert_eq!(list.items()[0].0, "c");

        let stored = vec![Row("b".into(), 0), Row("a".into(), 1)];
        list.reconcile(stored.clone());
        assert_eq!(list.items(), stored.as_slice());
        list.rollback();
        assert_eq!(list.items(), stored.as_slice());
    }
}
