//! Property tests for drag-and-drop reordering

use chrono::Utc;
use orgdesk_layout::{
    changed_positions, reorder, ItemDetails, OptimisticList, Orderable, SectionItem,
};
use proptest::prelude::*;

fn items(count: usize) -> Vec<SectionItem> {
    let now = Utc::now();
    (0..count)
        .map(|i| SectionItem {
            id: format!("item-{}", i),
            organization_id: "org-1".to_string(),
            department_id: "ops".to_string(),
            title: format!("Item {}", i),
            description: None,
            icon: None,
            display_order: i,
            is_active: true,
            details: ItemDetails::StatCard {
                value: i.to_string(),
                trend: None,
            },
            created_at: now,
            updated_at: now,
        })
        .collect()
}

fn list_and_move() -> impl Strategy<Value = (usize, usize, usize)> {
    (1usize..25).prop_flat_map(|len| (Just(len), 0..len, 0..len))
}

proptest! {
    #[test]
    fn prop_reorder_is_a_permutation((len, from, to) in list_and_move()) {
        let before = items(len);
        let after = reorder(before.clone(), &before[from].id, &before[to].id);

        let mut ids: Vec<_> = after.iter().map(|i| i.id.clone()).collect();
        ids.sort();
        let mut expected: Vec<_> = before.iter().map(|i| i.id.clone()).collect();
        expected.sort();
        prop_assert_eq!(ids, expected);

        for (index, item) in after.iter().enumerate() {
            prop_assert_eq!(item.display_order(), index);
        }
        prop_assert_eq!(&after[to].id, &before[from].id);
    }

    #[test]
    fn prop_relative_order_of_others_is_kept((len, from, to) in list_and_move()) {
        let before = items(len);
        let moved = before[from].id.clone();
        let after = reorder(before.clone(), &moved, &before[to].id);

        let others_before: Vec<_> = before.iter().filter(|i| i.id != moved).map(|i| &i.id).collect();
        let others_after: Vec<_> = after.iter().filter(|i| i.id != moved).map(|i| &i.id).collect();
        prop_assert_eq!(others_before, others_after);
    }

    #[test]
    fn prop_changed_positions_touch_only_the_moved_span((len, from, to) in list_and_move()) {
        let before = items(len);
        let after = reorder(before.clone(), &before[from].id, &before[to].id);
        let changed = changed_positions(&before, &after);

        let span = if from == to { 0 } else { from.abs_diff(to) + 1 };
        prop_assert_eq!(changed.len(), span);
    }

    #[test]
    fn prop_rollback_restores_original((len, from, to) in list_and_move()) {
        let original = items(len);
        let mut list = OptimisticList::new(original.clone());
        list.apply_move(&original[from].id, &original[to].id);
        list.rollback();
        prop_assert_eq!(list.items(), original.as_slice());
    }
}
