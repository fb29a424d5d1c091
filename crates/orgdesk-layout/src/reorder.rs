//! Drag-and-drop reordering
//!
//! A move uses array-move semantics: the moved item is removed and reinserted
//! at the target's former index, so moving down lands after the target and
//! moving up lands before it. Afterwards `display_order` equals the index.

/// Items that carry an explicit display position
pub trait Orderable {
    fn id(&self) -> &str;
    fn display_order(&self) -> usize;
    fn set_display_order(&mut self, order: usize);
}

/// Sort by `display_order` (stable) and renumber from zero
pub fn normalize<T: Orderable>(mut items: Vec<T>) -> Vec<T> {
    items.sort_by_key(|item| item.display_order());
    renumber(&mut items);
    items
}

fn renumber<T: Orderable>(items: &mut [T]) {
    for (index, item) in items.iter_mut().enumerate() {
        item.set_display_order(index);
    }
}

/// Move `moved_id` to the position of `target_id`
///
/// `items` must already be in display order. Unknown ids and self-moves only
/// renumber.
pub fn reorder<T: Orderable>(mut items: Vec<T>, moved_id: &str, target_id: &str) -> Vec<T> {
    let from = items.iter().position(|item| item.id() == moved_id);
    let to = items.iter().position(|item| item.id() == target_id);

    if let (Some(from), Some(to)) = (from, to) {
        if from != to {
            let moved = items.remove(from);
            items.insert(to, moved);
        }
    }

    renumber(&mut items);
    items
}

/// `(id, display_order)` pairs whose position differs between two orderings
pub fn changed_positions<T: Orderable>(before: &[T], after: &[T]) -> Vec<(String, usize)> {
    after
        .iter()
        .filter(|item| {
            before
                .iter()
                .find(|old| old.id() == item.id())
                .map_or(true, |old| old.display_order() != item.display_order())
        })
        .map(|item| (item.id().to_string(), item.display_order()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Card {
        id: String,
        order: usize,
    }

    impl Orderable for Card {
        fn id(&self) -> &str {
            &self.id
        }
        fn display_order(&self) -> usize {
            self.order
        }
        fn set_display_order(&mut self, order: usize) {
            self.order = order;
        }
    }

    fn cards(ids: &[&str]) -> Vec<Card> {
        ids.iter()
            .enumerate()
            .map(|(order, id)| Card {
                id: id.to_string(),
                order,
            })
            .collect()
    }

    fn ids(items: &[Card]) -> Vec<&str> {
        items.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_move_down_lands_after_target() {
        let result = reorder(cards(&["a", "b", "c", "d"]), "a", "c");
        assert_eq!(ids(&result), vec!["b", "c", "a", "d"]);
        assert!(result.iter().enumerate().all(|(i, c)| c.order == i));
    }

    #[test]
    fn test_move_up_lands_before_target() {
        let result = reorder(cards(&["a", "b", "c", "d"]), "d", "b");
        assert_eq!(ids(&result), vec!["a", "d", "b", "c"]);
    }

    #[test]
    fn test_unknown_or_self_move_only_renumbers() {
        let mut gappy = cards(&["a", "b"]);
        gappy[1].order = 7;
        let result = reorder(gappy.clone(), "a", "a");
        assert_eq!(ids(&result), vec!["a", "b"]);
        assert_eq!(result[1].order, 1);

        let result = reorder(gappy, "zzz", "a");
        assert_eq!(ids(&result), vec!["a", "b"]);
    }

    #[test]
    fn test_normalize_sorts_and_renumbers() {
        let mut items = cards(&["a", "b", "c"]);
        items[0].order = 10;
        items[1].order = 3;
        items[2].order = 5;
        let result = normalize(items);
        assert_eq!(ids(&result), vec!["b", "c", "a"]);
        assert_eq!(result[2].order, 2);
    }

    #[test]
    fn test_changed_positions() {
        let before = cards(&["a", "b", "c", "d"]);
        let after = reorder(before.clone(), "b", "c");
        let changed = changed_positions(&before, &after);
        assert_eq!(changed, vec![("c".to_string(), 1), ("b".to_string(), 2)]);
    }
}
