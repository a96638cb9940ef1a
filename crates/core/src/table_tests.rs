//! Tests for the table sort/page/selection transitions.

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::table::{HeaderCheck, Order, TableState, compare_by, empty_rows};

    fn table() -> TableState<u64> {
        TableState::new("item")
    }

    #[test]
    fn defaults() {
        let t = table();
        assert_eq!(t.page(), 0);
        assert_eq!(t.rows_per_page(), 5);
        assert_eq!(t.order_by(), "item");
        assert_eq!(t.order(), Order::Asc);
        assert!(t.selected().is_empty());
    }

    #[test]
    fn sort_same_column_twice_flips_order() {
        let mut t = table();
        t.sort("sku");
        let first = t.order();
        t.sort("sku");
        assert_eq!(t.order(), first.flipped());
        assert_eq!(t.order_by(), "sku");
    }

    #[test]
    fn sort_descending_column_again_goes_ascending() {
        let mut t = table();
        t.sort("item");
        assert_eq!(t.order(), Order::Desc);
        t.sort("item");
        assert_eq!(t.order(), Order::Asc);
    }

    #[test]
    fn sort_new_column_resets_to_ascending() {
        let mut t = table();
        t.sort("item");
        assert_eq!(t.order(), Order::Desc);
        t.sort("quantity");
        assert_eq!(t.order_by(), "quantity");
        assert_eq!(t.order(), Order::Asc);
    }

    #[test]
    fn sort_keeps_page_and_selection() {
        let mut t = table();
        t.change_page(3);
        t.select_row(7);
        t.sort("sku");
        assert_eq!(t.page(), 3);
        assert!(t.is_selected(&7));
    }

    #[test]
    fn select_all_replaces_instead_of_union() {
        let mut t = table();
        t.select_all(true, [1, 2, 3]);
        t.select_all(true, [4, 5]);
        assert_eq!(t.selected(), &BTreeSet::from([4, 5]));
    }

    #[test]
    fn select_all_unchecked_clears() {
        let mut t = table();
        t.select_all(true, [1, 2]);
        t.select_all(false, [1, 2]);
        assert!(t.selected().is_empty());
    }

    #[test]
    fn select_row_toggles() {
        let mut t = table();
        t.select_row(9);
        assert!(t.is_selected(&9));
        t.select_row(9);
        assert!(!t.is_selected(&9));
        assert_eq!(t.selected_count(), 0);
    }

    #[test]
    fn change_rows_per_page_always_resets_page() {
        let mut t = table();
        for (page, size) in [(0, 10), (4, 25), (17, 5), (2, 5)] {
            t.change_page(page);
            t.change_rows_per_page(size);
            assert_eq!(t.page(), 0);
            assert_eq!(t.rows_per_page(), size);
        }
    }

    #[test]
    fn change_page_has_no_bounds_check() {
        let mut t = table();
        t.change_page(1_000);
        assert_eq!(t.page(), 1_000);
        t.reset_page();
        assert_eq!(t.page(), 0);
    }

    #[test]
    fn selection_survives_page_change() {
        let mut t = table();
        t.select_all(true, [1, 2, 3]);
        t.change_page(1);
        assert_eq!(t.selected_count(), 3);
    }

    #[test]
    fn retain_visible_drops_hidden_ids() {
        let mut t = table();
        t.select_all(true, [1, 2, 3]);
        t.retain_visible(&[2, 3, 4]);
        assert_eq!(t.selected(), &BTreeSet::from([2, 3]));
    }

    #[test]
    fn header_check_states() {
        let mut t = table();
        assert_eq!(t.header_check(0), HeaderCheck::Unchecked);
        assert_eq!(t.header_check(3), HeaderCheck::Unchecked);
        t.select_row(1);
        assert_eq!(t.header_check(3), HeaderCheck::Indeterminate);
        t.select_all(true, [1, 2, 3]);
        assert_eq!(t.header_check(3), HeaderCheck::Checked);
    }

    #[test]
    fn payload_window_follows_page() {
        let mut t = table();
        t.change_rows_per_page(10);
        t.change_page(2);
        let payload = t.payload();
        assert_eq!(payload.limit, 10);
        assert_eq!(payload.offset, 20);
        assert!(payload.search.is_empty());
    }

    #[test]
    fn empty_rows_only_on_later_pages() {
        assert_eq!(empty_rows(0, 5, 2), 0);
        assert_eq!(empty_rows(1, 5, 7), 3);
        assert_eq!(empty_rows(1, 5, 12), 0);
    }

    #[test]
    fn compare_by_respects_order() {
        let a = ("b", 2);
        let b = ("a", 1);
        assert_eq!(compare_by(Order::Asc, &a, &b, |r| r.1), std::cmp::Ordering::Greater);
        assert_eq!(compare_by(Order::Desc, &a, &b, |r| r.1), std::cmp::Ordering::Less);
    }
}
