//! End-to-end selector interactions driven through sequence playback.

use std::cell::{Cell, RefCell};
use std::ops::Range;
use std::rc::Rc;

use sidekick_cli::selection::{Key, SelectResult, Selector};
use sidekick_core::error::Error;

fn selector(options: &[&str]) -> Selector<String> {
    let mut selector = Selector::new();
    selector.load(options.iter().map(ToString::to_string).collect());
    selector
}

fn expect_single(result: SelectResult<String>) -> (usize, String) {
    match result {
        SelectResult::Single { index, option } => (index, option),
        SelectResult::Multi { .. } => panic!("expected a single selection"),
    }
}

fn expect_multi(result: SelectResult<String>) -> (Range<usize>, Vec<String>) {
    match result {
        SelectResult::Multi { range, options } => (range, options),
        SelectResult::Single { .. } => panic!("expected a range selection"),
    }
}

#[test]
fn test_movement_and_default_select() {
    let mut s = selector(&["a", "b", "c", "d"]);
    let (index, option) = expect_single(s.run_sequence("jj\r").unwrap());
    assert_eq!((index, option.as_str()), (2, "c"));
}

#[test]
fn test_movement_wraps_both_ways() {
    let mut s = selector(&["a", "b", "c", "d"]);
    let (index, _) = expect_single(s.run_sequence("k\r").unwrap());
    assert_eq!(index, 3);

    let mut s = selector(&["a", "b", "c", "d"]);
    let (index, _) = expect_single(s.run_sequence("jjjj\r").unwrap());
    assert_eq!(index, 0);
}

#[test]
fn test_quit() {
    let mut s = selector(&["a", "b"]);
    let err = s.run_sequence("q").unwrap_err();
    assert!(matches!(err, Error::Quit));
}

#[test]
fn test_empty_options() {
    let mut s = selector(&[]);
    let err = s.run_sequence("j").unwrap_err();
    assert!(matches!(err, Error::Empty));
}

#[test]
fn test_number_entry_jump() {
    let mut s = selector(&["a", "b", "c", "d"]);
    let (index, _) = expect_single(s.run_sequence("3\r\r").unwrap());
    assert_eq!(index, 2);
}

#[test]
fn test_number_entry_clamps_to_last_option() {
    let mut s = selector(&["a", "b", "c", "d"]);
    let (index, option) = expect_single(s.run_sequence("99\r\r").unwrap());
    assert_eq!((index, option.as_str()), (3, "d"));
}

#[test]
fn test_number_entry_respects_display_offset() {
    let mut s: Selector<String> = Selector::with_offset(11);
    s.load(["a", "b", "c"].iter().map(ToString::to_string).collect());
    let (index, _) = expect_single(s.run_sequence("12\r\r").unwrap());
    assert_eq!(index, 1);
}

#[test]
fn test_number_entry_backspace_leaves_the_mode() {
    let mut s = selector(&["a", "b", "c"]);
    // digits in, digits out again; the trailing j proves normal mode
    let (index, _) = expect_single(s.run_sequence("19\x7f\x7fj\r").unwrap());
    assert_eq!(index, 1);
}

#[test]
fn test_search_is_insensitive_for_lowercase_needles() {
    let mut s = selector(&["cherry", "Apple", "apple"]);
    let (index, option) = expect_single(s.run_sequence("/apple\r\r").unwrap());
    assert_eq!((index, option.as_str()), (1, "Apple"));
}

#[test]
fn test_search_is_sensitive_for_uppercase_needles() {
    let mut s = selector(&["apple", "cherry", "Apple"]);
    let (index, option) = expect_single(s.run_sequence("/Apple\r\r").unwrap());
    assert_eq!((index, option.as_str()), (2, "Apple"));
}

#[test]
fn test_search_repeat_forwards_and_backwards() {
    let mut s = selector(&["cherry", "Apple", "apple"]);
    let (index, option) = expect_single(s.run_sequence("/apple\rn\r").unwrap());
    assert_eq!((index, option.as_str()), (2, "apple"));

    let mut s = selector(&["cherry", "Apple", "apple"]);
    // forwards past the end wraps around
    let (index, _) = expect_single(s.run_sequence("/apple\rnn\r").unwrap());
    assert_eq!(index, 1);

    let mut s = selector(&["cherry", "Apple", "apple"]);
    let (index, _) = expect_single(s.run_sequence("/apple\rN\r").unwrap());
    assert_eq!(index, 2);
}

#[test]
fn test_search_backspace_on_empty_leaves_the_mode() {
    let mut s = selector(&["a", "b", "c"]);
    let (index, _) = expect_single(s.run_sequence("/z\x7f\x7fj\r").unwrap());
    assert_eq!(index, 1);
}

#[test]
fn test_non_recurring_binding_ends_the_selection() {
    let hits = Rc::new(Cell::new(0));
    let mut s = selector(&["a", "b", "c"]);
    {
        let hits = Rc::clone(&hits);
        s.register_keys(
            &[Key::Char('x')],
            Box::new(move |_, pos| {
                hits.set(hits.get() + 1);
                assert_eq!(pos, 1);
                Ok(())
            }),
            "pick",
            false,
        );
    }
    let (index, option) = expect_single(s.run_sequence("jx").unwrap());
    assert_eq!((index, option.as_str()), (1, "b"));
    assert_eq!(hits.get(), 1);
}

#[test]
fn test_recurring_binding_keeps_the_loop_alive() {
    let mut s = selector(&["a", "b", "c"]);
    s.register_keys(
        &[Key::Char('d')],
        Box::new(|state, pos| {
            let mut options = state.options().to_vec();
            options.remove(pos);
            state.load(options);
            Ok(())
        }),
        "delete",
        true,
    );
    let (index, option) = expect_single(s.run_sequence("dd\r").unwrap());
    assert_eq!((index, option.as_str()), (0, "c"));
}

#[test]
fn test_recurring_binding_clamps_the_cursor_after_shrinking() {
    let mut s = selector(&["a", "b", "c"]);
    s.register_keys(
        &[Key::Char('d')],
        Box::new(|state, pos| {
            let mut options = state.options().to_vec();
            options.remove(pos);
            state.load(options);
            Ok(())
        }),
        "delete",
        true,
    );
    // delete the last row; the cursor must land on the new last row
    let (index, option) = expect_single(s.run_sequence("kd\r").unwrap());
    assert_eq!((index, option.as_str()), (1, "b"));
}

#[test]
fn test_virtual_range_selection() {
    let seen = Rc::new(RefCell::new(None::<Range<usize>>));
    let mut s = selector(&["a", "b", "c", "d"]);
    {
        let seen = Rc::clone(&seen);
        s.register_keys_virtual(
            &[Key::Char('d')],
            Box::new(move |_, range| {
                *seen.borrow_mut() = Some(range);
                Ok(())
            }),
            "take",
            false,
        );
    }
    let (range, options) = expect_multi(s.run_sequence("vjjd").unwrap());
    assert_eq!(range, 0..3);
    assert_eq!(options, vec!["a", "b", "c"]);
    assert_eq!(*seen.borrow(), Some(0..3));
}

#[test]
fn test_virtual_range_selection_backwards() {
    let mut s = selector(&["a", "b", "c", "d"]);
    s.register_keys_virtual(&[Key::Char('d')], Box::new(|_, _| Ok(())), "take", false);
    let (range, options) = expect_multi(s.run_sequence("kvkd").unwrap());
    assert_eq!(range, 2..4);
    assert_eq!(options, vec!["c", "d"]);
}

#[test]
fn test_recurring_virtual_delete_then_select() {
    let mut s = selector(&["a", "b", "c", "d"]);
    s.register_keys_virtual(
        &[Key::Char('d')],
        Box::new(|state, range| {
            let mut options = state.options().to_vec();
            options.drain(range);
            state.load(options);
            state.exit_virtual();
            Ok(())
        }),
        "delete range",
        true,
    );
    let (index, option) = expect_single(s.run_sequence("vjjd\r").unwrap());
    assert_eq!((index, option.as_str()), (0, "d"));
}

#[test]
fn test_virtual_key_works_on_the_cursor_row_outside_virtual_mode() {
    let seen = Rc::new(RefCell::new(None::<Range<usize>>));
    let mut s = selector(&["a", "b", "c"]);
    {
        let seen = Rc::clone(&seen);
        s.register_keys_virtual(
            &[Key::Char('w')],
            Box::new(move |_, range| {
                *seen.borrow_mut() = Some(range);
                Ok(())
            }),
            "wait",
            false,
        );
    }
    let (index, option) = expect_single(s.run_sequence("jw").unwrap());
    assert_eq!((index, option.as_str()), (1, "b"));
    assert_eq!(*seen.borrow(), Some(1..2));
}

#[test]
fn test_quit_leaves_virtual_mode_first() {
    let mut s = selector(&["a", "b", "c"]);
    s.register_keys_virtual(&[Key::Char('d')], Box::new(|_, _| Ok(())), "take", false);
    let (index, _) = expect_single(s.run_sequence("vjq\r").unwrap());
    assert_eq!(index, 1);
}

#[test]
fn test_virtual_key_without_bindings_is_ignored() {
    let mut s = selector(&["a", "b"]);
    let (index, _) = expect_single(s.run_sequence("v\r").unwrap());
    assert_eq!(index, 0);
}

#[test]
fn test_enter_override() {
    let hits = Rc::new(Cell::new(0));
    let mut s = selector(&["a", "b"]);
    {
        let hits = Rc::clone(&hits);
        s.register_keys(
            &[Key::Enter],
            Box::new(move |_, _| {
                hits.set(hits.get() + 1);
                Ok(())
            }),
            "run",
            false,
        );
    }
    let (index, _) = expect_single(s.run_sequence("j\r").unwrap());
    assert_eq!(index, 1);
    assert_eq!(hits.get(), 1);
}

#[test]
fn test_recurring_virtual_enter_disables_the_default_select() {
    let mut s = selector(&["a", "b"]);
    s.register_keys_virtual(&[Key::Enter], Box::new(|_, _| Ok(())), "do nothing", true);
    // Enter no longer ends the interaction; only quitting does
    let err = s.run_sequence("\r\rq").unwrap_err();
    assert!(matches!(err, Error::Quit));
}

#[test]
fn test_help_screen_swallows_the_dismissing_key() {
    let mut s = selector(&["a", "b"]);
    // the x dismisses the help screen instead of acting as a key
    let (index, _) = expect_single(s.run_sequence("hx\r").unwrap());
    assert_eq!(index, 0);
}
