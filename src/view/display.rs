//! Display helpers shared by the page templates.

use crate::domain::{Todo, TodoList};

/// Orders items for display: incomplete first, then complete.
///
/// This is a stable partition, not a sort: items keep their relative order
/// within each group.
///
/// # Example
///
/// ```
/// use todo_lists::view::sort_for_display;
///
/// let items = [(1, true), (2, false), (3, false)];
/// let ordered: Vec<i32> = sort_for_display(&items, |item| item.1)
///     .into_iter()
///     .map(|item| item.0)
///     .collect();
/// assert_eq!(ordered, vec![2, 3, 1]);
/// ```
pub fn sort_for_display<T>(items: &[T], is_complete: impl Fn(&T) -> bool) -> Vec<&T> {
    let (complete, incomplete): (Vec<&T>, Vec<&T>) =
        items.iter().partition(|&item| is_complete(item));
    incomplete.into_iter().chain(complete).collect()
}

/// Lists in display order.
pub fn sorted_lists(lists: &[TodoList]) -> Vec<&TodoList> {
    sort_for_display(lists, TodoList::is_complete)
}

/// Todos of a list in display order.
pub fn sorted_todos(list: &TodoList) -> Vec<&Todo> {
    sort_for_display(&list.todos, |todo| todo.completed)
}

/// CSS class of a list entry.
pub fn list_class(list: &TodoList) -> Option<&'static str> {
    list.is_complete().then_some("complete")
}

/// CSS class of a todo entry.
pub const fn todo_class(todo: &Todo) -> Option<&'static str> {
    if todo.completed { Some("complete") } else { None }
}
