//! Page templates.
//!
//! Every page is rendered inside [`layout`], which shows and consumes the
//! session's flash messages. All user-supplied text goes through
//! [`escape`].

use std::fmt::Write;

use super::display::{list_class, sorted_lists, sorted_todos, todo_class};
use super::html::escape;
use crate::domain::{NAME_MAX_LENGTH, TodoList};
use crate::infrastructure::Flash;

/// Sends delete forms marked `data-async` with `X-Requested-With`.
///
/// A list delete answers with the path to go to; a todo delete answers 204
/// and the entry is removed in place.
const ASYNC_DELETE_SCRIPT: &str = r#"<script>
document.addEventListener("submit", function (event) {
  var form = event.target;
  if (!form.matches("form[data-async]")) { return; }
  event.preventDefault();
  if (!window.confirm("Are you sure? This cannot be undone.")) { return; }
  fetch(form.action, { method: "POST", headers: { "X-Requested-With": "XMLHttpRequest" } })
    .then(function (response) {
      if (response.status === 204) {
        var item = form.closest("li");
        if (item) { item.remove(); }
      } else if (response.ok) {
        response.text().then(function (path) { window.location = path; });
      }
    });
});
</script>"#;

fn class_attribute(class: Option<&str>) -> String {
    class.map_or_else(String::new, |class| format!(r#" class="{class}""#))
}

/// Wraps page content with the document shell and flash messages.
pub fn layout(title: &str, flash: &Flash, content: &str) -> String {
    let mut page = String::with_capacity(content.len() + 1024);

    // write! to String is infallible
    let _ = write!(
        page,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{} | Todos</title>\n</head>\n<body>\n<header><h1><a href=\"/lists\">Todo Tracker</a></h1></header>\n<main>\n",
        escape(title)
    );

    if let Some(error) = &flash.error {
        let _ = writeln!(page, r#"<div class="flash error"><p>{}</p></div>"#, escape(error));
    }
    if let Some(success) = &flash.success {
        let _ = writeln!(
            page,
            r#"<div class="flash success"><p>{}</p></div>"#,
            escape(success)
        );
    }

    page.push_str(content);
    page.push_str("\n</main>\n");
    page.push_str(ASYNC_DELETE_SCRIPT);
    page.push_str("\n</body>\n</html>\n");
    page
}

/// Index of all lists, incomplete lists first.
pub fn lists_page(lists: &[TodoList], flash: &Flash) -> String {
    let mut content = String::new();
    content.push_str("<h2>Lists</h2>\n");

    if lists.is_empty() {
        content.push_str("<p>You have no lists yet.</p>\n");
    } else {
        content.push_str("<ul id=\"lists\">\n");
        for list in sorted_lists(lists) {
            let _ = writeln!(
                content,
                r#"<li{}><a href="/lists/{}"><h3>{}</h3><p>{} / {}</p></a></li>"#,
                class_attribute(list_class(list)),
                list.list_id,
                escape(&list.name),
                list.todos_remaining_count(),
                list.todos.len()
            );
        }
        content.push_str("</ul>\n");
    }

    content.push_str(r#"<p><a href="/lists/new">New List</a></p>"#);
    layout("Lists", flash, &content)
}

fn list_name_field(list_name: &str) -> String {
    format!(
        r#"<label for="list_name">Enter the name for your list:</label>
<input id="list_name" name="list_name" maxlength="{NAME_MAX_LENGTH}" value="{}">"#,
        escape(list_name)
    )
}

/// Form for creating a list, pre-filled with `list_name`.
pub fn new_list_page(list_name: &str, flash: &Flash) -> String {
    let content = format!(
        r#"<h2>New List</h2>
<form action="/lists" method="post">
{}
<button type="submit">Save</button>
<a href="/lists">Cancel</a>
</form>"#,
        list_name_field(list_name)
    );
    layout("New List", flash, &content)
}

/// Detail view of one list, with forms for its todos.
///
/// `todo_input` pre-fills the add-todo field.
pub fn list_page(list: &TodoList, todo_input: &str, flash: &Flash) -> String {
    let list_id = list.list_id;
    let mut content = String::new();

    let _ = write!(
        content,
        r#"<section id="todos"{}>
<header>
<h2>{}</h2>
<p><a href="/lists/{list_id}/edit">Edit List</a></p>
<form action="/lists/{list_id}/complete_all" method="post"><button type="submit">Complete All</button></form>
</header>
<ul>
"#,
        class_attribute(list_class(list)),
        escape(&list.name)
    );

    for todo in sorted_todos(list) {
        let todo_id = todo.todo_id;
        let _ = writeln!(
            content,
            r#"<li{}>
<form action="/lists/{list_id}/todos/{todo_id}/check" method="post" class="check"><input type="hidden" name="completed" value="{}"><button type="submit">Toggle</button></form>
<h3>{}</h3>
<form action="/lists/{list_id}/todos/{todo_id}/delete" method="post" class="delete" data-async><button type="submit">Delete</button></form>
</li>"#,
            class_attribute(todo_class(todo)),
            !todo.completed,
            escape(&todo.name)
        );
    }

    let _ = write!(
        content,
        r#"</ul>
</section>
<form action="/lists/{list_id}/todos" method="post">
<label for="todo">Enter a new todo item:</label>
<input id="todo" name="todo" maxlength="{NAME_MAX_LENGTH}" placeholder="Something to do" value="{}">
<button type="submit">Add</button>
</form>
<p><a href="/lists">All Lists</a></p>"#,
        escape(todo_input)
    );

    layout(&list.name, flash, &content)
}

/// Form for renaming a list, pre-filled with `list_name`.
pub fn edit_list_page(list: &TodoList, list_name: &str, flash: &Flash) -> String {
    let list_id = list.list_id;
    let content = format!(
        r#"<h2>Editing '{}'</h2>
<form action="/lists/{list_id}" method="post">
{}
<button type="submit">Save</button>
<a href="/lists/{list_id}">Cancel</a>
</form>
<form action="/lists/{list_id}/delete" method="post" class="delete" data-async>
<button type="submit">Delete List</button>
</form>"#,
        escape(&list.name),
        list_name_field(list_name)
    );
    layout("Edit List", flash, &content)
}

/// Body of the 404 response.
pub const fn not_found_page() -> &'static str {
    "<html><body><h1>404 Not Found</h1></body></html>"
}

/// Body of the 500 response.
pub const fn internal_error_page() -> &'static str {
    "<html><body><h1>500 Internal Server Error</h1><p>Something went wrong. No changes were saved.</p></body></html>"
}
