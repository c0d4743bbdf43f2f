//! Server-rendered pages.
//!
//! Templates are embedded as constants and compiled once at startup. Both
//! pages are complete HTML documents; autoescaping stays on so item text can
//! never inject markup.

use crate::model::{Item, List};
use tera::{Context, Tera};

pub const HOME_TEMPLATE: &str = r#"<html>
<head>
    <title>To-Do lists</title>
</head>
<body>
    <h1>Start a new To-Do list</h1>
    <form method="POST" action="/lists/new">
        <input name="item_text" id="id_new_item" placeholder="Enter a to-do item" />
    </form>
</body>
</html>"#;

pub const LIST_TEMPLATE: &str = r#"<html>
<head>
    <title>To-Do lists</title>
</head>
<body>
    <h1>Your To-Do list</h1>
    <form method="POST" action="/lists/{{ list.id }}/add_item">
        <input name="item_text" id="id_new_item" placeholder="Enter a to-do item" />
    </form>
    <table id="id_list_table">
        {% for item in items %}
        <tr><td>{{ loop.index }}: {{ item.text }}</td></tr>
        {% endfor %}
    </table>
</body>
</html>"#;

pub fn build_templates() -> tera::Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("home.html", HOME_TEMPLATE),
        ("list.html", LIST_TEMPLATE),
    ])?;
    Ok(tera)
}

pub fn render_home(tera: &Tera) -> tera::Result<String> {
    tera.render("home.html", &Context::new())
}

pub fn render_list(tera: &Tera, list: &List, items: &[Item]) -> tera::Result<String> {
    let mut context = Context::new();
    context.insert("list", list);
    context.insert("items", items);
    tera.render("list.html", &context)
}
