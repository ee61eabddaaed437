pub mod components;
pub mod entity_form;
pub mod entity_list;
pub mod home;
pub mod login;
pub mod notifications;

use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::api::Transport;
use crate::app::{App, Screen};
use crate::models::EntityKind;
use crate::routes::Route;

use self::entity_form::render_entity_form;
use self::entity_list::render_entity_list;
use self::home::render_home;
use self::login::render_login;
use self::notifications::render_notifications;

const NAV: [(&str, Option<EntityKind>); 4] = [
    ("F1 Home", None),
    ("F2 Employees", Some(EntityKind::Employee)),
    ("F3 Clients", Some(EntityKind::Client)),
    ("F4 Products", Some(EntityKind::Product)),
];

/// Draws the navigation bar, the current screen and any notifications on top.
pub fn draw<B: Backend, T: Transport>(f: &mut Frame<B>, app: &mut App<T>) {
    let size = f.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)].as_ref())
        .split(size);

    render_nav_bar(f, chunks[0], app.route(), app.session().user());

    let narrow_width = app.narrow_width();
    match app.screen_mut() {
        Screen::Login(state) => render_login(f, chunks[1], state),
        Screen::Home(state) => render_home(f, chunks[1], state),
        Screen::ClientList(state) => render_entity_list(f, chunks[1], state, narrow_width),
        Screen::ClientForm(state) => render_entity_form(f, chunks[1], state),
        Screen::EmployeeList(state) => render_entity_list(f, chunks[1], state, narrow_width),
        Screen::EmployeeForm(state) => render_entity_form(f, chunks[1], state),
        Screen::ProductList(state) => render_entity_list(f, chunks[1], state, narrow_width),
        Screen::ProductForm(state) => render_entity_form(f, chunks[1], state),
    }

    render_notifications(f, size, app.notifications());
}

fn render_nav_bar<B: Backend>(f: &mut Frame<B>, area: Rect, route: Route, user: Option<&str>) {
    let mut spans = vec![Span::styled(
        "Comandas Admin",
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )];

    if let Some(user) = user {
        for (label, kind) in NAV {
            let active = match kind {
                Some(kind) => route.entity() == Some(kind),
                None => route == Route::Home,
            };
            let style = if active {
                Style::default().bg(Color::Blue).fg(Color::White)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::raw("  "));
            spans.push(Span::styled(label, style));
        }
        spans.push(Span::raw("  "));
        spans.push(Span::styled(format!("F10 Log out ({user})"), Style::default().fg(Color::Gray)));
    }

    let bar = Paragraph::new(Spans::from(spans)).block(Block::default().borders(Borders::ALL).title(route.to_string()));
    f.render_widget(bar, area);
}
