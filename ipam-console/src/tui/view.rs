//! Frame rendering

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};

use super::app::{App, Modal};
use super::forms::{FieldInput, Form};
use crate::api::models::{Choice, label_of};
use crate::api::Device;
use crate::reference::ReferenceCaches;
use crate::refresh::View;

const ACCENT: Color = Color::Cyan;

const IP_COLUMNS: &[&str] = &["ID", "Address", "Role", "Status", "Tenant", "Assigned", "DNS Name"];
const VLAN_COLUMNS: &[&str] = &["ID", "VID", "Name", "Status", "Tenant", "Site"];
const DEVICE_COLUMNS: &[&str] = &["ID", "Name", "Type", "Role", "Site", "Tenant", "Status"];

fn choice_label(choice: &Option<Choice>) -> &str {
    choice.as_ref().map(|c| c.label.as_str()).unwrap_or("")
}

/// Header, body and footer, plus any open modal on top
pub fn ui(frame: &mut Frame<'_>, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(2),
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app);
    render_body(frame, chunks[1], app);
    render_footer(frame, chunks[2], app);

    if let Some(modal) = &app.modal {
        render_modal(frame, modal, &app.snapshot());
    }
}

/// Rows of the body table that fit on screen
pub fn body_height(terminal_height: u16) -> usize {
    // header 3, footer 2, borders 2, column titles 1
    terminal_height.saturating_sub(8) as usize
}

fn render_header(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let mut tabs = Vec::new();
    for (i, view) in View::ALL.iter().enumerate() {
        let style = if *view == app.view {
            Style::default().fg(Color::Black).bg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        tabs.push(Span::styled(format!(" {} {} ", i + 1, view.title()), style));
        tabs.push(Span::raw(" "));
    }

    let countdown = if app.scheduler.is_fetching(app.view) {
        Span::styled("refreshing...", Style::default().fg(Color::Yellow))
    } else {
        Span::styled(
            format!("next refresh in {}s", app.scheduler.remaining(app.view).as_secs()),
            Style::default().fg(Color::DarkGray),
        )
    };

    let header = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("ipam-console", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(app.config.base_url.as_str(), Style::default().fg(Color::White)),
            Span::raw("  "),
            countdown,
        ]),
        Line::from(tabs),
    ])
    .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}

fn render_body(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let (titles, widths, rows): (&[&str], Vec<Constraint>, Vec<Row>) = match app.view {
        View::IpAddresses => (
            IP_COLUMNS,
            vec![
                Constraint::Length(7),
                Constraint::Length(20),
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Length(18),
                Constraint::Length(9),
                Constraint::Min(10),
            ],
            app.visible_ips()
                .into_iter()
                .map(|ip| {
                    Row::new(vec![
                        Cell::from(ip.id.to_string()),
                        Cell::from(ip.address.clone()),
                        Cell::from(choice_label(&ip.role).to_string()),
                        Cell::from(choice_label(&ip.status).to_string()),
                        Cell::from(label_of(&ip.tenant).to_string()),
                        Cell::from(if ip.is_assigned() { "yes" } else { "no" }),
                        Cell::from(ip.dns_name.clone()),
                    ])
                })
                .collect(),
        ),
        View::Vlans => (
            VLAN_COLUMNS,
            vec![
                Constraint::Length(7),
                Constraint::Length(6),
                Constraint::Length(24),
                Constraint::Length(10),
                Constraint::Length(18),
                Constraint::Min(10),
            ],
            app.visible_vlans()
                .into_iter()
                .map(|vlan| {
                    Row::new(vec![
                        Cell::from(vlan.id.to_string()),
                        Cell::from(vlan.vid.to_string()),
                        Cell::from(vlan.name.clone()),
                        Cell::from(choice_label(&vlan.status).to_string()),
                        Cell::from(label_of(&vlan.tenant).to_string()),
                        Cell::from(label_of(&vlan.site).to_string()),
                    ])
                })
                .collect(),
        ),
        View::Devices => (
            DEVICE_COLUMNS,
            vec![
                Constraint::Length(7),
                Constraint::Length(22),
                Constraint::Length(18),
                Constraint::Length(14),
                Constraint::Length(14),
                Constraint::Length(16),
                Constraint::Min(8),
            ],
            app.visible_devices()
                .into_iter()
                .map(|d| {
                    Row::new(vec![
                        Cell::from(d.id.to_string()),
                        Cell::from(d.label().to_string()),
                        Cell::from(d.device_type_label().to_string()),
                        Cell::from(label_of(&d.role).to_string()),
                        Cell::from(label_of(&d.site).to_string()),
                        Cell::from(label_of(&d.tenant).to_string()),
                        Cell::from(d.status_label().to_string()),
                    ])
                })
                .collect(),
        ),
    };

    let title = if app.search.value().is_empty() && !app.searching {
        format!("{} ({})", app.view.title(), rows.len())
    } else {
        format!("{} ({}) /{}", app.view.title(), rows.len(), app.search.value())
    };

    let header = Row::new(titles.iter().copied())
        .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD));
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().title(title).borders(Borders::ALL))
        .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("▸ ");

    let list = app.list();
    let mut state = TableState::default()
        .with_selected(list.selected())
        .with_offset(list.scroll_offset());
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_footer(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let help = if app.searching {
        "type to filter | Enter: keep | Esc: clear"
    } else {
        match app.view {
            View::IpAddresses => "q: quit | 1/2/3: view | r: refresh | /: search | a: add | x: export prefixes | l: login",
            View::Vlans => "q: quit | 1/2/3: view | r: refresh | /: search | a: add | l: login",
            View::Devices => "q: quit | 1/2/3: view | r: refresh | /: search | a: add | i: import | x: export | Enter: detail | l: login",
        }
    };
    let footer = Paragraph::new(vec![
        Line::from(Span::styled(app.status.as_str(), Style::default().fg(Color::White))),
        Line::from(Span::styled(help, Style::default().fg(Color::DarkGray))),
    ]);
    frame.render_widget(footer, area);
}

/// Rectangle of `width` x `height` centered in `area`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_modal(frame: &mut Frame<'_>, modal: &Modal, caches: &ReferenceCaches) {
    match modal {
        Modal::Form(form) => render_form(frame, form, caches),
        Modal::Message { title, body, is_error } => {
            let color = if *is_error { Color::Red } else { Color::Green };
            let height = u16::try_from(body.lines().count()).unwrap_or(u16::MAX).saturating_add(4);
            let area = centered(frame.area(), 70, height.max(5));
            let mut lines: Vec<Line> = body.lines().map(Line::from).collect();
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Enter/Esc: close",
                Style::default().fg(Color::DarkGray),
            )));
            let popup = Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(
                    Block::default()
                        .title(title.as_str())
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(color)),
                );
            frame.render_widget(Clear, area);
            frame.render_widget(popup, area);
        }
        Modal::Device(device) => render_device(frame, device),
    }
}

const FORM_LABEL_WIDTH: u16 = 22;

fn render_form(frame: &mut Frame<'_>, form: &Form, caches: &ReferenceCaches) {
    let height = u16::try_from(form.fields.len()).unwrap_or(u16::MAX).saturating_add(6);
    let area = centered(frame.area(), 64, height);

    let mut lines = Vec::new();
    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let marker = if focused { "▸ " } else { "  " };
        let label = format!("{}{}{}:", marker, field.label, if field.required { "*" } else { "" });
        let value_style = if focused {
            Style::default().fg(Color::Black).bg(ACCENT)
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<22}", label), Style::default().fg(Color::Gray)),
            Span::styled(field.display(caches), value_style),
        ]));
    }

    lines.push(Line::from(""));
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(error.as_str(), Style::default().fg(Color::Red))));
    } else if form.confirming {
        lines.push(Line::from(Span::styled(
            "Submit? y: yes, any other key: back",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Tab: next | ←/→: choose | Enter: submit | Esc: cancel",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let popup = Paragraph::new(lines).block(
        Block::default()
            .title(form.kind.title())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT)),
    );
    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);

    if form.confirming {
        return;
    }
    if let Some(FieldInput::Text(input)) = form.fields.get(form.focus).map(|f| &f.input) {
        let offset = u16::try_from(input.cursor()).unwrap_or(u16::MAX);
        let right = area.right().saturating_sub(2);
        let x = (area.x + 1 + FORM_LABEL_WIDTH).saturating_add(offset).min(right);
        let y = area.y + 1 + u16::try_from(form.focus).unwrap_or(u16::MAX);
        if y < area.bottom().saturating_sub(1) {
            frame.set_cursor_position((x, y));
        }
    }
}

fn render_device(frame: &mut Frame<'_>, device: &Device) {
    let fields = [
        ("ID", device.id.to_string()),
        ("Type", device.device_type_label().to_string()),
        ("Manufacturer", device.manufacturer_label().to_string()),
        ("Role", label_of(&device.role).to_string()),
        ("Site", label_of(&device.site).to_string()),
        ("Tenant", label_of(&device.tenant).to_string()),
        ("Serial", device.serial.clone()),
        ("Status", device.status_label().to_string()),
        ("Description", device.description.clone()),
    ];
    let area = centered(frame.area(), 60, fields.len() as u16 + 4);

    let mut lines: Vec<Line> = fields
        .into_iter()
        .map(|(name, value)| {
            Line::from(vec![
                Span::styled(format!("{:<14}", name), Style::default().fg(Color::Gray)),
                Span::raw(value),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Enter/Esc: close", Style::default().fg(Color::DarkGray))));

    let popup = Paragraph::new(lines).block(
        Block::default()
            .title(device.label())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT)),
    );
    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}
