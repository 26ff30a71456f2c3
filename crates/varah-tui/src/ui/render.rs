use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{AddFocus, App, AppState, LoginFocus, Tab};

use super::styles;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(2), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    match app.state {
        AppState::LoggingIn => render_login_overlay(frame, app),
        AppState::AddingEmployee => render_add_overlay(frame, app),
        AppState::ConfirmingDelete => render_delete_overlay(frame, app),
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::Normal | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, _app: &App, area: Rect) {
    let title = "  Varah";
    let help_hint = "[?] Help";

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title.len() as u16 + help_hint.len() as u16 + 4) as usize,
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let tabs = [
        ("[1] Employees", Tab::Employees),
        ("[2] Logs", Tab::Logs),
        ("[3] Kiosks", Tab::Kiosks),
    ];

    let mut spans = vec![Span::raw(" ")];
    for (i, (label, tab)) in tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        spans.push(Span::styled(
            *label,
            styles::tab_style(app.current_tab == *tab),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Employees => render_employee_table(frame, app, area),
        Tab::Logs => render_placeholder(
            frame,
            area,
            " Activity Logs ",
            "The service does not expose activity logs yet.",
        ),
        Tab::Kiosks => render_placeholder(
            frame,
            area,
            " Kiosks ",
            "No kiosks are configured for this company.",
        ),
    }
}

fn render_placeholder(frame: &mut Frame, area: Rect, title: &str, text: &str) {
    let paragraph = Paragraph::new(Line::from(Span::styled(text, styles::muted_style()))).block(
        Block::default()
            .title(title)
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(false)),
    );
    frame.render_widget(paragraph, area);
}

fn render_employee_table(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new([
        Cell::from("Name"),
        Cell::from("NFC Card"),
        Cell::from("Id"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .employees
        .iter()
        .enumerate()
        .map(|(i, employee)| {
            let style = if i == app.employee_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            Row::new([
                Cell::from(employee.display_name().to_string()),
                Cell::from(employee.card_display().to_string()),
                Cell::from(format!("{:>4}", employee.id)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(50), // Name
        Constraint::Fill(2),        // NFC Card
        Constraint::Length(6),      // Id
    ];

    let title = if app.loading {
        format!(" Employees ({}) - refreshing... ", app.employees.len())
    } else {
        format!(" Employees ({}) - [a]dd [d]elete [r]efresh ", app.employees.len())
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if !app.employees.is_empty() {
        state.select(Some(app.employee_selection));
    }

    frame.render_stateful_widget(table, area, &mut state);

    if app.employees.is_empty() && !app.loading {
        let inner = centered_rect(60, 20, area);
        let empty = Paragraph::new(Line::from(Span::styled(
            "No employees found.",
            styles::muted_style(),
        )));
        frame.render_widget(empty, inner);
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left = match &app.status_message {
        Some(msg) if msg.starts_with("Error") => {
            Span::styled(format!(" {}", msg), styles::error_style())
        }
        Some(msg) => Span::styled(format!(" {}", msg), styles::success_style()),
        None if app.is_authenticated() => Span::styled(" Connected", styles::muted_style()),
        None => Span::styled(" Not logged in", styles::muted_style()),
    };

    let right = match app.last_refreshed {
        Some(ts) => format!("refreshed {} ", ts.format("%H:%M:%S")),
        None => String::new(),
    };

    let padding = (area.width as usize)
        .saturating_sub(left.content.len() + right.len());

    let line = Line::from(vec![
        left,
        Span::raw(" ".repeat(padding)),
        Span::styled(right, styles::muted_style()),
    ]);

    frame.render_widget(
        Paragraph::new(line).style(styles::status_bar_style()),
        area,
    );
}

// ============================================================================
// Overlays
// ============================================================================

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect(50, 45, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Log In ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Email
            Constraint::Length(3), // Password
            Constraint::Length(1), // Button
            Constraint::Length(2), // Error message
        ])
        .split(area);

    render_input_field(
        frame,
        chunks[0],
        "Email",
        &app.login_email,
        app.login_focus == LoginFocus::Email,
        false,
    );
    render_input_field(
        frame,
        chunks[1],
        "Password",
        &app.login_password,
        app.login_focus == LoginFocus::Password,
        true,
    );

    let button_style = if app.login_focus == LoginFocus::Button {
        styles::selected_style()
    } else {
        styles::muted_style()
    };
    frame.render_widget(
        Paragraph::new(Span::styled("[ Log In ]", button_style)),
        chunks[2],
    );

    if let Some(ref error) = app.login_error {
        frame.render_widget(
            Paragraph::new(Span::styled(error.as_str(), styles::error_style())),
            chunks[3],
        );
    }
}

fn render_add_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect(50, 45, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Add Employee ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Name
            Constraint::Length(3), // Card id
            Constraint::Length(1), // Button
            Constraint::Length(2), // Error message
        ])
        .split(area);

    render_input_field(
        frame,
        chunks[0],
        "Name",
        &app.add_name,
        app.add_focus == AddFocus::Name,
        false,
    );
    render_input_field(
        frame,
        chunks[1],
        "NFC Card Id",
        &app.add_card_id,
        app.add_focus == AddFocus::CardId,
        false,
    );

    let button_style = if app.add_focus == AddFocus::Button {
        styles::selected_style()
    } else {
        styles::muted_style()
    };
    frame.render_widget(
        Paragraph::new(Span::styled("[ Add ]", button_style)),
        chunks[2],
    );

    if let Some(ref error) = app.add_error {
        frame.render_widget(
            Paragraph::new(Span::styled(error.as_str(), styles::error_style())),
            chunks[3],
        );
    }
}

fn render_input_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    focused: bool,
    mask: bool,
) {
    let shown = if mask {
        "*".repeat(value.len())
    } else {
        value.to_string()
    };

    let field = Paragraph::new(shown).block(
        Block::default()
            .title(format!(" {} ", label))
            .borders(Borders::ALL)
            .border_style(styles::border_style(focused)),
    );
    frame.render_widget(field, area);
}

fn render_delete_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect(50, 22, frame.area());
    frame.render_widget(Clear, area);

    let name = app
        .selected_employee()
        .map(|e| e.display_name().to_string())
        .unwrap_or_default();

    let lines = vec![
        Line::from(""),
        Line::from(Span::raw(format!("Delete employee \"{}\"?", name))),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y]", styles::help_key_style()),
            Span::raw(" delete   "),
            Span::styled("[n]", styles::help_key_style()),
            Span::raw(" cancel"),
        ]),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Confirm Delete ")
            .title_style(styles::error_style())
            .borders(Borders::ALL)
            .border_style(styles::error_style()),
    );
    frame.render_widget(paragraph, area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, area);

    let key = styles::help_key_style();
    let desc = styles::help_desc_style();

    let entry = |k: &'static str, d: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", k), key),
            Span::styled(d, desc),
        ])
    };

    let lines = vec![
        Line::from(""),
        entry("1/2/3", "switch tab"),
        entry("Tab", "next tab"),
        entry("j/k, ↓/↑", "move selection"),
        entry("a", "add employee"),
        entry("d", "delete selected employee"),
        entry("r", "refresh roster"),
        entry("L", "log out"),
        entry("?", "toggle this help"),
        entry("q", "quit"),
        Line::from(""),
        Line::from(Span::styled("  press any key to close", styles::muted_style())),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Help ")
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(true)),
    );
    frame.render_widget(paragraph, area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect(40, 20, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::raw("Quit Varah?")),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y]", styles::help_key_style()),
            Span::raw(" quit   "),
            Span::styled("[n]", styles::help_key_style()),
            Span::raw(" stay"),
        ]),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Confirm ")
            .borders(Borders::ALL)
            .border_style(styles::border_style(true)),
    );
    frame.render_widget(paragraph, area);
}

/// Centered rect helper for overlays, sized as percentages of the frame
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
