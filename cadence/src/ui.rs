use crate::app::{App, AppMode};
use crate::timer::Severity;
use cadence_ipc::TimerState;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Gauge, List, ListItem, Paragraph},
    Frame,
};

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(8),
            Constraint::Min(6),
            Constraint::Length(3),
        ])
        .split(area);

    draw_header(f, chunks[0], app);
    draw_timer(f, chunks[1], app);
    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[2]);
    draw_tasks(f, middle[0], app);
    draw_durations(f, middle[1], app);
    draw_status_bar(f, chunks[3], app);

    match app.mode {
        AppMode::SelectingPreset => draw_preset_overlay(f, app),
        AppMode::ShowHelp => draw_help_overlay(f, app),
        AppMode::Normal => {}
    }

    if app.toast.is_some() {
        draw_toast(f, app);
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let icons = &app.config.icons;
    let text = Line::from(vec![
        Span::raw(icons.header_left.clone()),
        Span::styled(
            "CADENCE",
            Style::default().fg(theme.blue).add_modifier(Modifier::BOLD),
        ),
        Span::raw(icons.header_right.clone()),
    ]);
    f.render_widget(
        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(theme.black)),
        ),
        area,
    );
}

fn draw_timer(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let icons = &app.config.icons;
    let snapshot = &app.snapshot;
    let kind = snapshot.session.kind();
    let accent = if kind.is_break() { theme.cyan } else { theme.green };

    let block = Block::default()
        .title(Span::styled(
            format!(" {} {} ", icons.timer, kind.label()),
            Style::default().fg(theme.gray),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(accent));
    let inner_area = block.inner(area);
    f.render_widget(block, area);
    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner_area);

    let state_icon = match snapshot.state {
        TimerState::Running => &icons.play,
        TimerState::Paused => &icons.pause,
        TimerState::Idle => &icons.idle,
    };
    f.render_widget(
        Paragraph::new(format!("{} {}", state_icon, app.time_display()))
            .style(
                Style::default()
                    .fg(theme.foreground)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center),
        v_chunks[0],
    );
    f.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(accent).bg(theme.black))
            .percent((snapshot.progress * 100.0) as u16),
        v_chunks[1],
    );

    let mut cycle_line = Vec::new();
    if let Some(long_break) = snapshot.durations.long_break {
        let done = snapshot.completed_work_cycles.min(long_break.every) as usize;
        cycle_line.push(Span::styled(
            icons.cycle_done.repeat(done),
            Style::default().fg(theme.selection),
        ));
        cycle_line.push(Span::styled(
            icons
                .cycle_pending
                .repeat(long_break.every as usize - done),
            Style::default().fg(theme.gray),
        ));
    } else {
        cycle_line.push(Span::styled(
            format!("{} cycles", snapshot.completed_work_cycles),
            Style::default().fg(theme.gray),
        ));
    }
    f.render_widget(
        Paragraph::new(Line::from(cycle_line)).alignment(Alignment::Center),
        v_chunks[2],
    );
    f.render_widget(
        Paragraph::new(format!("Next: {}", snapshot.next_label))
            .style(Style::default().fg(theme.gray))
            .alignment(Alignment::Center),
        v_chunks[3],
    );
}

fn draw_tasks(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let icons = &app.config.icons;

    let block = Block::default()
        .title(Span::styled(
            format!(" {} Current task ", icons.task),
            Style::default().fg(theme.gray),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.blue));
    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let Some(task) = app.active_task() else {
        f.render_widget(
            Paragraph::new(vec![
                Line::from(Span::styled(
                    "No tasks queued",
                    Style::default().fg(theme.foreground),
                )),
                Line::from(Span::styled(
                    "cadencectl task --add <title>",
                    Style::default().fg(theme.gray),
                )),
            ]),
            inner_area,
        );
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            task.title.clone(),
            Style::default()
                .fg(theme.foreground)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            task.project.clone().unwrap_or_else(|| "No project".to_string()),
            Style::default().fg(theme.gray),
        )),
    ];
    let upcoming: Vec<_> = app.upcoming_tasks().collect();
    if !upcoming.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "Up next",
            Style::default().fg(theme.blue),
        )));
        for next in upcoming {
            let mut spans = vec![
                Span::styled(
                    format!("{} ", icons.cycle_pending),
                    Style::default().fg(theme.blue),
                ),
                Span::raw(next.title.clone()),
            ];
            if let Some(project) = &next.project {
                spans.push(Span::styled(
                    format!(" ({})", project),
                    Style::default().fg(theme.gray),
                ));
            }
            lines.push(Line::from(spans));
        }
    }
    f.render_widget(Paragraph::new(lines), inner_area);
}

fn draw_durations(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let icons = &app.config.icons;
    let durations = &app.snapshot.durations;
    let preset_title = app
        .selected_preset()
        .map(|p| p.title.clone())
        .unwrap_or_default();

    let block = Block::default()
        .title(Span::styled(
            format!(" {} {} ", icons.presets, preset_title),
            Style::default().fg(theme.gray),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.magenta));
    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let row = |label: &str, value: String, keys: &str| {
        Line::from(vec![
            Span::styled(format!("{:<14}", label), Style::default().fg(theme.gray)),
            Span::styled(
                format!("{:>8}", value),
                Style::default()
                    .fg(theme.foreground)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {} {}", icons.separator, keys),
                Style::default().fg(theme.black),
            ),
        ])
    };
    let mut lines = vec![
        row("Focus", format!("{} min", durations.focus_minutes), "f/F"),
        row(
            "Short break",
            format!("{} min", durations.short_break_minutes),
            "b/B",
        ),
    ];
    if let Some(long_break) = durations.long_break {
        lines.push(row("Long break", format!("{} min", long_break.minutes), "l/L"));
        lines.push(row("Cycles", long_break.every.to_string(), "c/C"));
    }
    f.render_widget(Paragraph::new(lines), inner_area);
}

fn draw_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let (mode_text, mode_color) = match app.mode {
        AppMode::Normal => ("NORMAL", theme.green),
        AppMode::SelectingPreset => ("PRESET", theme.magenta),
        AppMode::ShowHelp => ("HELP", theme.magenta),
    };
    let help = match app.mode {
        AppMode::Normal => {
            "space:play/pause │ s:stop │ r:reset │ n:skip │ t:next task │ p:preset │ ?:help │ q:quit"
        }
        AppMode::SelectingPreset => "1-9:select │ esc:cancel",
        AppMode::ShowHelp => "esc:close",
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                format!(" {} ", mode_text),
                Style::default()
                    .bg(mode_color)
                    .fg(theme.background)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::raw(help),
        ]))
        .block(Block::default().style(Style::default().bg(theme.black).fg(theme.gray))),
        area,
    );
}

fn draw_preset_overlay(f: &mut Frame, app: &App) {
    let theme = &app.config.theme;
    let area = centered_rect(60, 50, f.area());
    f.render_widget(Clear, area);
    let items: Vec<ListItem> = app
        .presets
        .iter()
        .enumerate()
        .map(|(i, preset)| {
            let marker = if preset.selected {
                app.config.icons.select.as_str()
            } else {
                " "
            };
            let mut spans = vec![
                Span::styled(format!("{} ", marker), Style::default().fg(theme.selection)),
                Span::styled(format!("{}. ", i + 1), Style::default().fg(theme.blue)),
                Span::raw(preset.title.clone()),
                Span::styled(
                    format!(
                        " ({}m / {}m)",
                        preset.focus_minutes, preset.short_break_minutes
                    ),
                    Style::default().fg(theme.gray),
                ),
            ];
            if let Some(badge) = &preset.badge {
                spans.push(Span::styled(
                    format!(" [{}]", badge),
                    Style::default().fg(theme.yellow),
                ));
            }
            ListItem::new(vec![
                Line::from(spans),
                Line::from(Span::styled(
                    format!("     {}", preset.description),
                    Style::default().fg(theme.gray),
                )),
            ])
        })
        .collect();
    f.render_widget(
        List::new(items).block(
            Block::default()
                .title(" Select Preset ")
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(theme.magenta))
                .style(Style::default().bg(theme.background)),
        ),
        area,
    );
}

fn draw_help_overlay(f: &mut Frame, app: &App) {
    let theme = &app.config.theme;
    let area = centered_rect(60, 70, f.area());
    f.render_widget(Clear, area);

    let shortcuts = [
        (
            "Timer",
            vec![
                ("Space", "Start / pause"),
                ("s", "Stop and start over"),
                ("r", "Reset current session"),
                ("n", "Skip to next session"),
                ("t", "Next task"),
            ],
        ),
        (
            "Durations",
            vec![
                ("f / F", "Focus +5 / -5 min"),
                ("b / B", "Short break +1 / -1 min"),
                ("l / L", "Long break +5 / -5 min"),
                ("c / C", "Cycles +1 / -1"),
                ("p", "Choose preset"),
            ],
        ),
        ("General", vec![("?", "Toggle help"), ("q", "Quit")]),
    ];

    let mut lines = Vec::new();
    for (section, keys) in shortcuts {
        lines.push(Line::from(Span::styled(
            section,
            Style::default().fg(theme.blue).add_modifier(Modifier::BOLD),
        )));
        for (key, description) in keys {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<8}", key), Style::default().fg(theme.selection)),
                Span::styled(description, Style::default().fg(theme.foreground)),
            ]));
        }
        lines.push(Line::default());
    }

    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(theme.magenta))
                .style(Style::default().bg(theme.background)),
        ),
        area,
    );
}

fn draw_toast(f: &mut Frame, app: &App) {
    let Some(toast) = &app.toast else {
        return;
    };
    let theme = &app.config.theme;
    let color: Color = match toast.notification.severity {
        Severity::Info => theme.blue,
        Severity::Success => theme.green,
        Severity::Warning => theme.yellow,
    };
    let full = f.area();
    let width = full.width.min(60);
    let area = Rect {
        x: full.x + (full.width - width) / 2,
        y: full.y + 1,
        width,
        height: 3.min(full.height),
    };
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(toast.notification.message.as_str())
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.foreground))
            .block(
                Block::default()
                    .title(format!(" {} ", toast.notification.title))
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(color))
                    .style(Style::default().bg(theme.background)),
            ),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
