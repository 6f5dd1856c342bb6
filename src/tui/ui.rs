//! Drawing the panel.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, List, ListItem},
    style::{Color, Style, Modifier},
};
use crate::config::Rgb;
use crate::host::Mode;
use crate::io::DISPLAYED_REGISTERS;
use crate::machine::{BusId, Signal};
use super::app::{key_for, PanelApp};

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &PanelApp) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(60),
            Constraint::Percentage(40),
        ])
        .split(frame.area());

    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9),
            Constraint::Length(4),
            Constraint::Min(6),
            Constraint::Length(3),
        ])
        .split(chunks[0]);

    draw_registers(frame, left_chunks[0], app);
    draw_buses(frame, left_chunks[1], app);
    draw_signals(frame, left_chunks[2], app);
    draw_status(frame, left_chunks[3], app);

    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),
            Constraint::Length(7),
        ])
        .split(chunks[1]);

    draw_memory(frame, right_chunks[0], app);
    draw_help(frame, right_chunks[1]);
}

fn rgb(c: Rgb) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

/// Register displays, binary and decimal. The insert-mode cursor blinks.
fn draw_registers(frame: &mut Frame, area: Rect, app: &PanelApp) {
    let panel = app.frame.frame();
    let lit = Style::default().fg(rgb(app.palette.display)).add_modifier(Modifier::BOLD);
    let dark = Style::default().fg(Color::DarkGray);

    let content: Vec<Line> = DISPLAYED_REGISTERS
        .iter()
        .map(|&id| {
            let value = panel.display(id).unwrap_or(0);
            let selected = panel.blinking == Some(id);
            let style = if selected && !app.blink_on() { dark } else { lit };
            let marker = if selected { "▶" } else { " " };

            Line::from(vec![
                Span::raw(format!("{} {:>2}: ", marker, id.name())),
                Span::styled(
                    format!("{:0width$b}", value, width = id.width() as usize),
                    style,
                ),
                Span::raw(format!("  = {:>3}", value)),
            ])
        })
        .collect();

    let title = match (panel.blinking, app.host.mode()) {
        (_, Mode::Remote) => " Registers (remote) ",
        (Some(_), Mode::Local) => " Registers (insert) ",
        (None, Mode::Local) => " Registers ",
    };

    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)));

    frame.render_widget(paragraph, area);
}

/// Bus lamps and the values currently on the buses.
fn draw_buses(frame: &mut Frame, area: Rect, app: &PanelApp) {
    let panel = app.frame.frame();
    let regs = app.host.unit().registers();
    let lamp = |bus: BusId| {
        if panel.bus(bus) {
            Span::styled("●", Style::default().fg(rgb(app.palette.bus)))
        } else {
            Span::styled("○", Style::default().fg(Color::DarkGray))
        }
    };

    let content = vec![
        Line::from(vec![
            lamp(BusId::A),
            Span::raw(format!(" busA: {}", regs.bus_a)),
            Span::raw("    "),
            lamp(BusId::S),
            Span::raw(format!(" busS: {}", regs.bus_s)),
        ]),
        Line::from(vec![
            Span::raw(format!("JAML: {}", regs.jaml)),
            Span::raw("   Pulses: "),
            Span::styled(format!("{}", app.host.unit().pulses()), Style::default().fg(Color::Cyan)),
        ]),
    ];

    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(" Buses ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue)));

    frame.render_widget(paragraph, area);
}

/// The 16 signal indicators with their keys.
fn draw_signals(frame: &mut Frame, area: Rect, app: &PanelApp) {
    let panel = app.frame.frame();
    let on = Style::default().fg(rgb(app.palette.signal_line)).add_modifier(Modifier::BOLD);
    let off = Style::default().fg(Color::DarkGray);
    let refused = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);

    let lines: Vec<Line> = Signal::ALL
        .chunks(4)
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|&signal| {
                    let style = if panel.signals.contains(&signal) {
                        on
                    } else if panel.rejected == Some(signal) {
                        refused
                    } else {
                        off
                    };
                    Span::styled(format!("[{}] {:<6}", key_for(signal), signal.name()), style)
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(lines)
        .block(Block::default()
            .title(" Signals ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)));

    frame.render_widget(paragraph, area);
}

/// The four-cell PaO window, then the rest of memory dimmed.
fn draw_memory(frame: &mut Frame, area: Rect, app: &PanelApp) {
    let panel = app.frame.frame();
    let unit = app.host.unit();
    let addr = unit.registers().a.index();
    let base = panel.window_base;
    let visible_rows = (area.height as usize).saturating_sub(2);

    let items: Vec<ListItem> = unit
        .memory()
        .cells()
        .iter()
        .enumerate()
        .skip(base)
        .take(visible_rows)
        .map(|(idx, value)| {
            let in_window = idx < base + panel.window.len();
            let marker = if idx == addr { "▶" } else { " " };
            let text = format!("{} {:02}: {} = {:>3}", marker, idx, value, value.value());

            let style = if idx == addr {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if in_window {
                Style::default().fg(rgb(app.palette.display))
            } else {
                Style::default().fg(Color::DarkGray)
            };

            ListItem::new(text).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(format!(" PaO {:02}-{:02} ", base, base + panel.window.len() - 1))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)));

    frame.render_widget(list, area);
}

fn draw_status(frame: &mut Frame, area: Rect, app: &PanelApp) {
    let status = Paragraph::new(app.status.clone())
        .style(Style::default().fg(Color::White))
        .block(Block::default()
            .title(" Status ")
            .borders(Borders::ALL));

    frame.render_widget(status, area);
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(vec![
        Line::from("Signal keys: see [k] in Signals"),
        Line::from("Space: TAKT  x: Reset  F2: Local/Remote"),
        Line::from("Tab: insert mode  Enter: next register"),
        Line::from("↑↓: adjust / scroll PaO  Esc: Quit"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default()
        .title(" Help ")
        .borders(Borders::ALL));

    frame.render_widget(help, area);
}
