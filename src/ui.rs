use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::keys::{degree_numeral, Key, DEGREES};
use crate::metronome::BEATS_PER_BAR;

/// Key buttons: natural row and the five black-key buttons, with the
/// keyboard shortcut shown on each.
pub const NATURAL_KEYS: [(char, Key); 7] = [
    ('c', Key::C), ('d', Key::D), ('e', Key::E), ('f', Key::F),
    ('g', Key::G), ('a', Key::A), ('b', Key::B),
];

pub const ACCIDENTAL_KEYS: [(char, Key, &str); 5] = [
    ('C', Key::DFlat,  "C#/Db"),
    ('D', Key::EFlat,  "D#/Eb"),
    ('F', Key::FSharp, "F#/Gb"),
    ('G', Key::AFlat,  "G#/Ab"),
    ('A', Key::BFlat,  "A#/Bb"),
];

// ── Top-level layout ──────────────────────────────────────────────────────────

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // title bar   rows[0]
            Constraint::Min(11),    // main panels rows[1]
            Constraint::Length(3),  // beats       rows[2]
            Constraint::Length(3),  // status      rows[3]
            Constraint::Length(4),  // help        rows[4]
        ])
        .split(area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(22), // keys
            Constraint::Min(20),    // chord
            Constraint::Length(26), // degrees
        ])
        .split(rows[1]);

    draw_title(f, rows[0], app);
    draw_keys(f, cols[0], app);
    draw_chord(f, cols[1], app);
    draw_degrees(f, cols[2], app);
    draw_beats(f, rows[2], app);
    draw_status(f, rows[3], app);
    draw_help(f, rows[4]);
}

// ── Title bar ─────────────────────────────────────────────────────────────────

fn draw_title(f: &mut Frame, area: Rect, app: &App) {
    let play = if app.metronome.running() { "  ▶METRO" } else { "" };
    let text = format!(
        "  Chord Trainer  ─  Key: {}  ─  {} BPM{}  ─  Space: next chord  P: metronome",
        app.key, app.metronome.tempo(), play
    );
    f.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(app.accent.color()).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
        area,
    );
}

// ── Key buttons ───────────────────────────────────────────────────────────────

fn key_style(app: &App, key: Key) -> Style {
    let shown = app.key == key || key.enharmonic() == Some(app.key);
    if shown {
        Style::default().fg(app.accent.contrast()).bg(app.accent.color()).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

fn draw_keys(f: &mut Frame, area: Rect, app: &App) {
    let d = Style::default().fg(Color::DarkGray);
    let mut lines: Vec<Line> = Vec::new();

    for ((nc, nk), acc) in NATURAL_KEYS.iter().zip(ACCIDENTAL_KEYS.iter().map(Some).chain(std::iter::repeat(None))) {
        let mut spans = vec![
            Span::styled(format!("[{}] ", nc), d),
            Span::styled(format!("{:^3}", nk.name()), key_style(app, *nk)),
        ];
        if let Some((ac, ak, label)) = acc {
            // Show the spelling actually selected when this button is lit.
            let label = if app.key == *ak || ak.enharmonic() == Some(app.key) { app.key.name() } else { *label };
            spans.push(Span::raw("  "));
            spans.push(Span::styled(format!("[{}] ", ac), d));
            spans.push(Span::styled(format!("{:^5}", label), key_style(app, *ak)));
        }
        lines.push(Line::from(spans));
    }

    if app.key == Key::CFlat {
        lines.push(Line::from(vec![
            Span::styled("[k] ", d),
            Span::styled(" Cb ", key_style(app, Key::CFlat)),
        ]));
    }

    f.render_widget(
        Paragraph::new(lines).block(
            Block::default().title(" Key ").borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        ),
        area,
    );
}

// ── Chord display ─────────────────────────────────────────────────────────────

fn spaced(s: &str) -> String {
    s.chars().map(|c| c.to_string()).collect::<Vec<_>>().join(" ")
}

fn draw_chord(f: &mut Frame, area: Rect, app: &App) {
    let accent = app.accent.color();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chord_style = Style::default()
        .fg(app.accent.contrast())
        .bg(accent)
        .add_modifier(Modifier::BOLD);
    let chord = format!("   {}   ", spaced(app.current_chord()));
    let pad = " ".repeat(chord.chars().count());

    let mut lines: Vec<Line> = Vec::new();
    let top = inner.height.saturating_sub(6) / 2;
    for _ in 0..top { lines.push(Line::raw("")); }
    lines.push(Line::from(Span::styled(pad.clone(), chord_style)));
    lines.push(Line::from(Span::styled(chord, chord_style)));
    lines.push(Line::from(Span::styled(pad, chord_style)));
    lines.push(Line::raw(""));
    let prev = app.previous_chord().map(|c| format!("prev: {}", c)).unwrap_or_default();
    lines.push(Line::from(Span::styled(prev, Style::default().fg(Color::DarkGray))));

    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

// ── Degree list ───────────────────────────────────────────────────────────────

fn draw_degrees(f: &mut Frame, area: Rect, app: &App) {
    let accent = app.accent.color();
    let mut lines: Vec<Line> = Vec::new();

    for i in 0..DEGREES {
        let disabled = app.selector.is_disabled(i);
        let visited  = app.selector.is_visited(i);
        let current  = app.selector.pending() == i;

        let sty = if disabled {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
        } else if current {
            Style::default().fg(app.accent.contrast()).bg(accent).add_modifier(Modifier::BOLD)
        } else if visited {
            Style::default().fg(accent).add_modifier(Modifier::DIM)
        } else {
            Style::default().fg(accent).add_modifier(Modifier::BOLD)
        };
        let mark = if disabled { "✕" } else if visited { "·" } else { " " };

        lines.push(Line::from(vec![
            Span::styled(format!("[{}] ", i + 1), Style::default().fg(Color::DarkGray)),
            Span::styled(format!("{:<4}", degree_numeral(i)), Style::default().fg(Color::DarkGray)),
            Span::styled(format!("{:<10}", app.table[i]), sty),
            Span::styled(format!(" {}", mark), Style::default().fg(Color::DarkGray)),
        ]));
    }

    let left = app.selector.selectable_count();
    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        Span::styled("Enabled: ", Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{}/{}", left, DEGREES),
                     if left < 2 { Style::default().fg(Color::Red) } else { Style::default().fg(Color::White) }),
    ]));

    f.render_widget(
        Paragraph::new(lines).block(
            Block::default().title(" Chords: [1-7] on/off ").borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        ),
        area,
    );
}

// ── Beat indicator ────────────────────────────────────────────────────────────

fn draw_beats(f: &mut Frame, area: Rect, app: &App) {
    let running = app.metronome.running();
    let mut spans = Vec::new();
    for b in 1..=BEATS_PER_BAR {
        let lit = running && app.metronome.beat() == b;
        let sty = if lit && b == 1 { Style::default().fg(Color::Black).bg(app.accent.color()).add_modifier(Modifier::BOLD) }
                  else if lit      { Style::default().fg(Color::Black).bg(Color::White).add_modifier(Modifier::BOLD) }
                  else             { Style::default().fg(Color::DarkGray) };
        spans.push(Span::styled(format!("  {}  ", b), sty));
        spans.push(Span::raw("  "));
    }
    let (state, color) = if running { ("▶ PLAYING", Color::Green) } else { ("■ STOPPED", Color::DarkGray) };
    spans.push(Span::styled(state, Style::default().fg(color).add_modifier(Modifier::BOLD)));

    f.render_widget(
        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .block(Block::default().title(" Beat ").borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))),
        area,
    );
}

// ── Status bar ────────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let extra = if app.status_msg.is_empty() { String::new() } else { format!("  │  {}", app.status_msg) };
    let line = Line::from(vec![
        Span::styled("BPM: ",    Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{}", app.metronome.tempo()),
                     Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::raw("  │  "),
        Span::styled("Vol: ",    Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{:.0}%", app.volume() * 100.0),
                     Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)),
        Span::raw("  │  "),
        Span::styled("Colour: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.accent.name(), Style::default().fg(app.accent.color())),
        Span::styled(extra,      Style::default().fg(Color::Yellow)),
    ]);

    f.render_widget(
        Paragraph::new(line)
            .block(Block::default().title(" Status ").borders(Borders::ALL))
            .wrap(Wrap { trim: false }),
        area,
    );
}

// ── Help ──────────────────────────────────────────────────────────────────────

fn draw_help(f: &mut Frame, area: Rect) {
    let w = Style::default().fg(Color::White);

    let practice = Line::from(vec![
        Span::styled("[Space/Enter] ", w), Span::raw("Next chord  │  "),
        Span::styled("[P] ",           w), Span::raw("Metronome  │  "),
        Span::styled("[↑↓ / +-] ",     w), Span::raw("BPM  │  "),
        Span::styled("[R] ",           w), Span::raw("Reset  │  "),
        Span::styled("[1-7] ",         w), Span::raw("Chord on/off"),
    ]);
    let global = Line::from(vec![
        Span::styled("[c-b / C D F G A] ", w), Span::raw("Key (again: flip spelling)  │  "),
        Span::styled("[K] ",   w), Span::raw("Cycle keys  │  "),
        Span::styled("[[ ]] ", w), Span::raw("Volume  │  "),
        Span::styled("[O] ",   w), Span::raw("Colour  │  "),
        Span::styled("[Esc/Q] ", w), Span::raw("Quit"),
    ]);

    f.render_widget(
        Paragraph::new(vec![practice, global])
            .block(Block::default().title(" Help ").borders(Borders::ALL))
            .style(Style::default().fg(Color::DarkGray)),
        area,
    );
}
