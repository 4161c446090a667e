use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::{
    io::{stdout, Stdout},
    time::{Duration, Instant},
};

use blockfall::game::{Game, GameConfig, DEFAULT_DROP_INTERVAL_MS};
use blockfall::grid::{GRID_HEIGHT, GRID_WIDTH};
use blockfall::piece::{CellState, PieceKind, Shape};

// ============================================================================
// Command Line
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "blockfall")]
#[command(about = "Falling-block puzzle game for the terminal")]
struct Cli {
    /// Milliseconds between gravity steps
    #[arg(long, default_value_t = DEFAULT_DROP_INTERVAL_MS, value_parser = clap::value_parser!(u64).range(1..))]
    drop_interval_ms: u64,
    /// Seed for a reproducible piece sequence
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    fn config(&self) -> GameConfig {
        GameConfig {
            drop_interval_ms: self.drop_interval_ms,
            seed: self.seed,
        }
    }
}

// ============================================================================
// Visual Constants
// ============================================================================

const FRAME_MS: u64 = 16;
const BLOCK_CHAR: &str = "██";
const GHOST_CHAR: &str = "░░";
const EMPTY_CHAR: &str = "  ";

fn piece_color(kind: PieceKind) -> Color {
    match kind {
        PieceKind::I => Color::Cyan,
        PieceKind::J => Color::Blue,
        PieceKind::L => Color::Rgb(240, 160, 0),
        PieceKind::O => Color::Yellow,
        PieceKind::S => Color::Green,
        PieceKind::T => Color::Magenta,
        PieceKind::Z => Color::Red,
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, game: &Game, paused: bool) {
    let area = frame.size();

    let grid_display_width = (GRID_WIDTH as u16 * 2) + 2;
    let grid_display_height = GRID_HEIGHT as u16 + 2;
    let side_width = 14;
    let total_width = grid_display_width + side_width * 2;
    let total_height = grid_display_height + 2;

    let main_area = centered_rect(total_width, total_height, area);
    let vertical =
        Layout::vertical([Constraint::Length(grid_display_height), Constraint::Fill(1)])
            .split(main_area);

    // Layout: [Hold][Grid][Next/Score]
    let horizontal = Layout::horizontal([
        Constraint::Length(side_width),
        Constraint::Length(grid_display_width),
        Constraint::Length(side_width),
    ])
    .split(vertical[0]);

    let right = Layout::vertical([Constraint::Length(12), Constraint::Fill(1)]).split(horizontal[2]);

    render_hold(frame, game, horizontal[0]);
    render_grid(frame, game, horizontal[1]);
    render_next(frame, game, right[0]);
    render_score(frame, game, right[1]);

    let controls = Paragraph::new(Line::from(
        "←→: Move | ↓: Drop | ↑: Rotate | Space: Hard drop | C: Hold | P: Pause | Q: Quit",
    ))
    .alignment(Alignment::Center)
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(controls, vertical[1]);

    if paused {
        render_paused(frame, area);
    }
}

fn render_grid(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Blockfall ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visual_grid = game.render_grid();
    let ghost = game.ghost_position();
    let ghost_cells: Vec<(i16, i16)> = game
        .current_piece
        .shape
        .filled_cells()
        .map(|(col, row)| (ghost.x + col as i16, ghost.y + row as i16))
        .collect();
    let ghost_color = piece_color(game.current_piece.kind());

    let lines: Vec<Line> = visual_grid
        .iter()
        .enumerate()
        .map(|(y, row)| {
            let spans: Vec<Span> = row
                .iter()
                .enumerate()
                .map(|(x, cell)| match cell {
                    CellState::Filled(kind) => {
                        Span::styled(BLOCK_CHAR, Style::default().fg(piece_color(*kind)))
                    }
                    CellState::Empty if ghost_cells.contains(&(x as i16, y as i16)) => {
                        Span::styled(GHOST_CHAR, Style::default().fg(ghost_color))
                    }
                    CellState::Empty => Span::raw(EMPTY_CHAR),
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn shape_lines(shape: &Shape) -> Vec<Line<'static>> {
    let color = piece_color(shape.kind());
    shape
        .rows()
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .map(|row| {
            let mut spans = vec![Span::raw(" ")];
            spans.extend(row.iter().map(|cell| {
                if cell.is_empty() {
                    Span::raw(EMPTY_CHAR)
                } else {
                    Span::styled(BLOCK_CHAR, Style::default().fg(color))
                }
            }));
            Line::from(spans)
        })
        .collect()
}

fn render_hold(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Hold ")
        .title_alignment(Alignment::Center);

    let mut lines = vec![Line::from("")];
    if let Some(shape) = game.held_piece() {
        lines.extend(shape_lines(shape));
    }

    let style = if game.hold_used() {
        Style::default().add_modifier(Modifier::DIM)
    } else {
        Style::default()
    };
    let paragraph = Paragraph::new(lines).style(style).block(block);
    frame.render_widget(paragraph, Rect { height: area.height.min(6), ..area });
}

fn render_next(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Next ")
        .title_alignment(Alignment::Center);

    let mut lines: Vec<Line> = Vec::new();
    for (i, kind) in game.preview().into_iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(""));
        }
        lines.extend(shape_lines(&kind.shape()));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_score(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Score ")
        .title_alignment(Alignment::Center);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("{}", game.score),
            Style::default().fg(Color::Yellow),
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(paragraph, Rect { height: area.height.min(4), ..area });
}

fn render_paused(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("PAUSED", Style::default().fg(Color::Yellow))),
        Line::from(""),
        Line::from(Span::styled(
            "Press P to continue",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Paused ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    frame.render_widget(paragraph, centered_rect(24, 6, area));
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Main Loop
// ============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse();

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run(&mut terminal, cli.config());

    // Always try to restore the terminal, even when the loop failed.
    let _ = disable_raw_mode();
    let _ = stdout().execute(LeaveAlternateScreen);
    result
}

fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, config: GameConfig) -> Result<()> {
    let mut game = Game::with_config(config);
    let mut paused = false;
    let mut last_frame = Instant::now();
    let frame_duration = Duration::from_millis(FRAME_MS);

    loop {
        terminal.draw(|frame| render(frame, &game, paused))?;

        let timeout = frame_duration
            .checked_sub(last_frame.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                        KeyCode::Char('p') | KeyCode::Char('P') => paused = !paused,
                        _ if paused => {}
                        KeyCode::Left => {
                            game.move_piece(-1);
                        }
                        KeyCode::Right => {
                            game.move_piece(1);
                        }
                        KeyCode::Down => game.soft_drop(),
                        KeyCode::Up => {
                            game.rotate();
                        }
                        KeyCode::Char(' ') => game.hard_drop(),
                        KeyCode::Char('c') | KeyCode::Char('C') => {
                            game.hold();
                        }
                        _ => {}
                    }
                }
            }
        }

        let elapsed = last_frame.elapsed();
        if elapsed >= frame_duration {
            if !paused {
                game.tick(elapsed.as_millis() as u64);
            }
            // Drain the journal so it does not grow unbounded.
            game.take_events();
            last_frame = Instant::now();
        }
    }
}
