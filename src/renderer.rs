use crate::app::GameState;
use crate::entities::ActorKind;
use crate::game::{ActorView, Game};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph,
        canvas::{Canvas, Context, Line as Segment},
    },
};

/// Everything needed to draw one frame
pub struct RenderView<'a> {
    pub game_state: GameState,
    pub game: &'a Game,
    pub area: Rect,
    pub fps: u32,
}

/// Draws the playfield as outlines on a braille canvas, plus the HUD and overlays
pub struct GameRenderer {}

impl Default for GameRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRenderer {
    pub fn new() -> Self {
        Self {}
    }

    pub fn render(&self, frame: &mut Frame, view: &RenderView) {
        match view.game_state {
            GameState::Playing => self.render_game(frame, view),
            GameState::Paused => self.render_paused(frame, view),
            GameState::GameOver => self.render_game_over(frame, view),
        }
    }

    fn render_game(&self, frame: &mut Frame, view: &RenderView) {
        let area = view.area;
        let game = view.game;
        let config = game.config();

        // Leave a row for the HUD and one for the controls hint
        let body = Rect {
            x: area.x,
            y: area.y + 1,
            width: area.width,
            height: area.height.saturating_sub(2),
        };
        let field_area = fit_field(body, config.width, config.height);

        let width = f64::from(config.width);
        let height = f64::from(config.height);
        let canvas = Canvas::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .marker(Marker::Braille)
            .x_bounds([0.0, width])
            .y_bounds([0.0, height])
            .paint(|ctx| {
                for actor in game.actors() {
                    draw_outline(ctx, &actor, height);
                }
            });
        frame.render_widget(canvas, field_area);

        let mut stats = vec![
            Span::styled("Score: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}", game.score()),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  Level: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}", game.level()),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  Lives: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}", game.lives()),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
        ];
        if game.death_timeout().is_some() {
            stats.push(Span::styled(
                "  SHOT DOWN",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
        }
        stats.push(Span::styled("  FPS: ", Style::default().fg(Color::DarkGray)));
        stats.push(Span::styled(
            format!("{}", view.fps),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));

        let stats_area = Rect {
            x: area.x + 1,
            y: area.y,
            width: area.width.saturating_sub(2),
            height: area.height.min(1),
        };
        frame.render_widget(Paragraph::new(Line::from(stats)), stats_area);

        let controls = Line::from(vec![Span::styled(
            "[A/D/Arrows: Move] [Space: Fire] [P: Pause] [Q: Quit]",
            Style::default().fg(Color::DarkGray),
        )]);
        if area.height > 1 {
            let controls_area = Rect {
                x: area.x + 1,
                y: area.y + area.height - 1,
                width: area.width.saturating_sub(2),
                height: 1,
            };
            frame.render_widget(Paragraph::new(controls).centered(), controls_area);
        }
    }

    fn render_paused(&self, frame: &mut Frame, view: &RenderView) {
        self.render_game(frame, view);

        let area = view.area;
        let pause_text = vec![
            Line::from(""),
            Line::from("PAUSED").centered().bold().yellow(),
            Line::from(""),
            Line::from("Press P to resume").centered().white(),
        ];

        let pause_area = centred(area, 30, 6);
        frame.render_widget(
            Paragraph::new(pause_text)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Yellow)),
                )
                .alignment(Alignment::Center),
            pause_area,
        );
    }

    fn render_game_over(&self, frame: &mut Frame, view: &RenderView) {
        let game_over_text = vec![
            Line::from(""),
            Line::from("╔═══════════════════════════╗").centered().red(),
            Line::from("║        GAME OVER!         ║")
                .centered()
                .red()
                .bold(),
            Line::from("╚═══════════════════════════╝").centered().red(),
            Line::from(""),
            Line::from(format!("Final Score: {}", view.game.score()))
                .centered()
                .yellow()
                .bold(),
            Line::from(format!("Level Reached: {}", view.game.level()))
                .centered()
                .cyan()
                .bold(),
            Line::from(""),
            Line::from("Press R to restart").centered().white(),
            Line::from("Press Q to quit").centered().white(),
        ];

        frame.render_widget(
            Paragraph::new(game_over_text)
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Center),
            view.area,
        );
    }
}

pub fn actor_color(kind: ActorKind) -> Color {
    match kind {
        ActorKind::Fighter => Color::Green,
        ActorKind::ReserveFighter => Color::DarkGray,
        ActorKind::CapturedFighter => Color::Red,
        ActorKind::Enemy => Color::Magenta,
        ActorKind::FighterShot => Color::Yellow,
        ActorKind::EnemyShot => Color::LightRed,
        ActorKind::CaptureBeam => Color::Cyan,
    }
}

/// Closed outline, world y flipped so the fighter sits at the bottom.
fn draw_outline(ctx: &mut Context, actor: &ActorView, height: f64) {
    let polygon = actor.polygon;
    let color = actor_color(actor.kind);
    for (i, from) in polygon.iter().enumerate() {
        let to = polygon[(i + 1) % polygon.len()];
        ctx.draw(&Segment::new(
            f64::from(from.x),
            height - f64::from(from.y),
            f64::from(to.x),
            height - f64::from(to.y),
            color,
        ));
    }
}

/// Largest area inside `area` that keeps the playfield's proportions.
///
/// A braille cell holds 2x4 dots and a terminal cell is about twice as tall
/// as it is wide, so one dot is close to square.
pub fn fit_field(area: Rect, width: i32, height: i32) -> Rect {
    // one cell of border on each side
    let inner_cols = f64::from(area.width.saturating_sub(2));
    let inner_rows = f64::from(area.height.saturating_sub(2));
    let scale = (inner_cols * 2.0 / f64::from(width.max(1)))
        .min(inner_rows * 4.0 / f64::from(height.max(1)));

    // the epsilon keeps an exact fit from flooring one cell short
    let cols = ((f64::from(width) * scale / 2.0 + 1e-9).floor() as u16 + 2).min(area.width);
    let rows = ((f64::from(height) * scale / 4.0 + 1e-9).floor() as u16 + 2).min(area.height);
    Rect {
        x: area.x + (area.width - cols) / 2,
        y: area.y + (area.height - rows) / 2,
        width: cols,
        height: rows,
    }
}

fn centred(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
