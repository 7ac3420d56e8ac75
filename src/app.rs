use color_eyre::Result;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::time::{Duration, Instant};

use crate::config::GameConfig;
use crate::game::Game;
use crate::input::{InputAction, InputManager, tick_input};
use crate::renderer::{GameRenderer, RenderView};

/// Which screen the front end is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Playing,
    Paused,
    GameOver,
}

/// Terminal front end: one [`Game::tick`] per frame while playing.
pub struct App {
    running: bool,
    game_state: GameState,
    config: GameConfig,
    game: Game,
    tick: u64,
    last_frame_time: Instant,
    fps: u32,
    input_manager: InputManager,
    renderer: GameRenderer,
}

impl App {
    pub fn new(config: GameConfig) -> Result<Self> {
        let game = Game::new(config.clone())?;
        Ok(Self {
            running: true,
            game_state: GameState::Playing,
            config,
            game,
            tick: 0,
            last_frame_time: Instant::now(),
            fps: 0,
            input_manager: InputManager::new(),
            renderer: GameRenderer::new(),
        })
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn game_state(&self) -> GameState {
        self.game_state
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run(mut self, terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
        let frame_budget = Duration::from_millis(self.config.tick_millis);

        while self.running {
            let now = Instant::now();
            let frame_time = now.duration_since(self.last_frame_time);
            self.last_frame_time = now;
            if frame_time.as_micros() > 0 {
                self.fps = (1_000_000 / frame_time.as_micros()) as u32;
            }

            terminal.draw(|frame| {
                let view = RenderView {
                    game_state: self.game_state,
                    game: &self.game,
                    area: frame.area(),
                    fps: self.fps,
                };
                self.renderer.render(frame, &view);
            })?;

            self.input_manager.poll_events(&self.game_state)?;
            let actions = self.input_manager.get_actions(&self.game_state);
            self.process_actions(&actions)?;

            if let Some(rest) = frame_budget.checked_sub(now.elapsed()) {
                std::thread::sleep(rest);
            }
        }
        Ok(())
    }

    /// Applies one frame of input and advances the simulation if playing.
    pub fn process_actions(&mut self, actions: &[InputAction]) -> Result<()> {
        for action in actions {
            match action {
                InputAction::Quit => {
                    log::info!("quit at tick {} with score {}", self.tick, self.game.score());
                    self.running = false;
                    return Ok(());
                }
                InputAction::Pause => {
                    self.game_state = GameState::Paused;
                }
                InputAction::Resume => {
                    self.game_state = GameState::Playing;
                }
                InputAction::Restart => {
                    self.restart()?;
                    return Ok(());
                }
                InputAction::MoveLeft | InputAction::MoveRight | InputAction::Fire => {}
            }
        }

        if self.game_state == GameState::Playing {
            self.game.tick(self.tick, tick_input(actions));
            self.tick += 1;
            if !self.game.is_running() {
                log::info!(
                    "game over at level {} with score {}",
                    self.game.level(),
                    self.game.score()
                );
                self.game_state = GameState::GameOver;
            }
        }
        Ok(())
    }

    /// Fresh session with the same settings and the next seed.
    fn restart(&mut self) -> Result<()> {
        self.config.seed = self.config.seed.wrapping_add(1);
        self.game = Game::new(self.config.clone())?;
        self.tick = 0;
        self.game_state = GameState::Playing;
        log::info!("restarted with seed {}", self.config.seed);
        Ok(())
    }
}
