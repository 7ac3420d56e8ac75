use color_eyre::Result;
use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::fs::{self, File};
use std::io::stdout;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use galaga_sim::{App, GameConfig};

const CONFIG_FILE: &str = "galaga.json";
const LOG_FILE: &str = "galaga.log";

fn main() -> Result<()> {
    color_eyre::install()?;

    // The terminal belongs to the game, so logs go to a file
    let log_file = File::create(LOG_FILE)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let config = load_config()?;

    let supports_keyboard_enhancement = matches!(
        crossterm::terminal::supports_keyboard_enhancement(),
        Ok(true)
    );
    log::info!("keyboard enhancement supported: {supports_keyboard_enhancement}");
    if !supports_keyboard_enhancement {
        log::warn!("no key release events, held keys may stick until pressed again");
    }

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Release events need the enhancement flags, pushed after the screen switch
    if supports_keyboard_enhancement {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = App::new(config).and_then(|app| app.run(&mut terminal));

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    if supports_keyboard_enhancement {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }

    terminal.show_cursor()?;

    result
}

/// Settings from `galaga.json` if it exists, defaults otherwise.
/// A zero seed is replaced with one taken from the clock.
fn load_config() -> Result<GameConfig> {
    let mut config = if Path::new(CONFIG_FILE).exists() {
        let text = fs::read_to_string(CONFIG_FILE)?;
        log::info!("loading settings from {CONFIG_FILE}");
        GameConfig::from_json(&text)?
    } else {
        GameConfig::default()
    };

    if config.seed == 0 {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
        config.seed = (nanos as u64) | 1;
    }
    Ok(config)
}
