use std::{error::Error, fs::File, io};

use ratatui::{
    backend::{Backend, CrosstermBackend},
    crossterm::{
        event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    },
    Terminal,
};

mod app;
mod ui;

use crate::{
    app::{App, CurrentScreen, MenuOption},
    ui::ui,
};
use roguegate::common::config::ComplexConfig;
use roguegate::common::constants::GameConstants;

fn main() -> Result<(), Box<dyn Error>> {
    // Log to a file; stderr belongs to the terminal UI
    let log_file = File::create(GameConstants::LOG_FILE)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let seed = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<u64>()?,
        None => rand::random(),
    };
    let config = match std::env::var(GameConstants::CONFIG_ENV) {
        Ok(path) => ComplexConfig::from_json_file(&path)?,
        Err(_) => ComplexConfig::default(),
    };

    // setup terminal
    enable_raw_mode()?;
    let mut stderr = io::stderr();
    execute!(stderr, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stderr);
    let mut terminal = Terminal::new(backend)?;

    let app = App::new(seed, config);
    let res = run_app(&mut terminal, app);

    // restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, &app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match app.current_screen {
                CurrentScreen::MainMenu => match key.code {
                    KeyCode::Up | KeyCode::Char('k') => app.main_menu_state.select_previous(),
                    KeyCode::Down | KeyCode::Char('j') => app.main_menu_state.select_next(),
                    KeyCode::Enter => app.choose(app.main_menu_state.selected()),
                    KeyCode::Esc => app.should_quit = true,
                    KeyCode::Char(c) => {
                        if let Some(option) = MenuOption::ALL.into_iter().find(|o| o.hotkey() == c.to_ascii_lowercase()) {
                            app.choose(option);
                        }
                    }
                    _ => {}
                },
                CurrentScreen::Options => {
                    if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                        app.return_to_menu();
                    }
                }
                CurrentScreen::Game => {
                    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
                    match key.code {
                        KeyCode::Char('q') => app.current_screen = CurrentScreen::Exiting,
                        KeyCode::Char('o') => app.open_door(),
                        KeyCode::Char('<') => app.take_stairs(true),
                        KeyCode::Char('>') => app.take_stairs(false),
                        KeyCode::Char('r') => app.regenerate(),
                        KeyCode::F(5) => app.save(),
                        KeyCode::F(9) => app.load(),
                        code => {
                            if let Some((dx, dy, sprint)) = movement(code, shift) {
                                if sprint {
                                    app.sprint(dx, dy);
                                } else {
                                    app.move_player(dx, dy);
                                }
                            }
                        }
                    }
                }
                CurrentScreen::Exiting => match key.code {
                    KeyCode::Char('y') => app.return_to_menu(),
                    KeyCode::Char('n') | KeyCode::Esc => app.current_screen = CurrentScreen::Game,
                    _ => {}
                },
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Vi-keys, arrows and their shifted sprint variants
fn movement(code: KeyCode, shift: bool) -> Option<(i32, i32, bool)> {
    let (dx, dy) = match code {
        KeyCode::Left => (-1, 0),
        KeyCode::Down => (0, 1),
        KeyCode::Up => (0, -1),
        KeyCode::Right => (1, 0),
        KeyCode::Char(c) => {
            let delta = match c.to_ascii_lowercase() {
                'h' => (-1, 0),
                'j' => (0, 1),
                'k' => (0, -1),
                'l' => (1, 0),
                'y' => (-1, -1),
                'u' => (1, -1),
                'b' => (-1, 1),
                'n' => (1, 1),
                _ => return None,
            };
            return Some((delta.0, delta.1, c.is_ascii_uppercase()));
        }
        _ => return None,
    };
    Some((dx, dy, shift))
}
