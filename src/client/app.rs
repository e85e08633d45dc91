use std::path::PathBuf;

use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use roguegate::common::config::ComplexConfig;
use roguegate::common::constants::GameConstants;
use roguegate::common::game_logic::Game;
use roguegate::common::snapshot::GameSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentScreen {
    MainMenu,
    Options,
    Game,
    Exiting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    NewSession,
    ContinueSession,
    Options,
    Quit,
}

impl MenuOption {
    pub const ALL: [MenuOption; 4] = [
        MenuOption::NewSession,
        MenuOption::ContinueSession,
        MenuOption::Options,
        MenuOption::Quit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuOption::NewSession => "New Session",
            MenuOption::ContinueSession => "Continue Session",
            MenuOption::Options => "Options",
            MenuOption::Quit => "Quit",
        }
    }

    /// Single-letter shortcut shown next to the label
    pub fn hotkey(self) -> char {
        match self {
            MenuOption::NewSession => 'n',
            MenuOption::ContinueSession => 'c',
            MenuOption::Options => 'o',
            MenuOption::Quit => 'q',
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MainMenuState {
    pub selected_option: usize,
    pub error: Option<String>,
}

impl MainMenuState {
    pub fn selected(&self) -> MenuOption {
        MenuOption::ALL[self.selected_option.min(MenuOption::ALL.len() - 1)]
    }

    pub fn select_previous(&mut self) {
        self.selected_option = self.selected_option.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        if self.selected_option + 1 < MenuOption::ALL.len() {
            self.selected_option += 1;
        }
    }
}

pub struct App {
    pub current_screen: CurrentScreen,
    pub should_quit: bool,
    pub main_menu_state: MainMenuState,
    /// Present once a session has been started or continued
    pub game: Option<Game>,
    pub config: ComplexConfig,
    pub seed: u64,
    pub messages: Vec<String>,
    pub save_path: PathBuf,
    rng: StdRng,
}

impl App {
    pub fn new(seed: u64, config: ComplexConfig) -> App {
        App {
            current_screen: CurrentScreen::MainMenu,
            should_quit: false,
            main_menu_state: MainMenuState::default(),
            game: None,
            config,
            seed,
            messages: Vec::new(),
            save_path: PathBuf::from(GameConstants::SAVE_FILE),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn choose(&mut self, option: MenuOption) {
        self.main_menu_state.error = None;
        match option {
            MenuOption::NewSession => self.start_new_session(),
            MenuOption::ContinueSession => self.continue_session(),
            MenuOption::Options => self.current_screen = CurrentScreen::Options,
            MenuOption::Quit => self.should_quit = true,
        }
    }

    pub fn start_new_session(&mut self) {
        self.game = Some(Game::with_config(&mut self.rng, self.config.clone()));
        info!("new session with seed {}", self.seed);
        self.messages.clear();
        self.add_message(GameConstants::MSG_WELCOME.to_string());
        self.current_screen = CurrentScreen::Game;
    }

    /// Resume from the save file; a failure keeps the menu up with the error
    pub fn continue_session(&mut self) {
        match GameSnapshot::load(&self.save_path) {
            Ok(GameSnapshot { complex, player, .. }) => {
                self.game = Some(Game::from_parts(complex, player, self.config.clone()));
                self.messages.clear();
                self.add_message(GameConstants::MSG_LOADED.to_string());
                self.current_screen = CurrentScreen::Game;
            }
            Err(e) => {
                warn!("continue from {} failed: {}", self.save_path.display(), e);
                self.main_menu_state.error = Some(format!("No session to continue: {}", e));
            }
        }
    }

    pub fn return_to_menu(&mut self) {
        self.current_screen = CurrentScreen::MainMenu;
    }

    pub fn add_message(&mut self, message: String) {
        self.messages.push(message);
        if self.messages.len() > GameConstants::MAX_MESSAGES {
            self.messages.drain(0..self.messages.len() - GameConstants::MAX_MESSAGES);
        }
    }

    pub fn move_player(&mut self, dx: i32, dy: i32) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        let before = game.player.floor;
        if !game.move_player(dx, dy) {
            self.add_message(GameConstants::MSG_BLOCKED.to_string());
        } else if game.player.floor != before {
            self.announce_floor();
        }
    }

    pub fn sprint(&mut self, dx: i32, dy: i32) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        let before = game.player.floor;
        if game.sprint(dx, dy, GameConstants::SPRINT_STEPS) == 0 {
            self.add_message(GameConstants::MSG_BLOCKED.to_string());
        } else if game.player.floor != before {
            self.announce_floor();
        }
    }

    pub fn open_door(&mut self) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        let message = if game.open_door() { GameConstants::MSG_DOOR_OPENED } else { GameConstants::MSG_NO_DOOR };
        self.add_message(message.to_string());
    }

    pub fn take_stairs(&mut self, upward: bool) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        if game.take_stairs(upward) {
            self.announce_floor();
        } else {
            self.add_message(GameConstants::MSG_NO_STAIRS.to_string());
        }
    }

    pub fn regenerate(&mut self) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        game.regenerate(&mut self.rng);
        self.add_message(GameConstants::MSG_REGENERATED.to_string());
    }

    pub fn save(&mut self) {
        let Some(game) = self.game.as_ref() else {
            return;
        };
        match game.snapshot().save(&self.save_path) {
            Ok(()) => self.add_message(GameConstants::MSG_SAVED.to_string()),
            Err(e) => {
                warn!("save to {} failed: {}", self.save_path.display(), e);
                self.add_message(format!("Save failed: {}", e));
            }
        }
    }

    pub fn load(&mut self) {
        match GameSnapshot::load(&self.save_path) {
            Ok(snapshot) => {
                if let Some(game) = self.game.as_mut() {
                    game.restore(snapshot);
                    self.add_message(GameConstants::MSG_LOADED.to_string());
                }
            }
            Err(e) => {
                warn!("load from {} failed: {}", self.save_path.display(), e);
                self.add_message(format!("Load failed: {}", e));
            }
        }
    }

    /// Short name of the active floor, e.g. "Block C, floor 2" or "Outdoors (0, 1)"
    pub fn location(&self) -> String {
        match self.game.as_ref().and_then(|g| g.active_floor()) {
            Some(floor) => match floor.block_label {
                Some(label) => format!("Block {}, floor {}", label, floor.id.level + 1),
                None => format!("Outdoors ({}, {})", floor.id.bx, floor.id.by),
            },
            None => "Nowhere".to_string(),
        }
    }

    fn announce_floor(&mut self) {
        let message = format!("You arrive at {}.", self.location());
        self.add_message(message);
    }
}
