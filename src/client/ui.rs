use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, CurrentScreen, MenuOption};
use roguegate::common::complex::Floor;
use roguegate::common::constants::GameConstants;
use roguegate::common::entity::EntityKind;
use roguegate::common::game_logic::Game;
use roguegate::common::grid::Cell;

// Brightness for remembered cells outside the current field of view
const REMEMBERED_BRIGHTNESS: f32 = 0.3;

pub fn ui(frame: &mut Frame, app: &App) {
    match (app.current_screen, app.game.as_ref()) {
        (CurrentScreen::MainMenu, _) | (_, None) => render_main_menu(frame, app),
        (CurrentScreen::Options, _) => render_options(frame, app),
        (_, Some(game)) => render_game_ui(frame, app, game),
    }
}

fn render_main_menu(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Title
            Constraint::Min(8),    // Menu
            Constraint::Length(3), // Status/Error
        ])
        .split(frame.area());

    let title = Paragraph::new(Text::from(vec![
        Line::from(Span::styled("RogueGate Complex", Style::default().fg(Color::Yellow))),
        Line::from(Span::styled("\"A City within a City!\"", Style::default().fg(Color::Gray))),
    ]))
    .block(Block::default().borders(Borders::ALL))
    .wrap(Wrap { trim: false });
    frame.render_widget(title, chunks[0]);

    let menu_list_items: Vec<ListItem> = MenuOption::ALL
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let selected = i == app.main_menu_state.selected_option;
            let style = if selected {
                Style::default().fg(Color::Yellow).bg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };
            let prefix = if selected { "▶ " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::styled(prefix, style),
                Span::styled(format!("{} ", option.hotkey().to_ascii_uppercase()), Style::default().fg(Color::Cyan)),
                Span::styled(option.label(), style),
            ]))
        })
        .collect();
    let menu_list = List::new(menu_list_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Main Menu (↑/↓ to select, Enter to confirm)"),
    );
    frame.render_widget(menu_list, chunks[1]);

    let (status_text, status_color) = match &app.main_menu_state.error {
        Some(error) => (format!("Error: {}", error), Color::Red),
        None => (format!("Security System online | Seed: {}", app.seed), Color::Cyan),
    };
    let status = Paragraph::new(Text::styled(status_text, Style::default().fg(status_color)))
        .block(Block::default().borders(Borders::ALL).title("Status"));
    frame.render_widget(status, chunks[2]);
}

fn render_options(frame: &mut Frame, app: &App) {
    let config = &app.config;
    let lines = vec![
        Line::from(format!("Seed: {}", app.seed)),
        Line::from(format!("Save file: {}", app.save_path.display())),
        Line::from(format!("Config file: ${}", GameConstants::CONFIG_ENV)),
        Line::from(""),
        Line::from(format!("Built blocks: {}-{}", config.min_blocks, config.max_blocks)),
        Line::from(format!("Outdoor edge blocks: at least {}", config.min_outdoor_edge)),
        Line::from(format!("Placement attempts: {}", config.max_attempts)),
        Line::from(format!("Static light radius: {}", config.static_light_radius)),
        Line::from(format!("Flashlight radius: {}", config.flashlight_radius)),
        Line::from(""),
        Line::from(Span::styled("Esc to return", Style::default().fg(Color::DarkGray))),
    ];
    let options = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title("Options"))
        .wrap(Wrap { trim: false });
    frame.render_widget(options, centered_rect(60, 60, frame.area()));
}

fn render_game_ui(frame: &mut Frame, app: &App, game: &Game) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Status bar
            Constraint::Min(20),   // Map and sidebar
            Constraint::Length(7), // Message log
        ])
        .split(frame.area());

    render_status(frame, app, game, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(30)])
        .split(rows[1]);
    render_map(frame, app, game, columns[0]);
    render_sidebar(frame, game, columns[1]);
    render_messages(frame, app, rows[2]);

    if app.current_screen == CurrentScreen::Exiting {
        render_exit_screen(frame, frame.area());
    }
}

fn render_status(frame: &mut Frame, app: &App, game: &Game, area: Rect) {
    let status_text = format!(
        "{} | Position: ({}, {}) | Turn: {} | Seed: {}",
        app.location(),
        game.player.x,
        game.player.y,
        game.turn,
        app.seed
    );
    let status = Paragraph::new(Text::styled(status_text, Style::default().fg(Color::White)))
        .block(Block::default().borders(Borders::ALL).title("RogueGate"));
    frame.render_widget(status, area);
}

fn render_map(frame: &mut Frame, app: &App, game: &Game, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(app.location());
    let Some(floor) = game.active_floor() else {
        frame.render_widget(block, area);
        return;
    };

    let viewport_width = area.width.saturating_sub(2) as i32;
    let viewport_height = area.height.saturating_sub(2) as i32;
    let player = &game.player;

    // Center on the player unless the whole floor fits
    let camera_x = if floor.width() <= viewport_width { 0 } else { player.x - viewport_width / 2 };
    let camera_y = if floor.height() <= viewport_height { 0 } else { player.y - viewport_height / 2 };

    let mut lines = Vec::<Line>::new();
    for viewport_y in 0..viewport_height {
        let mut spans = Vec::<Span>::new();
        for viewport_x in 0..viewport_width {
            let (x, y) = (camera_x + viewport_x, camera_y + viewport_y);
            if (x, y) == (player.x, player.y) {
                spans.push(Span::styled(
                    player.symbol.to_string(),
                    Style::default().fg(Color::Yellow).bg(Color::DarkGray),
                ));
                continue;
            }

            let brightness = if floor.is_visible(x, y) {
                f32::from(floor.light_at(x, y)) / f32::from(GameConstants::MAX_LIGHT)
            } else if floor.is_explored(x, y) {
                REMEMBERED_BRIGHTNESS
            } else {
                spans.push(Span::raw(" "));
                continue;
            };

            let (color, character) = glyph_at(floor, x, y);
            spans.push(Span::styled(character.to_string(), Style::default().fg(dim(color, brightness))));
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

/// Entity glyph if one sits on the cell, else the cell glyph
fn glyph_at(floor: &Floor, x: i32, y: i32) -> (Color, char) {
    if let Some(entity) = floor.entities.iter().find(|e| e.x == x && e.y == y) {
        return match &entity.kind {
            EntityKind::Door { open: true, .. } => (Color::Rgb(160, 110, 60), '\''),
            EntityKind::Door { open: false, .. } => (Color::Rgb(160, 110, 60), '+'),
            EntityKind::Light { .. } => (Color::Rgb(255, 240, 150), '*'),
            EntityKind::Prop { name } => (Color::Rgb(110, 180, 110), prop_char(name)),
        };
    }
    match floor.cell(x, y) {
        Cell::Tile if floor.outdoor => (Color::Rgb(90, 140, 90), ','),
        Cell::Tile => (Color::Rgb(170, 170, 170), '.'),
        Cell::Wall => (Color::Rgb(220, 220, 220), '#'),
        Cell::Stairs => (Color::Rgb(120, 200, 255), '>'),
        Cell::Link => (Color::Rgb(80, 220, 220), ':'),
        Cell::Null => (Color::Black, ' '),
    }
}

fn prop_char(name: &str) -> char {
    match name {
        "shrub" => '"',
        "terminal" => '$',
        "desk" => '=',
        "filing cabinet" => '[',
        "server rack" => '|',
        "water cooler" => '0',
        _ => '&',
    }
}

fn dim(color: Color, brightness: f32) -> Color {
    let brightness = brightness.clamp(0.0, 1.0);
    match color {
        Color::Rgb(r, g, b) => Color::Rgb(
            (r as f32 * brightness) as u8,
            (g as f32 * brightness) as u8,
            (b as f32 * brightness) as u8,
        ),
        other => other,
    }
}

fn render_sidebar(frame: &mut Frame, game: &Game, area: Rect) {
    let player = &game.player;
    let mut lines = vec![
        Line::from(format!("Facing: {:?}", player.facing)),
        Line::from(format!("Flashlight: {}", player.flashlight_radius)),
    ];
    if let Some(floor) = game.active_floor() {
        lines.push(Line::from(format!("Light here: {}", floor.light_at(player.x, player.y))));
        lines.push(Line::from(format!("Rooms: {}", floor.rooms.len())));
        let above = if floor.link_above.is_some() { "up" } else { "" };
        let below = if floor.link_below.is_some() { "down" } else { "" };
        lines.push(Line::from(format!("Stairs: {} {}", above, below)));
    }
    lines.push(Line::from(""));
    for help in [
        "hjkl/yubn/arrows  move",
        "shift + move      sprint",
        "o                 open door",
        "< >               stairs",
        "r                 regenerate",
        "F5 / F9           save / load",
        "q                 quit to menu",
    ] {
        lines.push(Line::from(Span::styled(help, Style::default().fg(Color::DarkGray))));
    }

    let sidebar = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title("Player"))
        .wrap(Wrap { trim: false });
    frame.render_widget(sidebar, area);
}

fn render_messages(frame: &mut Frame, app: &App, area: Rect) {
    let visible = area.height.saturating_sub(2) as usize;
    let items: Vec<ListItem> = app
        .messages
        .iter()
        .rev()
        .take(visible)
        .rev()
        .map(|m| ListItem::new(Line::from(Span::styled(m.as_str(), Style::default().fg(Color::Gray)))))
        .collect();
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Messages"));
    frame.render_widget(list, area);
}

fn render_exit_screen(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(50, 20, area);
    frame.render_widget(Clear, popup_area);

    let popup_block = Block::default()
        .title("Leave Session")
        .borders(Borders::ALL)
        .style(Style::default().bg(Color::DarkGray));
    let exit_paragraph = Paragraph::new(Text::styled(
        "Return to the main menu? (y/n)",
        Style::default().fg(Color::Red),
    ))
    .block(popup_block)
    .wrap(Wrap { trim: false });
    frame.render_widget(exit_paragraph, popup_area);
}

/// Helper function to create a centered rect using up certain percentage of the available rect `r`
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
