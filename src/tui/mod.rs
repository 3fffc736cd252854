//! Terminal user interface: state management, menu screens, and main loop.
//!
//! The screen tree mirrors the physical layout of the tool: a main menu
//! listing headers, a per-header menu, and function/addon sub-menus that
//! toggle the shared pin configuration. Every render derives the menu rows
//! from the current board state, so a toggle is reflected on the next frame.

pub mod menu;
pub mod pin_diagram;
pub mod theme;

pub use menu::{MenuEntry, MenuState};
pub use theme::Theme;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

use crate::board::Board;
use crate::config::Config;
use crate::constants::{APP_NAME, MIN_TERM_HEIGHT, MIN_TERM_WIDTH};
use crate::dt;

/// Actions bound to menu rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    /// Enter a header's menu
    OpenHeader(usize),
    /// Enter the manual pin-function menu of a header
    OpenFunctions(usize),
    /// Enter the hardware-addon menu of a header
    OpenAddons(usize),
    /// Return to the main menu
    BackToMain,
    /// Return to a header's menu
    BackToHeader(usize),
    /// Toggle a function group on a header
    ToggleFunction(usize, &'static str),
    /// Load a hardware addon onto a header
    LoadAddon(usize, String),
    /// Export a header's configuration as a device-tree overlay
    ExportOverlay(usize),
    /// Keep a header's pin changes for the final save
    SaveHeader(usize),
    /// Discard a header's pin changes
    DiscardHeader(usize),
    /// Build the merged DTB and exit
    SaveAndExit,
    /// Build the merged DTB and reboot
    SaveAndReboot,
    /// Discard every header's pin changes
    DiscardAll,
    /// Leave the application
    Quit,
}

/// What happens after a message screen is dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AfterMessage {
    /// Return to the main menu
    GoMain,
    /// Return to a header menu
    GoHeader(usize),
    /// Exit the application
    Quit,
    /// Exit the application with a failure code
    QuitError,
    /// Exit and reboot the system
    Reboot,
}

/// Active screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Top-level header list
    MainMenu,
    /// Per-header menu
    HeaderMenu(usize),
    /// Manual pin-function selection
    FunctionMenu(usize),
    /// Hardware-addon selection
    AddonMenu(usize),
    /// Lines of text dismissed by any key
    Message {
        /// Message lines
        lines: Vec<String>,
        /// Follow-up action
        then: AfterMessage,
    },
}

/// Application state for the interactive tool.
pub struct AppState {
    /// Board and per-header pin configuration
    pub board: Board,
    /// Application configuration
    pub config: Config,
    /// Active color theme
    pub theme: Theme,
    /// Active screen
    pub screen: Screen,
    /// Menu navigation state for the active screen
    pub menu: MenuState,
    /// Per-header "pin changes kept for the final save" flags
    pub saved: Vec<bool>,
    /// Set when the main loop should stop
    pub should_quit: bool,
    /// Set when the process should exit nonzero
    pub exit_error: bool,
    /// Set when the process should spawn a reboot after teardown
    pub reboot_requested: bool,
}

impl AppState {
    /// Creates the initial state on the main menu.
    #[must_use]
    pub fn new(board: Board, config: Config) -> Self {
        let theme = Theme::from_mode(config.ui.theme_mode);
        let saved = vec![false; board.headers().len()];
        Self {
            board,
            config,
            theme,
            screen: Screen::MainMenu,
            menu: MenuState::new(),
            saved,
            should_quit: false,
            exit_error: false,
            reboot_requested: false,
        }
    }

    /// Whether any header has saved pin changes.
    #[must_use]
    pub fn any_saved(&self) -> bool {
        self.saved.iter().any(|s| *s)
    }

    /// Title and rows of the active screen's menu.
    #[must_use]
    pub fn menu_entries(&self) -> (String, Vec<MenuEntry>) {
        match &self.screen {
            Screen::MainMenu => self.main_menu_entries(),
            Screen::HeaderMenu(index) => self.header_menu_entries(*index),
            Screen::FunctionMenu(index) => self.function_menu_entries(*index),
            Screen::AddonMenu(index) => self.addon_menu_entries(*index),
            Screen::Message { .. } => (String::new(), Vec::new()),
        }
    }

    fn main_menu_entries(&self) -> (String, Vec<MenuEntry>) {
        let mut items = Vec::new();

        for (index, header) in self.board.headers().iter().enumerate() {
            let caption = if self.saved[index] {
                format!("Re-configure {}", header.name())
            } else {
                format!("Configure {}", header.name())
            };
            items.push(MenuEntry::action(caption, MenuAction::OpenHeader(index)));
        }

        if self.any_saved() {
            items.push(MenuEntry::separator());
            items.push(MenuEntry::action(
                "Save and reboot to reconfigure pins",
                MenuAction::SaveAndReboot,
            ));
            items.push(MenuEntry::action(
                "Save and exit without rebooting",
                MenuAction::SaveAndExit,
            ));
            items.push(MenuEntry::action(
                "Discard all pin changes",
                MenuAction::DiscardAll,
            ));
        }

        items.push(MenuEntry::separator());
        items.push(MenuEntry::action("Exit", MenuAction::Quit));

        ("Select one of the following:".to_string(), items)
    }

    fn header_menu_entries(&self, index: usize) -> (String, Vec<MenuEntry>) {
        let Some(header) = self.board.header(index) else {
            return (String::new(), Vec::new());
        };
        let title = format!("{}:", header.name());
        let mut items = Vec::new();

        if header.addon().is_some() {
            items.push(MenuEntry::action(
                "Save pin changes",
                MenuAction::SaveHeader(index),
            ));
            items.push(MenuEntry::action(
                "Discard pin changes",
                MenuAction::DiscardHeader(index),
            ));
        } else if header.is_default() {
            if !self.board.addons_for(header.id()).is_empty() {
                items.push(MenuEntry::action(
                    "Configure for compatible hardware",
                    MenuAction::OpenAddons(index),
                ));
            }
            if !header.functions().is_empty() {
                items.push(MenuEntry::action(
                    "Configure header pins manually",
                    MenuAction::OpenFunctions(index),
                ));
            }
            items.push(MenuEntry::separator());
            items.push(MenuEntry::action("Back", MenuAction::BackToMain));
        } else {
            items.push(MenuEntry::action(
                "Export as Device-Tree Overlay",
                MenuAction::ExportOverlay(index),
            ));
            items.push(MenuEntry::action(
                "Save pin changes",
                MenuAction::SaveHeader(index),
            ));
            items.push(MenuEntry::action(
                "Discard pin changes",
                MenuAction::DiscardHeader(index),
            ));
        }

        (title, items)
    }

    fn function_menu_entries(&self, index: usize) -> (String, Vec<MenuEntry>) {
        let Some(header) = self.board.header(index) else {
            return (String::new(), Vec::new());
        };
        let mut items = Vec::new();

        for function in header.functions() {
            let pins: Vec<String> = function.pins.iter().map(|p| p.pin.to_string()).collect();
            let caption = format!("{} ({})", function.name, pins.join(","));
            items.push(MenuEntry::toggle(
                caption,
                header.is_enabled(function.name),
                MenuAction::ToggleFunction(index, function.name),
            ));
        }

        items.push(MenuEntry::separator());
        items.push(MenuEntry::action("Back", MenuAction::BackToHeader(index)));

        (
            "Select desired functions (for pins):".to_string(),
            items,
        )
    }

    fn addon_menu_entries(&self, index: usize) -> (String, Vec<MenuEntry>) {
        let Some(header) = self.board.header(index) else {
            return (String::new(), Vec::new());
        };
        let mut items = Vec::new();

        for addon in self.board.addons_for(header.id()) {
            items.push(MenuEntry::action(
                addon.name.clone(),
                MenuAction::LoadAddon(index, addon.name.clone()),
            ));
        }

        items.push(MenuEntry::separator());
        items.push(MenuEntry::action("Back", MenuAction::BackToHeader(index)));

        ("Select one of the following options:".to_string(), items)
    }

    fn go(&mut self, screen: Screen) {
        self.screen = screen;
        self.menu.reset();
    }

    /// Applies a menu action to the state.
    pub fn apply(&mut self, action: MenuAction) -> Result<()> {
        match action {
            MenuAction::OpenHeader(index) => self.go(Screen::HeaderMenu(index)),
            MenuAction::OpenFunctions(index) => self.go(Screen::FunctionMenu(index)),
            MenuAction::OpenAddons(index) => self.go(Screen::AddonMenu(index)),
            MenuAction::BackToMain => self.go(Screen::MainMenu),
            MenuAction::BackToHeader(index) => self.go(Screen::HeaderMenu(index)),

            MenuAction::ToggleFunction(index, name) => {
                let header = self
                    .board
                    .header_mut(index)
                    .context("Header index out of range")?;
                header.toggle(name)?;
            }

            MenuAction::LoadAddon(index, name) => {
                self.board.load_addon(index, &name)?;
                self.go(Screen::HeaderMenu(index));
            }

            MenuAction::ExportOverlay(index) => {
                let header = self
                    .board
                    .header(index)
                    .context("Header index out of range")?;
                let outcome =
                    dt::export_header_overlay(&self.config, self.board.def(), header, false, None)?;
                let path = outcome.dtbo.unwrap_or(outcome.dts);

                // Export leaves the header untouched afterwards
                if let Some(header) = self.board.header_mut(index) {
                    header.set_default();
                }
                self.saved[index] = false;

                self.go(Screen::Message {
                    lines: vec![
                        format!("Configuration saved to file {}.", path.display()),
                        "Press any key to go back".to_string(),
                    ],
                    then: AfterMessage::GoMain,
                });
            }

            MenuAction::SaveHeader(index) => {
                self.saved[index] = true;
                self.go(Screen::MainMenu);
            }

            MenuAction::DiscardHeader(index) => {
                if let Some(header) = self.board.header_mut(index) {
                    header.set_default();
                }
                self.saved[index] = false;
                self.go(Screen::HeaderMenu(index));
            }

            MenuAction::SaveAndExit => {
                let dtb = dt::build_dtb(&self.config, &self.board, &self.saved)?;
                self.go(Screen::Message {
                    lines: vec![
                        format!("Configuration saved to file {}.", dtb.display()),
                        "Reboot system to reconfigure.".to_string(),
                        "Press any key to exit".to_string(),
                    ],
                    then: AfterMessage::Quit,
                });
            }

            MenuAction::SaveAndReboot => {
                let dtb = dt::build_dtb(&self.config, &self.board, &self.saved)?;
                self.go(Screen::Message {
                    lines: vec![
                        format!("Configuration saved to file {}.", dtb.display()),
                        "Press any key to reboot the system now".to_string(),
                    ],
                    then: AfterMessage::Reboot,
                });
            }

            MenuAction::DiscardAll => {
                for header in 0..self.board.headers().len() {
                    if let Some(header) = self.board.header_mut(header) {
                        header.set_default();
                    }
                }
                self.saved.fill(false);
                self.menu.reset();
            }

            MenuAction::Quit => self.should_quit = true,
        }

        Ok(())
    }

    fn dismiss_message(&mut self, then: AfterMessage) {
        match then {
            AfterMessage::GoMain => self.go(Screen::MainMenu),
            AfterMessage::GoHeader(index) => self.go(Screen::HeaderMenu(index)),
            AfterMessage::Quit => self.should_quit = true,
            AfterMessage::QuitError => {
                self.should_quit = true;
                self.exit_error = true;
            }
            AfterMessage::Reboot => {
                self.should_quit = true;
                self.reboot_requested = true;
            }
        }
    }

    /// Routes an error into a fatal message screen.
    pub fn fail(&mut self, error: &anyhow::Error) {
        self.go(Screen::Message {
            lines: vec![
                "FATAL ERROR!".to_string(),
                format!("{error:#}"),
                "Press any key to terminate".to_string(),
            ],
            then: AfterMessage::QuitError,
        });
    }
}

/// Handles one key event. Returns `true` when the main loop should stop.
pub fn handle_key_event(state: &mut AppState, key: KeyEvent) -> Result<bool> {
    if let Screen::Message { then, .. } = &state.screen {
        let then = then.clone();
        state.dismiss_message(then);
        return Ok(state.should_quit);
    }

    let (_, items) = state.menu_entries();
    state.menu.clamp(&items);

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => state.menu.up(&items),
        KeyCode::Down | KeyCode::Char('j') => state.menu.down(&items),
        KeyCode::Enter | KeyCode::Char(' ') => {
            if let Some(action) = state.menu.selected(&items).and_then(|i| i.action.clone()) {
                if let Err(error) = state.apply(action) {
                    state.fail(&error);
                }
            }
        }
        KeyCode::Esc => {
            // Esc backs out of sub-menus; leaving a modified header still
            // requires an explicit save/discard/export choice
            let target = match &state.screen {
                Screen::FunctionMenu(index) | Screen::AddonMenu(index) => {
                    Some(Screen::HeaderMenu(*index))
                }
                Screen::HeaderMenu(index) => state
                    .board
                    .header(*index)
                    .is_some_and(crate::board::HeaderState::is_default)
                    .then_some(Screen::MainMenu),
                _ => None,
            };
            if let Some(screen) = target {
                state.go(screen);
            }
        }
        KeyCode::Char('q') if matches!(state.screen, Screen::MainMenu) => {
            state.should_quit = true;
        }
        _ => {}
    }

    Ok(state.should_quit)
}

/// Sets up the terminal for the TUI (raw mode + alternate screen).
pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;
    Ok(terminal)
}

/// Restores the terminal to its normal state.
pub fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Verifies the terminal is large enough for the fixed menu layout.
pub fn check_terminal_size() -> Result<()> {
    let (width, height) =
        crossterm::terminal::size().context("Failed to query terminal size")?;
    if width < MIN_TERM_WIDTH || height < MIN_TERM_HEIGHT {
        anyhow::bail!(
            "Terminal too small ({width}x{height}, need {MIN_TERM_WIDTH}x{MIN_TERM_HEIGHT}). \
             Please resize the terminal and try again."
        );
    }
    Ok(())
}

/// Runs the main TUI loop until the user exits.
pub fn run_tui(
    state: &mut AppState,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<()> {
    loop {
        state.theme = Theme::from_mode(state.config.ui.theme_mode);

        terminal.draw(|f| render(f, state))?;

        // Poll for events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_key_event(state, key)? {
                        break;
                    }
                }
                // Terminal resized, will re-render on next loop
                _ => {}
            }
        }

        if state.should_quit {
            break;
        }
    }

    Ok(())
}

/// Renders the UI from the current state.
fn render(f: &mut Frame, state: &AppState) {
    // Fill the screen with the theme background first
    let full_bg = Block::default().style(Style::default().bg(state.theme.background));
    f.render_widget(full_bg, f.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title bar
            Constraint::Min(6),    // Main content
            Constraint::Length(1), // Key hints
        ])
        .split(f.area());

    render_title_bar(f, chunks[0], state);
    render_content(f, chunks[1], state);
    render_hints(f, chunks[2], state);
}

fn render_title_bar(f: &mut Frame, area: Rect, state: &AppState) {
    let title = format!(" {APP_NAME} - {} ", state.board.def().display_name);
    let widget = Paragraph::new(Line::from(Span::styled(
        title,
        Style::default()
            .fg(state.theme.primary)
            .add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    f.render_widget(widget, area);
}

fn render_content(f: &mut Frame, area: Rect, state: &AppState) {
    match &state.screen {
        Screen::MainMenu => {
            let (title, items) = state.menu_entries();
            menu::render(f, area, &title, &items, &state.menu, &state.theme);
        }
        Screen::HeaderMenu(index) | Screen::FunctionMenu(index) | Screen::AddonMenu(index) => {
            if let Some(header) = state.board.header(*index) {
                let diagram_height = pin_diagram::height(header).min(area.height);
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(diagram_height), Constraint::Min(4)])
                    .split(area);

                pin_diagram::render(f, chunks[0], header, &state.theme);

                let (title, items) = state.menu_entries();
                menu::render(f, chunks[1], &title, &items, &state.menu, &state.theme);
            }
        }
        Screen::Message { lines, .. } => {
            render_message(f, area, lines, state);
        }
    }
}

fn render_message(f: &mut Frame, area: Rect, lines: &[String], state: &AppState) {
    let fatal = lines.first().is_some_and(|l| l.starts_with("FATAL"));
    let style = if fatal {
        Style::default()
            .fg(state.theme.error)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(state.theme.text)
    };

    let mut text: Vec<Line> = vec![Line::default(); (area.height / 3) as usize];
    for line in lines {
        text.push(Line::from(Span::styled(line.clone(), style)));
        text.push(Line::default());
    }

    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(ratatui::widgets::Wrap { trim: true });
    f.render_widget(widget, area);
}

fn render_hints(f: &mut Frame, area: Rect, state: &AppState) {
    let hints = match state.screen {
        Screen::Message { .. } => "Press any key to continue",
        Screen::MainMenu => "Up/Down: Navigate  |  Enter: Select  |  q: Exit",
        _ => "Up/Down: Navigate  |  Enter: Select  |  Esc: Back",
    };
    let widget = Paragraph::new(hints)
        .style(Style::default().fg(state.theme.text_muted))
        .alignment(Alignment::Center);
    f.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Addon;
    use crossterm::event::{KeyEvent, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn state() -> AppState {
        let board = Board::from_model("jetson-nano").unwrap();
        let mut config = Config::new();
        config.ui.theme_mode = crate::config::ThemeMode::Dark;
        AppState::new(board, config)
    }

    fn state_with_addon() -> AppState {
        let mut state = state();
        state.board.set_addons(vec![Addon {
            name: "Mic Hat".to_string(),
            header: "hdr40".to_string(),
            dtbo: "/opt/overlays/mic.dtbo".into(),
            functions: vec!["i2s4".to_string()],
            description: String::new(),
        }]);
        state
    }

    #[test]
    fn main_menu_lists_headers_and_exit_only_by_default() {
        let state = state();
        let (title, items) = state.menu_entries();
        assert_eq!(title, "Select one of the following:");

        let captions: Vec<_> = items
            .iter()
            .filter_map(|i| i.caption.as_deref())
            .collect();
        assert_eq!(captions, vec!["Configure 40-pin Header (J41)", "Exit"]);
    }

    #[test]
    fn save_actions_appear_once_a_header_is_saved() {
        let mut state = state();
        state.board.header_mut(0).unwrap().enable("spi1").unwrap();
        state.apply(MenuAction::SaveHeader(0)).unwrap();

        let (_, items) = state.menu_entries();
        let captions: Vec<_> = items
            .iter()
            .filter_map(|i| i.caption.as_deref())
            .collect();
        assert_eq!(
            captions,
            vec![
                "Re-configure 40-pin Header (J41)",
                "Save and reboot to reconfigure pins",
                "Save and exit without rebooting",
                "Discard all pin changes",
                "Exit",
            ]
        );
    }

    #[test]
    fn header_menu_switches_between_default_and_save_shapes() {
        let mut state = state();
        state.apply(MenuAction::OpenHeader(0)).unwrap();

        let (title, items) = state.menu_entries();
        assert_eq!(title, "40-pin Header (J41):");
        let captions: Vec<_> = items
            .iter()
            .filter_map(|i| i.caption.as_deref())
            .collect();
        // No addons registered, so only manual configuration is offered
        assert_eq!(captions, vec!["Configure header pins manually", "Back"]);

        state.board.header_mut(0).unwrap().enable("spi1").unwrap();
        let (_, items) = state.menu_entries();
        let captions: Vec<_> = items
            .iter()
            .filter_map(|i| i.caption.as_deref())
            .collect();
        assert_eq!(
            captions,
            vec![
                "Export as Device-Tree Overlay",
                "Save pin changes",
                "Discard pin changes",
            ]
        );
    }

    #[test]
    fn addon_entry_appears_when_addons_are_registered() {
        let mut state = state_with_addon();
        state.apply(MenuAction::OpenHeader(0)).unwrap();

        let (_, items) = state.menu_entries();
        let captions: Vec<_> = items
            .iter()
            .filter_map(|i| i.caption.as_deref())
            .collect();
        assert_eq!(
            captions,
            vec![
                "Configure for compatible hardware",
                "Configure header pins manually",
                "Back",
            ]
        );
    }

    #[test]
    fn toggling_a_function_is_visible_on_next_menu_build() {
        let mut state = state();
        state.apply(MenuAction::OpenFunctions(0)).unwrap();

        let (_, items) = state.menu_entries();
        let spi1 = items
            .iter()
            .find(|i| i.caption.as_deref().is_some_and(|c| c.starts_with("spi1")))
            .unwrap();
        assert_eq!(spi1.checked, Some(false));
        assert!(spi1.caption.as_deref().unwrap().contains("(19,21,23,24,26)"));

        state
            .apply(MenuAction::ToggleFunction(0, "spi1"))
            .unwrap();

        let (_, items) = state.menu_entries();
        let spi1 = items
            .iter()
            .find(|i| i.caption.as_deref().is_some_and(|c| c.starts_with("spi1")))
            .unwrap();
        assert_eq!(spi1.checked, Some(true));
    }

    #[test]
    fn loading_an_addon_returns_to_the_header_menu() {
        let mut state = state_with_addon();
        state.apply(MenuAction::OpenAddons(0)).unwrap();
        state
            .apply(MenuAction::LoadAddon(0, "Mic Hat".to_string()))
            .unwrap();

        assert_eq!(state.screen, Screen::HeaderMenu(0));
        assert_eq!(state.board.header(0).unwrap().addon(), Some("Mic Hat"));

        // With an addon loaded only save/discard remain
        let (_, items) = state.menu_entries();
        let captions: Vec<_> = items
            .iter()
            .filter_map(|i| i.caption.as_deref())
            .collect();
        assert_eq!(captions, vec!["Save pin changes", "Discard pin changes"]);
    }

    #[test]
    fn discard_restores_defaults_and_stays_on_the_header() {
        let mut state = state();
        state.apply(MenuAction::OpenHeader(0)).unwrap();
        state.board.header_mut(0).unwrap().enable("spi1").unwrap();

        state.apply(MenuAction::DiscardHeader(0)).unwrap();
        assert_eq!(state.screen, Screen::HeaderMenu(0));
        assert!(state.board.header(0).unwrap().is_default());
        assert!(!state.saved[0]);
    }

    #[test]
    fn keyboard_navigation_drives_the_main_menu() {
        let mut state = state();

        // Down lands on Exit (separator skipped), Enter quits
        assert!(!handle_key_event(&mut state, key(KeyCode::Down)).unwrap());
        assert!(handle_key_event(&mut state, key(KeyCode::Enter)).unwrap());
        assert!(state.should_quit);
        assert!(!state.exit_error);
    }

    #[test]
    fn enter_opens_the_selected_header() {
        let mut state = state();
        assert!(!handle_key_event(&mut state, key(KeyCode::Enter)).unwrap());
        assert_eq!(state.screen, Screen::HeaderMenu(0));
    }

    #[test]
    fn escape_needs_a_default_header_to_leave() {
        let mut state = state();
        state.apply(MenuAction::OpenHeader(0)).unwrap();
        state.board.header_mut(0).unwrap().enable("spi1").unwrap();

        handle_key_event(&mut state, key(KeyCode::Esc)).unwrap();
        assert_eq!(state.screen, Screen::HeaderMenu(0), "modified header stays");

        state.board.header_mut(0).unwrap().set_default();
        handle_key_event(&mut state, key(KeyCode::Esc)).unwrap();
        assert_eq!(state.screen, Screen::MainMenu);
    }

    #[test]
    fn message_screens_dismiss_to_their_follow_up() {
        let mut state = state();
        state.screen = Screen::Message {
            lines: vec!["Configuration saved.".to_string()],
            then: AfterMessage::GoMain,
        };
        assert!(!handle_key_event(&mut state, key(KeyCode::Char('x'))).unwrap());
        assert_eq!(state.screen, Screen::MainMenu);

        state.screen = Screen::Message {
            lines: vec!["FATAL ERROR!".to_string()],
            then: AfterMessage::QuitError,
        };
        assert!(handle_key_event(&mut state, key(KeyCode::Enter)).unwrap());
        assert!(state.exit_error);
    }

    #[test]
    fn failed_actions_surface_as_fatal_messages() {
        let mut state = state();
        let error = anyhow::anyhow!("Unknown hardware addon Ghost Hat!");
        state.fail(&error);

        match &state.screen {
            Screen::Message { lines, then } => {
                assert_eq!(lines[0], "FATAL ERROR!");
                assert!(lines[1].contains("Ghost Hat"));
                assert_eq!(*then, AfterMessage::QuitError);
            }
            other => panic!("unexpected screen {other:?}"),
        }
    }

    #[test]
    fn discard_all_resets_every_header() {
        let mut state = state();
        state.board.header_mut(0).unwrap().enable("pwm2").unwrap();
        state.saved[0] = true;

        state.apply(MenuAction::DiscardAll).unwrap();
        assert!(state.board.header(0).unwrap().is_default());
        assert!(!state.any_saved());
    }
}
