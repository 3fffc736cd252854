//! Menu widget: an ordered list of items with a selected index.
//!
//! Items are captioned actions, selectable checkboxes, or empty separator
//! rows. Navigation skips separators and clamps at the ends; captions are
//! rendered centred, with the selected row inverted.

use crate::tui::theme::Theme;
use crate::tui::MenuAction;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

/// One menu row.
#[derive(Debug, Clone)]
pub struct MenuEntry {
    /// Caption text; `None` renders an empty separator row
    pub caption: Option<String>,
    /// Checkbox state for selectable rows
    pub checked: Option<bool>,
    /// Action dispatched when the row is selected
    pub action: Option<MenuAction>,
}

impl MenuEntry {
    /// A plain action row.
    #[must_use]
    pub fn action(caption: impl Into<String>, action: MenuAction) -> Self {
        Self {
            caption: Some(caption.into()),
            checked: None,
            action: Some(action),
        }
    }

    /// A selectable checkbox row.
    #[must_use]
    pub fn toggle(caption: impl Into<String>, checked: bool, action: MenuAction) -> Self {
        Self {
            caption: Some(caption.into()),
            checked: Some(checked),
            action: Some(action),
        }
    }

    /// An empty separator row.
    #[must_use]
    pub const fn separator() -> Self {
        Self {
            caption: None,
            checked: None,
            action: None,
        }
    }

    /// Whether the row is an empty separator.
    #[must_use]
    pub const fn is_separator(&self) -> bool {
        self.caption.is_none()
    }

    fn display_caption(&self, checkbox_width: usize) -> String {
        let caption = self.caption.as_deref().unwrap_or("");
        match self.checked {
            Some(true) => format!("[*] {caption:<checkbox_width$}"),
            Some(false) => format!("[ ] {caption:<checkbox_width$}"),
            None => caption.to_string(),
        }
    }
}

/// Navigation state for one menu.
#[derive(Debug, Clone, Default)]
pub struct MenuState {
    /// Index of the selected row
    pub index: usize,
}

impl MenuState {
    /// Creates a state with the first row selected.
    #[must_use]
    pub const fn new() -> Self {
        Self { index: 0 }
    }

    /// Resets the selection to the top.
    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Moves the selection up, skipping separators; stays put at the top.
    pub fn up(&mut self, items: &[MenuEntry]) {
        let mut index = self.index;
        while index > 0 {
            index -= 1;
            if !items[index].is_separator() {
                self.index = index;
                return;
            }
        }
    }

    /// Moves the selection down, skipping separators; stays put at the end.
    pub fn down(&mut self, items: &[MenuEntry]) {
        let mut index = self.index;
        while index + 1 < items.len() {
            index += 1;
            if !items[index].is_separator() {
                self.index = index;
                return;
            }
        }
    }

    /// Ensures the selection sits on a selectable row after a rebuild.
    pub fn clamp(&mut self, items: &[MenuEntry]) {
        if items
            .get(self.index)
            .is_some_and(|item| !item.is_separator())
        {
            return;
        }
        self.index = items
            .iter()
            .position(|item| !item.is_separator())
            .unwrap_or(0);
    }

    /// The selected row, if any.
    #[must_use]
    pub fn selected<'a>(&self, items: &'a [MenuEntry]) -> Option<&'a MenuEntry> {
        items.get(self.index).filter(|item| !item.is_separator())
    }
}

/// Renders a titled menu centred in `area`.
pub fn render(
    f: &mut Frame,
    area: Rect,
    title: &str,
    items: &[MenuEntry],
    state: &MenuState,
    theme: &Theme,
) {
    // Selectable captions are padded to a common width so checkboxes line up
    let checkbox_width = items
        .iter()
        .filter(|item| item.checked.is_some())
        .filter_map(|item| item.caption.as_deref())
        .map(str::len)
        .max()
        .unwrap_or(0);

    let mut lines = Vec::with_capacity(items.len() + 2);
    lines.push(Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(theme.primary)
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::default());

    for (index, item) in items.iter().enumerate() {
        if item.is_separator() {
            lines.push(Line::default());
            continue;
        }

        let caption = item.display_caption(checkbox_width);
        let style = if index == state.index {
            Style::default()
                .fg(theme.accent)
                .bg(theme.highlight_bg)
                .add_modifier(Modifier::REVERSED)
        } else {
            Style::default().fg(theme.text)
        };
        lines.push(Line::from(Span::styled(caption, style)));
    }

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<MenuEntry> {
        vec![
            MenuEntry::action("Configure header pins manually", MenuAction::Quit),
            MenuEntry::separator(),
            MenuEntry::action("Back", MenuAction::Quit),
        ]
    }

    #[test]
    fn navigation_skips_separators() {
        let items = items();
        let mut state = MenuState::new();

        state.down(&items);
        assert_eq!(state.index, 2, "separator must be skipped");

        state.up(&items);
        assert_eq!(state.index, 0);
    }

    #[test]
    fn navigation_clamps_at_the_ends() {
        let items = items();
        let mut state = MenuState::new();

        state.up(&items);
        assert_eq!(state.index, 0);

        state.down(&items);
        state.down(&items);
        assert_eq!(state.index, 2, "must stay on the last selectable row");
    }

    #[test]
    fn clamp_moves_off_separators_after_rebuild() {
        let items = items();
        let mut state = MenuState { index: 1 };
        state.clamp(&items);
        assert_eq!(state.index, 0);

        let mut state = MenuState { index: 17 };
        state.clamp(&items);
        assert_eq!(state.index, 0);
    }

    #[test]
    fn selected_ignores_separators() {
        let items = items();
        let state = MenuState { index: 1 };
        assert!(state.selected(&items).is_none());

        let state = MenuState { index: 2 };
        assert_eq!(
            state.selected(&items).and_then(|i| i.caption.as_deref()),
            Some("Back")
        );
    }

    #[test]
    fn checkbox_captions_are_padded() {
        let entry = MenuEntry::toggle("spi1 (19,21,23,24,26)", true, MenuAction::Quit);
        assert_eq!(
            entry.display_caption(25),
            "[*] spi1 (19,21,23,24,26)    "
        );

        let entry = MenuEntry::toggle("pwm2 (33)", false, MenuAction::Quit);
        assert!(entry.display_caption(25).starts_with("[ ] pwm2 (33)"));
    }
}
