use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::backend::Backend;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Span, Spans};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use ratatui::Frame;

use crate::xtq_color::{Depth, Swatch, BLACK, HOVER_LIFT};

/// What pressing a button does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Key(char), // digit or decimal point
    Delete,
    Submit,
    PlayAgain,
}

/// A clickable rectangle positioned relative to the game window
#[derive(Debug, Clone)]
pub struct Button {
    pub rect: Rect,
    pub label: String,
    pub color: Swatch,
    pub action: Action,
    pub hovered: bool,
}

impl Button {
    pub fn new(rect: Rect, label: impl Into<String>, color: Swatch, action: Action) -> Self {
        Button {
            rect,
            label: label.into(),
            color,
            action,
            hovered: false,
        }
    }

    /// Screen rectangle once the window is placed at `origin`
    pub fn screen_rect(&self, origin: (u16, u16)) -> Rect {
        Rect::new(origin.0 + self.rect.x, origin.1 + self.rect.y, self.rect.width, self.rect.height)
    }

    pub fn contains(&self, origin: (u16, u16), column: u16, row: u16) -> bool {
        let r = self.screen_rect(origin);
        column >= r.x && column < r.x + r.width && row >= r.y && row < r.y + r.height
    }

    /// Update hover state; true only for a left press landing inside the button
    pub fn handle_mouse(&mut self, me: &MouseEvent, origin: (u16, u16)) -> bool {
        let inside = self.contains(origin, me.column, me.row);
        match me.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                self.hovered = inside;
                false
            }
            MouseEventKind::Down(MouseButton::Left) => {
                self.hovered = inside;
                inside
            }
            _ => false,
        }
    }

    /// Filled, rounded box with the centered label; lighter while hovered
    pub fn draw<B: Backend>(&self, f: &mut Frame<B>, origin: (u16, u16), depth: Depth) {
        let area = self.screen_rect(origin).intersection(f.size());
        if area.width == 0 || area.height == 0 {
            return;
        }
        let fill = if self.hovered { self.color.lighten(HOVER_LIFT) } else { self.color };
        let ink = BLACK.resolve(depth);
        let style = Style::default().bg(fill.resolve(depth)).fg(ink);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(style)
            .style(style);
        // center the label vertically inside the border
        let inner_h = area.height.saturating_sub(2) as usize;
        let mut lines = vec![Spans::from(""); inner_h.saturating_sub(1) / 2];
        lines.push(Spans::from(Span::styled(
            self.label.clone(),
            style.add_modifier(Modifier::BOLD),
        )));
        let p = Paragraph::new(lines).block(block).alignment(Alignment::Center);
        f.render_widget(p, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use crate::xtq_color::{RED, WHITE};
    use ratatui::backend::TestBackend;
    use ratatui::style::Color;
    use ratatui::Terminal;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn button() -> Button {
        Button::new(Rect::new(10, 5, 7, 3), "7", WHITE, Action::Key('7'))
    }

    #[test]
    fn move_sets_hover_without_pressing() {
        let mut b = button();
        let origin = (2, 1);
        assert!(!b.handle_mouse(&mouse(MouseEventKind::Moved, 12, 6), origin));
        assert!(b.hovered);
        assert!(!b.handle_mouse(&mouse(MouseEventKind::Moved, 11, 6), origin));
        assert!(!b.hovered);
    }

    #[test]
    fn press_inside_only() {
        let mut b = button();
        let origin = (0, 0);
        assert!(b.handle_mouse(&mouse(MouseEventKind::Down(MouseButton::Left), 16, 7), origin));
        assert!(!b.handle_mouse(&mouse(MouseEventKind::Down(MouseButton::Left), 17, 7), origin));
        assert!(!b.handle_mouse(&mouse(MouseEventKind::Down(MouseButton::Right), 12, 6), origin));
        assert!(!b.handle_mouse(&mouse(MouseEventKind::Up(MouseButton::Left), 12, 6), origin));
    }

    #[test]
    fn draw_lightens_hovered_fill_and_centers_label() {
        let idle = Button::new(Rect::new(0, 0, 7, 5), "7", WHITE, Action::Key('7'));
        let mut hot = Button::new(Rect::new(8, 0, 7, 5), "<-", RED, Action::Delete);
        hot.hovered = true;

        let mut terminal = Terminal::new(TestBackend::new(16, 6)).unwrap();
        terminal
            .draw(|f| {
                idle.draw(f, (0, 0), Depth::TrueColor);
                hot.draw(f, (0, 0), Depth::TrueColor);
            })
            .unwrap();
        let buf = terminal.backend().buffer();

        assert_eq!(buf.get(1, 1).bg, Color::Rgb(255, 255, 255));
        assert_eq!(buf.get(9, 1).bg, Color::Rgb(255, 129, 101));
        // label sits on the middle row of the 3-row interior
        assert_eq!(buf.get(3, 2).symbol, "7");
        assert_eq!(buf.get(3, 1).symbol, " ");
        assert_eq!(buf.get(3, 3).symbol, " ");
        assert_eq!(buf.get(10, 2).symbol, "<");
        assert_eq!(buf.get(11, 2).symbol, "-");
        // rounded corners
        assert_eq!(buf.get(0, 0).symbol, "╭");
        assert_eq!(buf.get(6, 4).symbol, "╯");
    }
}
