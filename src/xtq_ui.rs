use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Span, Spans, Text};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph};
use ratatui::{Frame, Terminal};
use std::io;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use unicode_width::UnicodeWidthStr;

use crate::xtq_audio::{Cue, Sounds};
use crate::xtq_button::{Action, Button};
use crate::xtq_color::{self, Depth, Swatch};
use crate::xtq_error::Result;
use crate::xtq_game::{FeedbackKind, Game, Outcome, Phase, TOTAL_QUESTIONS};
use crate::xtq_lang::{fill, Lang};

/// Size of the game window in cells
pub const WINDOW_WIDTH: u16 = 60;
pub const WINDOW_HEIGHT: u16 = 24;
pub const FPS: u64 = 30;

// Keypad geometry (window coordinates)
const KEY_W: u16 = 7;
const KEY_H: u16 = 3;
const KEY_GAP: u16 = 2;
const KEYPAD_Y: u16 = 9;

/// Buttons and render settings that live for the whole session
pub struct Ui {
    keypad: Vec<Button>,
    submit: Button,
    play_again: Button,
    depth: Depth,
    ascii: bool,
    // unshaken window position from the last frame, used for hit-testing
    origin: Option<(u16, u16)>,
}

impl Ui {
    pub fn new(lang: &Lang, ascii: bool, depth: Depth) -> Self {
        let start_x = (WINDOW_WIDTH - (KEY_W * 3 + KEY_GAP * 2)) / 2;
        let key_rect = |col: u16, row: u16| {
            Rect::new(start_x + col * (KEY_W + KEY_GAP), KEYPAD_Y + row * KEY_H, KEY_W, KEY_H)
        };

        let mut keypad = Vec::with_capacity(12);
        for (i, c) in ('1'..='9').enumerate() {
            let i = i as u16;
            keypad.push(Button::new(key_rect(i % 3, i / 3), c.to_string(), xtq_color::WHITE, Action::Key(c)));
        }
        // bottom row: decimal point, zero, backspace
        keypad.push(Button::new(key_rect(0, 3), ".", xtq_color::WHITE, Action::Key('.')));
        keypad.push(Button::new(key_rect(1, 3), "0", xtq_color::WHITE, Action::Key('0')));
        let back = if ascii { "<-" } else { "←" };
        keypad.push(Button::new(key_rect(2, 3), back, xtq_color::RED, Action::Delete));

        let submit = Button::new(
            Rect::new(WINDOW_WIDTH / 2 - 6, WINDOW_HEIGHT - 3, 12, 3),
            lang.assets.btn_submit,
            xtq_color::GREEN,
            Action::Submit,
        );
        let play_again = Button::new(
            Rect::new(WINDOW_WIDTH / 2 - 10, WINDOW_HEIGHT / 2 + 2, 20, 3),
            lang.assets.btn_play_again,
            xtq_color::GREEN,
            Action::PlayAgain,
        );

        Ui {
            keypad,
            submit,
            play_again,
            depth,
            ascii,
            origin: None,
        }
    }

    fn color(&self, swatch: Swatch) -> ratatui::style::Color {
        swatch.resolve(self.depth)
    }

    /// Buttons that take input in the current phase
    fn active_buttons(&mut self, over: bool) -> Vec<&mut Button> {
        if over {
            vec![&mut self.play_again]
        } else {
            self.keypad.iter_mut().chain(std::iter::once(&mut self.submit)).collect()
        }
    }
}

/// Top-left corner of the window, centered and moved by the shake offset
/// None when the terminal cannot hold the window
pub fn window_origin(size: Rect, offset: (i16, i16)) -> Option<(u16, u16)> {
    if size.width < WINDOW_WIDTH || size.height < WINDOW_HEIGHT {
        return None;
    }
    let slack_x = (size.width - WINDOW_WIDTH) as i32;
    let slack_y = (size.height - WINDOW_HEIGHT) as i32;
    let x = (slack_x / 2 + offset.0 as i32).clamp(0, slack_x);
    let y = (slack_y / 2 + offset.1 as i32).clamp(0, slack_y);
    Some((size.x + x as u16, size.y + y as u16))
}

/// Route one input event; returns true when the player asked to quit
pub fn handle_event(ev: &Event, game: &mut Game, ui: &mut Ui, sounds: &Sounds, now: Instant) -> bool {
    match ev {
        Event::Key(KeyEvent { code, modifiers, kind, .. }) => {
            if *kind != KeyEventKind::Press {
                return false;
            }
            match code {
                KeyCode::Esc | KeyCode::Char('q') => return true,
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
                _ => {}
            }
        }
        Event::Mouse(me) => {
            let Some(origin) = ui.origin else {
                return false;
            };
            // every button sees the event so hover state stays in sync
            let mut pressed = None;
            for button in ui.active_buttons(game.is_over()) {
                if button.handle_mouse(me, origin) {
                    pressed = Some(button.action);
                }
            }
            if let Some(action) = pressed {
                apply(action, game, ui, sounds, now);
            }
        }
        _ => {}
    }
    false
}

fn apply(action: Action, game: &mut Game, ui: &mut Ui, sounds: &Sounds, now: Instant) {
    match action {
        Action::Key(c) => game.push_char(c),
        Action::Delete => game.delete(),
        Action::Submit => match game.submit(now) {
            Outcome::Correct => sounds.play(Cue::Correct),
            Outcome::Wrong => sounds.play(Cue::Wrong),
            Outcome::Invalid | Outcome::Ignored => {}
        },
        Action::PlayAgain => {
            game.reset();
            ui.play_again.hovered = false;
        }
    }
}

/// Render one frame
pub fn draw<B: Backend>(f: &mut Frame<B>, game: &Game, ui: &mut Ui, lang: &Lang, now: Instant, offset: (i16, i16)) {
    let size = f.size();
    ui.origin = window_origin(size, (0, 0));
    let Some(origin) = window_origin(size, offset) else {
        draw_too_small(f, lang);
        return;
    };

    // blue backdrop over the whole terminal
    let bg = Style::default().bg(ui.color(xtq_color::BLUE));
    f.render_widget(Block::default().style(bg), size);

    match game.phase(now) {
        Phase::GameOver => draw_game_over(f, game, ui, lang, origin),
        Phase::Answering | Phase::Feedback => draw_quiz(f, game, ui, lang, now, origin),
    }
}

fn draw_quiz<B: Backend>(f: &mut Frame<B>, game: &Game, ui: &Ui, lang: &Lang, now: Instant, origin: (u16, u16)) {
    let a = &lang.assets;
    let ink = ui.color(xtq_color::BLACK);

    // lives (left) and score (right)
    let heart = if ui.ascii { "<3" } else { "♥" };
    let lives = format!("{}{}", a.lives_label, heart.repeat(game.lives() as usize));
    let lives_style = Style::default().fg(ui.color(xtq_color::RED)).add_modifier(Modifier::BOLD);
    text_at(f, origin, Rect::new(1, 0, WINDOW_WIDTH / 2, 1), &lives, lives_style, Alignment::Left);
    let score = fill(a.score_fmt, &[&game.score()]);
    let score_style = Style::default().fg(ui.color(xtq_color::YELLOW)).add_modifier(Modifier::BOLD);
    text_at(f, origin, Rect::new(WINDOW_WIDTH / 2, 0, WINDOW_WIDTH / 2 - 1, 1), &score, score_style, Alignment::Right);

    // progress bar and caption
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(ui.color(xtq_color::GREEN)).bg(ui.color(xtq_color::WHITE)))
        .ratio(game.progress())
        .use_unicode(true)
        .label(Span::raw(""));
    f.render_widget(gauge, place(f, origin, Rect::new(5, 1, WINDOW_WIDTH - 10, 1)));
    let progress = fill(a.progress_fmt, &[&game.current(), &TOTAL_QUESTIONS]);
    text_at(f, origin, Rect::new(0, 2, WINDOW_WIDTH, 1), &progress, Style::default().fg(ink), Alignment::Center);

    // question
    let question = fill(a.question_fmt, &[&game.question().expression(ui.ascii)]);
    text_at(f, origin, Rect::new(0, 4, WINDOW_WIDTH, 1), &question, Style::default().fg(ink).add_modifier(Modifier::BOLD), Alignment::Center);

    // answer box; the border flashes red while the screen shakes
    let box_style = Style::default().bg(ui.color(xtq_color::WHITE)).fg(ink);
    let border = if game.is_shaking() { box_style.fg(ui.color(xtq_color::RED)) } else { box_style };
    let answer = Paragraph::new(Span::styled(game.answer().to_string(), box_style.add_modifier(Modifier::BOLD)))
        .block(Block::default().borders(Borders::ALL).border_style(border).style(box_style))
        .alignment(Alignment::Center);
    f.render_widget(answer, place(f, origin, Rect::new(WINDOW_WIDTH / 2 - 10, 5, 20, 3)));

    // feedback, only inside its display window
    if let Some(fb) = game.visible_feedback(now) {
        let color = match fb.kind {
            FeedbackKind::Correct => xtq_color::GREEN,
            FeedbackKind::Wrong(_) | FeedbackKind::Invalid => xtq_color::RED,
        };
        let msg = lang.feedback(fb.kind, ui.ascii);
        text_at(f, origin, Rect::new(0, 8, WINDOW_WIDTH, 1), &msg, Style::default().fg(ui.color(color)).add_modifier(Modifier::BOLD), Alignment::Center);
    }

    for button in ui.keypad.iter().chain(std::iter::once(&ui.submit)) {
        button.draw(f, origin, ui.depth);
    }

    // exit hint in the bottom-right corner
    let hint_w = a.hint_exit.width() as u16 + 1;
    text_at(f, origin, Rect::new(WINDOW_WIDTH - hint_w, WINDOW_HEIGHT - 1, hint_w, 1), a.hint_exit, Style::default().fg(ui.color(xtq_color::YELLOW)), Alignment::Left);
}

fn draw_game_over<B: Backend>(f: &mut Frame<B>, game: &Game, ui: &Ui, lang: &Lang, origin: (u16, u16)) {
    let a = &lang.assets;
    let white = Style::default().fg(ui.color(xtq_color::WHITE)).add_modifier(Modifier::BOLD);
    let mid = WINDOW_HEIGHT / 2;

    text_at(f, origin, Rect::new(0, mid - 6, WINDOW_WIDTH, 1), a.over_title, white, Alignment::Center);
    let score = fill(a.over_score_fmt, &[&game.score(), &TOTAL_QUESTIONS]);
    text_at(f, origin, Rect::new(0, mid - 3, WINDOW_WIDTH, 1), &score, white, Alignment::Center);
    // last answer's result stays visible here
    if let Some(fb) = game.feedback() {
        let msg = lang.feedback(fb.kind, ui.ascii);
        text_at(f, origin, Rect::new(0, mid - 1, WINDOW_WIDTH, 1), &msg, Style::default().fg(ui.color(xtq_color::YELLOW)), Alignment::Center);
    }
    ui.play_again.draw(f, origin, ui.depth);
    text_at(f, origin, Rect::new(0, mid + 7, WINDOW_WIDTH, 1), a.hint_exit, Style::default().fg(ui.color(xtq_color::YELLOW)), Alignment::Center);
}

fn draw_too_small<B: Backend>(f: &mut Frame<B>, lang: &Lang) {
    let size = f.size();
    let a = &lang.assets;
    let warn_lines = vec![
        Spans::from(Span::raw(a.tsmsg_line1)),
        Spans::from(Span::raw(fill(a.tsmsg_line2, &[&WINDOW_WIDTH, &WINDOW_HEIGHT]))),
    ];
    let warn = Paragraph::new(Text::from(warn_lines))
        .block(Block::default().borders(Borders::ALL).title(a.tsmsg_title))
        .alignment(Alignment::Center);
    f.render_widget(Clear, size);
    let w = 40u16.min(size.width.saturating_sub(2));
    let h = 4u16.min(size.height.saturating_sub(2));
    f.render_widget(warn, center_rect(w, h, size));
}

/// Translate a window-relative rect to the screen, clipped to the frame
fn place<B: Backend>(f: &Frame<B>, origin: (u16, u16), r: Rect) -> Rect {
    Rect::new(origin.0 + r.x, origin.1 + r.y, r.width, r.height).intersection(f.size())
}

fn text_at<B: Backend>(f: &mut Frame<B>, origin: (u16, u16), r: Rect, text: &str, style: Style, align: Alignment) {
    let area = place(f, origin, r);
    if area.width == 0 || area.height == 0 {
        return;
    }
    let p = Paragraph::new(Span::styled(text.to_string(), style)).alignment(align);
    f.render_widget(p, area);
}

fn center_rect(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Set up the terminal, run the frame loop, and always restore the terminal
pub fn run(game: &mut Game, ui: &mut Ui, lang: &Lang, sounds: &Sounds) -> Result<()> {
    enable_raw_mode()?;
    let mut terminal = match enter_screen(lang) {
        Ok(terminal) => terminal,
        Err(e) => {
            let _ = execute!(io::stdout(), DisableMouseCapture, terminal::LeaveAlternateScreen);
            let _ = disable_raw_mode();
            return Err(e);
        }
    };
    info!("terminal ready");

    let result = frame_loop(&mut terminal, game, ui, lang, sounds);
    let restored = restore_screen(&mut terminal);
    settle(result, restored)
}

/// A loop error wins over a restore error
fn settle(result: Result<()>, restored: Result<()>) -> Result<()> {
    result?;
    restored
}

fn enter_screen(lang: &Lang) -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnableMouseCapture, terminal::EnterAlternateScreen, terminal::SetTitle(lang.assets.title))?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_screen(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    // every step runs even if an earlier one failed
    let raw = disable_raw_mode();
    let screen = execute!(terminal.backend_mut(), DisableMouseCapture, terminal::LeaveAlternateScreen);
    let cursor = terminal.show_cursor();
    raw?;
    screen?;
    cursor?;
    Ok(())
}

fn frame_loop<B: Backend>(terminal: &mut Terminal<B>, game: &mut Game, ui: &mut Ui, lang: &Lang, sounds: &Sounds) -> Result<()> {
    let frame_time = Duration::from_millis(1000 / FPS);
    terminal.draw(|f| draw(f, game, ui, lang, Instant::now(), (0, 0)))?;
    let mut last_frame = Instant::now();

    loop {
        let timeout = frame_time.checked_sub(last_frame.elapsed()).unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            // drain everything queued for this frame
            loop {
                let ev = event::read()?;
                if handle_event(&ev, game, ui, sounds, Instant::now()) {
                    debug!("quit requested");
                    return Ok(());
                }
                if !event::poll(Duration::ZERO)? {
                    break;
                }
            }
        }

        if last_frame.elapsed() >= frame_time {
            last_frame = Instant::now();
            let offset = game.next_shake_offset();
            terminal.draw(|f| draw(f, game, ui, lang, last_frame, offset))?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xtq_question::{Operator, Question};
    use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
    use ratatui::backend::TestBackend;

    const SCREEN: Rect = Rect { x: 0, y: 0, width: 80, height: 26 };

    fn setup() -> (Game, Ui, Lang) {
        let lang = Lang::new("en");
        let mut ui = Ui::new(&lang, false, Depth::TrueColor);
        ui.origin = window_origin(SCREEN, (0, 0));
        (Game::with_seed(42), ui, lang)
    }

    fn render(game: &Game, ui: &mut Ui, lang: &Lang, now: Instant, size: Rect) -> String {
        let mut terminal = Terminal::new(TestBackend::new(size.width, size.height)).unwrap();
        terminal.draw(|f| draw(f, game, ui, lang, now, (0, 0))).unwrap();
        let buf = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(&buf.get(x, y).symbol);
            }
            out.push('\n');
        }
        out
    }

    fn click(game: &mut Game, ui: &mut Ui, at: Rect, now: Instant) -> bool {
        let ev = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: at.x + at.width / 2,
            row: at.y + at.height / 2,
            modifiers: KeyModifiers::NONE,
        });
        handle_event(&ev, game, ui, &Sounds::disabled(), now)
    }

    fn key_rect(ui: &Ui, action: Action) -> Rect {
        let origin = ui.origin.unwrap();
        ui.keypad
            .iter()
            .chain(std::iter::once(&ui.submit))
            .find(|b| b.action == action)
            .map(|b| b.screen_rect(origin))
            .unwrap()
    }

    #[test]
    fn window_is_centered_and_clamped() {
        assert_eq!(window_origin(SCREEN, (0, 0)), Some((10, 1)));
        assert_eq!(window_origin(SCREEN, (-2, 1)), Some((8, 2)));
        assert_eq!(window_origin(Rect::new(0, 0, 60, 24), (2, -1)), Some((0, 0)));
        assert_eq!(window_origin(Rect::new(0, 0, 59, 24), (0, 0)), None);
    }

    #[test]
    fn keypad_layout() {
        let (_, ui, _) = setup();
        assert_eq!(ui.keypad.len(), 12);
        for b in ui.keypad.iter().chain([&ui.submit, &ui.play_again]) {
            assert!(b.rect.x + b.rect.width <= WINDOW_WIDTH);
            assert!(b.rect.y + b.rect.height <= WINDOW_HEIGHT);
        }
        // no two keypad buttons overlap
        for (i, a) in ui.keypad.iter().enumerate() {
            for b in &ui.keypad[i + 1..] {
                assert!(!a.rect.intersects(b.rect), "{} overlaps {}", a.label, b.label);
            }
        }
    }

    #[test]
    fn quiz_screen_shows_state() {
        let (mut game, mut ui, lang) = setup();
        let now = Instant::now();
        let text = render(&game, &mut ui, &lang, now, SCREEN);
        assert!(text.contains("Lives: ♥♥♥"));
        assert!(text.contains("Score: 0"));
        assert!(text.contains("Question 1/30"));
        assert!(text.contains(&format!("What is {}?", game.question().expression(false))));
        assert!(text.contains("Submit"));

        game.push_char('4');
        game.push_char('2');
        let text = render(&game, &mut ui, &lang, now, SCREEN);
        assert!(text.contains("42"));
    }

    #[test]
    fn feedback_fades_after_window() {
        let (mut game, mut ui, lang) = setup();
        let now = Instant::now();
        let answer = game.question().answer();
        for c in (answer + 5).to_string().chars() {
            game.push_char(c);
        }
        game.submit(now);
        let expected = format!("Wrong! Answer was {answer}");
        let text = render(&game, &mut ui, &lang, now + Duration::from_millis(500), SCREEN);
        assert!(text.contains(&expected));
        assert!(text.contains("Lives: ♥♥ "));
        let text = render(&game, &mut ui, &lang, now + Duration::from_secs(3), SCREEN);
        assert!(!text.contains(&expected));
    }

    #[test]
    fn keypad_clicks_edit_answer() {
        let (mut game, mut ui, _) = setup();
        let now = Instant::now();
        for action in [Action::Key('1'), Action::Key('.'), Action::Key('.'), Action::Key('5'), Action::Delete, Action::Key('0')] {
            let r = key_rect(&ui, action);
            assert!(!click(&mut game, &mut ui, r, now));
        }
        assert_eq!(game.answer(), "1.0");
    }

    #[test]
    fn submit_click_scores() {
        let (mut game, mut ui, _) = setup();
        let now = Instant::now();
        game.set_question(Question::new(7, Operator::Add, 3));
        for action in [Action::Key('1'), Action::Key('0'), Action::Submit] {
            let r = key_rect(&ui, action);
            click(&mut game, &mut ui, r, now);
        }
        assert_eq!(game.score(), 1);
        assert_eq!(game.current(), 2);
        assert_eq!(game.answer(), "");
    }

    #[test]
    fn game_over_screen_and_restart() {
        let (mut game, mut ui, lang) = setup();
        let now = Instant::now();
        while !game.is_over() {
            let wrong = (game.question().answer() + 1).to_string();
            for c in wrong.chars() {
                game.push_char(c);
            }
            game.submit(now);
        }
        let text = render(&game, &mut ui, &lang, now, SCREEN);
        assert!(text.contains("Game Over!"));
        assert!(text.contains("Final Score: 0/30"));
        assert!(text.contains("Play Again"));

        // keypad is inert while the game is over
        let digit = key_rect(&ui, Action::Key('5'));
        click(&mut game, &mut ui, digit, now);
        assert_eq!(game.answer(), "");

        let origin = ui.origin.unwrap();
        let again = ui.play_again.screen_rect(origin);
        click(&mut game, &mut ui, again, now);
        assert!(!game.is_over());
        assert_eq!(game.score(), 0);
        assert_eq!(game.lives(), 3);
        assert_eq!(game.current(), 1);
    }

    #[test]
    fn quit_keys() {
        let (mut game, mut ui, _) = setup();
        let sounds = Sounds::disabled();
        let now = Instant::now();
        let esc = Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        let digit = Event::Key(KeyEvent::new(KeyCode::Char('7'), KeyModifiers::NONE));
        assert!(handle_event(&esc, &mut game, &mut ui, &sounds, now));
        assert!(handle_event(&ctrl_c, &mut game, &mut ui, &sounds, now));
        // keyboard does not type answers
        assert!(!handle_event(&digit, &mut game, &mut ui, &sounds, now));
        assert_eq!(game.answer(), "");
    }

    #[test]
    fn loop_error_survives_restore_error() {
        let looped = Err(io::Error::new(io::ErrorKind::BrokenPipe, "loop").into());
        let restored = Err(io::Error::new(io::ErrorKind::Other, "restore").into());
        match settle(looped, restored) {
            Err(crate::xtq_error::QuizError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("unexpected: {other:?}"),
        }
        let restored = Err(io::Error::new(io::ErrorKind::Other, "restore").into());
        assert!(settle(Ok(()), restored).is_err());
        assert!(settle(Ok(()), Ok(())).is_ok());
    }

    #[test]
    fn small_terminal_warning() {
        let (game, mut ui, lang) = setup();
        let text = render(&game, &mut ui, &lang, Instant::now(), Rect::new(0, 0, 50, 20));
        assert!(text.contains("Terminal size too small."));
        assert!(ui.origin.is_none());
    }
}
