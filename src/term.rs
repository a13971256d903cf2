use std::collections::HashMap;
use std::io::{stdout, Stdout, Write};

use crossterm::event::{read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, terminal};
use log::debug;

use crate::error::Result;
use crate::geometry::{Direction, Point, ScreenSize};
use crate::scene::{Canvas, Sprite};

const SNAKE_COLOR: Color = Color::Green;
const FOOD_COLOR: Color = Color::Red;

// Terminal characters are roughly twice as tall as they are wide
const CELL_WIDTH: u16 = 2;

/// What the control loop reacts to, already stripped of terminal details.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Turn(Direction),
    Quit,
    Interrupt,
    Resize(u16, u16),
    Fatal(String),
}

pub fn setup() -> Result<()> {
    execute!(stdout(), EnterAlternateScreen, cursor::Hide, cursor::DisableBlinking)?;
    terminal::enable_raw_mode()?;
    Ok(())
}

pub fn restore() -> Result<()> {
    terminal::disable_raw_mode()?;
    execute!(stdout(), ResetColor, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)?;
    Ok(())
}

/// Grid size in cells, which is the terminal size with the width halved.
pub fn grid_size() -> Result<ScreenSize> {
    let (width, height) = terminal::size()?;
    Ok(ScreenSize::new((width / CELL_WIDTH) as i32, height as i32))
}

/// Blocks until the terminal reports something, and translates it.
/// Events the game does not care about come back as `None`.
pub fn read_event() -> Option<InputEvent> {
    match read() {
        Ok(ev) => observe(ev),
        Err(e) => Some(InputEvent::Fatal(e.to_string())),
    }
}

/// Traces the raw event, ignored ones included, then translates it.
pub fn observe(ev: Event) -> Option<InputEvent> {
    debug!("have terminal event: {:?}", ev);
    translate(ev)
}

pub fn translate(ev: Event) -> Option<InputEvent> {
    match ev {
        Event::Key(KeyEvent { code, modifiers }) if modifiers.contains(KeyModifiers::CONTROL) => match code {
            KeyCode::Char('c') | KeyCode::Char('z') => Some(InputEvent::Interrupt),
            _ => None,
        },
        Event::Key(KeyEvent { code, modifiers: _ }) => match code {
            KeyCode::Char('w') | KeyCode::Up => Some(InputEvent::Turn(Direction::Up)),
            KeyCode::Char('a') | KeyCode::Left => Some(InputEvent::Turn(Direction::Left)),
            KeyCode::Char('s') | KeyCode::Down => Some(InputEvent::Turn(Direction::Down)),
            KeyCode::Char('d') | KeyCode::Right => Some(InputEvent::Turn(Direction::Right)),
            KeyCode::Char('q') | KeyCode::Esc => Some(InputEvent::Quit),
            _ => None,
        },
        Event::Resize(w, h) => Some(InputEvent::Resize(w, h)),
        _ => None,
    }
}

/// Crossterm-backed canvas.
///
/// Cells are kept in a back buffer and only written out on `present`, so a
/// frame that is cleared but never presented leaves the previous one on screen.
/// Only cells that differ from the last presented frame are reprinted.
pub struct TermCanvas {
    stdout: Stdout,
    frame: HashMap<Point, Sprite>,
    shown: HashMap<Point, Sprite>,
    wiped: bool,
}

impl TermCanvas {
    pub fn new() -> Self {
        TermCanvas { stdout: stdout(), frame: HashMap::new(), shown: HashMap::new(), wiped: false }
    }
}

impl Default for TermCanvas {
    fn default() -> Self {
        Self::new()
    }
}

/// Cells to repaint to turn `shown` into `next`. `None` means blank the cell.
pub fn frame_diff(shown: &HashMap<Point, Sprite>, next: &HashMap<Point, Sprite>) -> Vec<(Point, Option<Sprite>)> {
    let erased = shown.keys().filter(|&pos| !next.contains_key(pos)).map(|&pos| (pos, None));
    let painted = next
        .iter()
        .filter(|&(pos, sprite)| shown.get(pos) != Some(sprite))
        .map(|(&pos, &sprite)| (pos, Some(sprite)));

    erased.chain(painted).collect()
}

impl Canvas for TermCanvas {
    fn clear(&mut self) -> Result<()> {
        self.frame.clear();
        Ok(())
    }

    fn draw_cell(&mut self, pos: Point, sprite: Sprite) -> Result<()> {
        self.frame.insert(pos, sprite);
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        // Whatever was on the terminal before the first frame goes once
        if !self.wiped {
            queue!(self.stdout, ResetColor, terminal::Clear(ClearType::All))?;
            self.wiped = true;
        }

        for (pos, sprite) in frame_diff(&self.shown, &self.frame) {
            // Cells the scene hands over are inside the grid
            let (x, y) = (pos.x as u16 * CELL_WIDTH, pos.y as u16);
            queue!(self.stdout, cursor::MoveTo(x, y))?;
            match sprite {
                Some(Sprite::Snake) => queue!(self.stdout, SetBackgroundColor(SNAKE_COLOR))?,
                Some(Sprite::Food) => queue!(self.stdout, SetBackgroundColor(FOOD_COLOR))?,
                None => queue!(self.stdout, ResetColor)?,
            }
            queue!(self.stdout, Print("  "))?;
        }

        queue!(self.stdout, ResetColor)?;
        self.stdout.flush()?;
        self.shown = self.frame.clone();
        Ok(())
    }
}
