/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::pad::Pad;
use crate::sim::state::GameState;
use super::input::pad_key_label;
use super::screen::{Screen, Status};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so
    /// row gaps match cell color on every terminal.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell { ch, fg, bg });
        }
    }

    /// Write a string centered on row y.
    fn put_centered(&mut self, y: usize, s: &str, fg: Color) {
        let len = s.chars().count();
        let x = self.width.saturating_sub(len) / 2;
        self.put_str(x, y, s, fg, Cell::BASE_BG);
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, bg: Color) {
        for row in y..y + h {
            for col in x..x + w {
                self.set(col, row, Cell { ch: ' ', fg: Color::White, bg });
            }
        }
    }
}

// ── Layout ──

const PAD_W: usize = 18;
const PAD_H: usize = 5;
const PAD_GAP: usize = 2;
const GRID_W: usize = PAD_W * 2 + PAD_GAP;
const GRID_H: usize = PAD_H * 2 + 1;

const TITLE_ROW: usize = 0;
const HUD_ROW: usize = 2;
const GRID_ROW: usize = 4;
const STATUS_ROW: usize = GRID_ROW + GRID_H + 1;
const MESSAGE_ROW: usize = STATUS_ROW + 1;
const HELP_ROW: usize = MESSAGE_ROW + 2;

const TEXT: Color = Color::Rgb { r: 220, g: 220, b: 230 };
const DIM_TEXT: Color = Color::Rgb { r: 110, g: 110, b: 130 };
const ACCENT: Color = Color::Rgb { r: 255, g: 215, b: 90 };

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb { r, g, b }
}

/// Resting color of a pad.
fn pad_dim(pad: Pad) -> Color {
    match pad {
        Pad::Blue   => rgb(25, 45, 110),
        Pad::Red    => rgb(110, 25, 25),
        Pad::Green  => rgb(20, 85, 35),
        Pad::Yellow => rgb(110, 95, 15),
    }
}

/// Color of a pad while its highlight is on.
fn pad_lit(pad: Pad) -> Color {
    match pad {
        Pad::Blue   => rgb(95, 155, 255),
        Pad::Red    => rgb(255, 95, 95),
        Pad::Green  => rgb(95, 240, 120),
        Pad::Yellow => rgb(255, 235, 85),
    }
}

fn status_text(screen: &Screen, state: &GameState) -> String {
    match screen.status {
        Status::Welcome => "Press ENTER to start".to_string(),
        Status::Watch => "Watch...".to_string(),
        Status::YourTurn => format!("Your turn  {}/{}", state.cursor, state.sequence.len()),
        Status::GameOver { completed } => {
            format!("Wrong! Reached {completed}. Press ENTER to play again")
        }
    }
}

/// Compose one frame into `fb`.
fn compose(fb: &mut FrameBuffer, screen: &Screen, state: &GameState, gamepad: bool) {
    fb.clear();

    fb.put_centered(TITLE_ROW, "T A P   E C H O", ACCENT);

    let left = fb.width.saturating_sub(GRID_W) / 2;
    let length = format!("Length: {}", screen.shown_length);
    fb.put_str(left, HUD_ROW, &length, TEXT, Cell::BASE_BG);
    let best_x = (left + GRID_W).saturating_sub(screen.best_text.chars().count());
    fb.put_str(best_x, HUD_ROW, &screen.best_text, TEXT, Cell::BASE_BG);

    let label_fg = if state.pads_enabled() { Color::White } else { DIM_TEXT };
    for pad in Pad::ALL {
        let col = pad.index() % 2;
        let row = pad.index() / 2;
        let x = left + col * (PAD_W + PAD_GAP);
        let y = GRID_ROW + row * (PAD_H + 1);
        let bg = if screen.lights.is_lit(pad) { pad_lit(pad) } else { pad_dim(pad) };
        fb.fill_rect(x, y, PAD_W, PAD_H, bg);

        let label = pad_key_label(pad);
        let lx = x + PAD_W.saturating_sub(label.len()) / 2;
        fb.put_str(lx, y + PAD_H / 2, label, label_fg, bg);
    }

    fb.put_centered(STATUS_ROW, &status_text(screen, state), TEXT);
    if !screen.message.is_empty() {
        fb.put_centered(MESSAGE_ROW, &screen.message, ACCENT);
    }

    let help = match (state.start_enabled(), gamepad) {
        (true, true)   => "[ENTER / Start] Start   [ESC / Select] Quit",
        (true, false)  => "[ENTER] Start   [ESC] Quit",
        (false, true)  => "[1-4 / QWAS / face buttons] Press   [ESC / Select] Quit",
        (false, false) => "[1-4 / QWAS] Press   [ESC] Quit",
    };
    fb.put_centered(HELP_ROW, help, DIM_TEXT);
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, screen: &Screen, state: &GameState, gamepad: bool) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            // Force full repaint after resize.
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        compose(&mut self.front, screen, state, gamepad);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the
        // terminal's own default background.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use crate::sim::state::RoundState;

    fn frame(screen: &Screen, state: &GameState) -> FrameBuffer {
        let mut fb = FrameBuffer::new(80, 24);
        compose(&mut fb, screen, state, false);
        fb
    }

    fn row_text(fb: &FrameBuffer, y: usize) -> String {
        (0..fb.width).map(|x| fb.get(x, y).ch).collect::<String>().trim().to_string()
    }

    fn pad_center(fb: &FrameBuffer, pad: Pad) -> Cell {
        let left = fb.width.saturating_sub(GRID_W) / 2;
        let x = left + (pad.index() % 2) * (PAD_W + PAD_GAP) + 1;
        let y = GRID_ROW + (pad.index() / 2) * (PAD_H + 1);
        fb.get(x, y)
    }

    #[test]
    fn lit_pad_uses_bright_color() {
        let mut screen = Screen::new(Duration::from_millis(150), "Personal best: 3".into());
        screen.lights.flash(Pad::Green, Duration::from_millis(150));
        let fb = frame(&screen, &GameState::new(3));
        assert_eq!(pad_center(&fb, Pad::Green).bg, pad_lit(Pad::Green));
        assert_eq!(pad_center(&fb, Pad::Red).bg, pad_dim(Pad::Red));
    }

    #[test]
    fn hud_and_status_rows() {
        let mut screen = Screen::new(Duration::from_millis(150), "Personal best: 3".into());
        screen.shown_length = 2;
        screen.status = Status::YourTurn;
        let state = GameState {
            round: RoundState::AwaitingInput,
            sequence: vec![Pad::Red, Pad::Blue],
            cursor: 1,
            personal_best: 3,
        };
        let fb = frame(&screen, &state);
        let hud = row_text(&fb, HUD_ROW);
        assert!(hud.starts_with("Length: 2"));
        assert!(hud.ends_with("Personal best: 3"));
        assert_eq!(row_text(&fb, STATUS_ROW), "Your turn  1/2");
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let screen = Screen::new(Duration::from_millis(150), "Personal best: 0".into());
        let mut fb = FrameBuffer::new(10, 3);
        compose(&mut fb, &screen, &GameState::new(0), true);
        assert_eq!(fb.cells.len(), 30);
    }
}
