/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` (one glyph per terminal cell)
///   2. Compare each cell with `back` (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This avoids the flicker of clearing and redrawing the whole screen.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Print, ResetColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::Entity;
use crate::ui::surface::GlyphMap;

const BLANK: char = ' ';
/// Never drawn; marks the back buffer stale so every cell is re-emitted.
const INVALID: char = '\0';

// ── FrameBuffer: a 2D grid of glyphs ──

#[derive(Debug)]
pub(crate) struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<char>,
}

impl FrameBuffer {
    pub(crate) fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(BLANK);
    }

    fn invalidate(&mut self) {
        self.cells.fill(INVALID);
    }

    /// Out-of-range writes are dropped.
    pub(crate) fn set(&mut self, x: i32, y: i32, ch: char) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = ch;
        }
    }

    pub(crate) fn get(&self, x: usize, y: usize) -> char {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            BLANK
        }
    }

    /// Paint entities in order, so later ones win a shared cell.
    pub(crate) fn paint(&mut self, entities: &[&Entity], glyphs: &GlyphMap) {
        self.clear();
        for e in entities {
            let p = e.pos();
            self.set(p.x, p.y, glyphs.glyph(e.kind()));
        }
    }

    /// Cells that differ from `prev`, row-major.
    pub(crate) fn diff<'a>(&'a self, prev: &'a FrameBuffer) -> impl Iterator<Item = (usize, usize, char)> + 'a {
        (0..self.height).flat_map(move |y| {
            (0..self.width).filter_map(move |x| {
                let ch = self.get(x, y);
                (ch != prev.get(x, y)).then_some((x, y, ch))
            })
        })
    }
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
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame
        self.back.invalidate();

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

    pub fn render(&mut self, entities: &[&Entity], glyphs: &GlyphMap) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.invalidate();
            queue!(self.writer, Clear(ClearType::All))?;
        }

        self.front.paint(entities, glyphs);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut cursor_at: Option<(usize, usize)> = None;

        for (x, y, ch) in self.front.diff(&self.back) {
            // Consecutive cells on one row need no explicit cursor move
            if cursor_at != Some((x, y)) {
                queue!(self.writer, MoveTo(x as u16, y as u16))?;
            }
            queue!(self.writer, Print(ch))?;
            cursor_at = Some((x + 1, y));
        }

        self.writer.flush()
    }
}
