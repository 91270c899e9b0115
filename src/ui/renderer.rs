/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws. The world is a
/// fixed 80x30 cell grid, so one game cell maps to one terminal column and
/// there is no camera; simulation pixels are quantized to cells at draw time.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::config::ThemeConfig;
use crate::domain::player::{PLAYER_H, PLAYER_W};
use crate::domain::tile::{CollectibleKind, TileKind, TILE_SIZE};
use crate::sim::session::{Screen, Session};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 4],
    ch_len: u8,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells.
    ///
    /// On VTE-based Linux terminals the inter-row gap pixels use the
    /// background color from the last Clear or the terminal's configured
    /// default. By using the SAME explicit RGB for both `Clear(ClearType::All)`
    /// and every cell's background, the gap color matches the cell color
    /// exactly, eliminating visible horizontal lines.
    const BASE_BG: Color = Color::Rgb { r: 18, g: 18, b: 32 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
    };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
    };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell gets an
    /// explicit background color (never terminal-default).
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        let len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.ch_len = len;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    fn as_str(&self) -> &str {
        if self.ch_len == 0 {
            return "";
        }
        // ch always holds the utf8 bytes written by encode_utf8
        unsafe { std::str::from_utf8_unchecked(&self.ch[..self.ch_len as usize]) }
    }
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

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell::from_char(ch, fg, bg));
            cx += 1;
        }
    }
}

// ── Renderer ──

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const COL_HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const COL_MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const COL_GOLD: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const COL_GREEN: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const COL_CYAN: Color = Color::Rgb { r: 100, g: 200, b: 255 };
const COL_RED: Color = Color::Rgb { r: 255, g: 60, b: 60 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_screen: Option<Screen>,
    theme: ThemeConfig,
}

impl Renderer {
    pub fn new(theme: ThemeConfig) -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_screen: None,
            theme,
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

    pub fn render(&mut self, session: &Session) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            // Force full repaint after resize.
            self.back.cells.fill(Cell::INVALID);
            queue!(
                self.writer,
                SetBackgroundColor(Cell::BASE_BG),
                Clear(ClearType::All)
            )?;
        }

        // Detect screen change → clear for clean transition
        if self.last_screen != Some(session.screen) {
            self.back.cells.fill(Cell::INVALID);
            queue!(
                self.writer,
                SetBackgroundColor(Cell::BASE_BG),
                Clear(ClearType::All)
            )?;
            self.last_screen = Some(session.screen);
        }

        // Build front buffer
        self.front.clear();

        match session.screen {
            Screen::Loading => self.compose_loading(),
            Screen::Menu => self.compose_menu(session),
            Screen::Playing => self.compose_game(session),
            Screen::Paused => {
                self.compose_game(session);
                self.compose_pause_overlay(session);
            }
            Screen::GameOver => self.compose_game_over(session),
            Screen::LevelComplete => self.compose_level_complete(session),
            Screen::Victory => self.compose_victory(session),
        }

        // Diff and emit
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Set explicit base colors at start of frame.
        // IMPORTANT: Do NOT use ResetColor here — it resets to the terminal's
        // native default, which may differ from BASE_BG and cause line artifacts.
        queue!(
            self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                if cell == prev {
                    need_move = true;
                    continue;
                }

                // Position cursor if needed
                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                // Set colors only if changed
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_game(&mut self, s: &Session) {
        let buf_w = self.front.width;
        let level = &s.level;

        // ── HUD row ──
        let key_status = if s.player.has_key { "⚷ KEY" } else { "" };
        let hud = format!(
            " Level {:<2}  Score:{:<7}  ♥×{}  ◈ {}/{}  {} ",
            level.number,
            s.state.score,
            s.state.lives,
            level.collected_count(),
            level.total_collectibles,
            key_status,
        );
        for x in 0..buf_w {
            self.front
                .set(x, HUD_ROW, Cell::from_char(' ', Color::White, COL_HUD_BG));
        }
        self.front.put_str(0, HUD_ROW, &hud, Color::White, COL_HUD_BG);

        // ── Static tiles ──
        for gy in 0..level.height {
            let row = MAP_ROW + gy;
            if row >= self.front.height {
                break;
            }
            for gx in 0..level.width.min(buf_w) {
                let (ch, fg, bg) = self.tile_visual(level.tile_at(gx, gy));
                self.front.set(gx, row, Cell::from_char(ch, fg, bg));
            }
        }

        // ── Collectibles (uncollected only) ──
        for c in &level.collectibles {
            if c.collected {
                continue;
            }
            let (ch, fg) = match c.kind {
                CollectibleKind::Coin => (self.theme.coin, COL_GOLD),
                CollectibleKind::Trophy => (self.theme.trophy, COL_GOLD),
                CollectibleKind::Gem => (self.theme.gem, COL_CYAN),
                CollectibleKind::Key => (self.theme.key, Color::Rgb { r: 255, g: 180, b: 80 }),
                CollectibleKind::Princess => (self.theme.princess, Color::Rgb { r: 255, g: 130, b: 200 }),
            };
            self.put_at_px(c.bounds.x, c.bounds.y, ch, fg, Color::Reset);
        }

        // ── Moving bodies ──
        for plat in &level.platforms {
            let col = (plat.pos.x / TILE_SIZE).round() as usize;
            let row = MAP_ROW + (plat.pos.y / TILE_SIZE).round() as usize;
            let cells = (plat.w / TILE_SIZE).round().max(1.0) as usize;
            for i in 0..cells {
                if row < self.front.height && col + i < buf_w {
                    self.front.set(
                        col + i,
                        row,
                        Cell::from_char(self.theme.platform, Color::Rgb { r: 180, g: 180, b: 190 }, Color::Reset),
                    );
                }
            }
        }
        for enemy in &level.enemies {
            self.put_at_px(enemy.pos.x, enemy.pos.y, self.theme.enemy, COL_RED, Color::Reset);
        }

        // ── Player (16x24 px = 1 col, spans up to 2 rows) ──
        if s.player.is_alive {
            let px = s.player.position.x + PLAYER_W / 2.0;
            let col = (px / TILE_SIZE) as usize;
            let head_row = (s.player.position.y / TILE_SIZE).floor().max(0.0) as usize;
            let feet_row =
                ((s.player.position.y + PLAYER_H - 1.0) / TILE_SIZE).floor().max(0.0) as usize;
            let fg = Color::Rgb { r: 255, g: 240, b: 120 };
            self.front
                .set(col, MAP_ROW + head_row, Cell::from_char('@', fg, Cell::BASE_BG));
            if feet_row != head_row {
                self.front
                    .set(col, MAP_ROW + feet_row, Cell::from_char('▙', fg, Cell::BASE_BG));
            }
        }

        // ── Message bar ──
        let msg_row = MAP_ROW + level.height + 1;
        if msg_row < self.front.height && !s.message.is_empty() {
            let msg = format!(" ◈ {} ", s.message);
            for x in 0..buf_w {
                self.front
                    .set(x, msg_row, Cell::from_char(' ', Color::Black, COL_MSG_BG));
            }
            self.front.put_str(0, msg_row, &msg, Color::Black, COL_MSG_BG);
        }

        // ── Help bar ──
        let help_row = MAP_ROW + level.height + 3;
        if help_row < self.front.height {
            let help = " ←→/AD:Move  ↑↓/WS:Climb  SPACE:Jump  P/F1:Pause  Q:Quit";
            self.front
                .put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
        }
    }

    fn tile_visual(&self, kind: TileKind) -> (char, Color, Color) {
        match kind {
            TileKind::Empty => (' ', Color::Reset, Color::Reset),
            TileKind::Ground => (
                self.theme.ground,
                Color::Rgb { r: 150, g: 100, b: 55 },
                Color::Rgb { r: 90, g: 60, b: 30 },
            ),
            TileKind::Platform | TileKind::Wall => (
                self.theme.wall,
                Color::Rgb { r: 120, g: 120, b: 120 },
                Color::Rgb { r: 70, g: 70, b: 70 },
            ),
            TileKind::Ladder => (self.theme.ladder, COL_CYAN, Color::Reset),
            TileKind::Spikes => (self.theme.spikes, COL_RED, Color::Reset),
            TileKind::Door => (self.theme.door, COL_GOLD, Color::Rgb { r: 60, g: 45, b: 0 }),
            TileKind::LockedDoor => (
                self.theme.locked_door,
                Color::Rgb { r: 160, g: 160, b: 170 },
                Color::Rgb { r: 60, g: 60, b: 70 },
            ),
            // Collectibles live in their own list; a stray kind draws blank
            TileKind::Trophy | TileKind::Coin => (' ', Color::Reset, Color::Reset),
        }
    }

    /// Quantize a pixel position to its map cell and draw one glyph there.
    fn put_at_px(&mut self, x: f32, y: f32, ch: char, fg: Color, bg: Color) {
        let col = (x / TILE_SIZE).floor().max(0.0) as usize;
        let row = MAP_ROW + (y / TILE_SIZE).floor().max(0.0) as usize;
        self.front.set(col, row, Cell::from_char(ch, fg, bg));
    }

    // ── Static screens ──

    fn compose_loading(&mut self) {
        let msg = "Loading...";
        let cx = self.front.width.saturating_sub(msg.len()) / 2;
        let cy = self.front.height / 2;
        self.front.put_str(cx, cy, msg, Color::DarkGrey, Color::Reset);
    }

    fn compose_menu(&mut self, s: &Session) {
        let title = [
            r"   ___  ___  __  __   ___  _   _  _  _  _  _  ___  ___ ",
            r"  / __|| __||  \/  | | _ \| | | || \| || \| || __|| _ \",
            r" | (_ || _| | |\/| | |   /| |_| || .` || .` || _| |   /",
            r"  \___||___||_|  |_| |_|_\ \___/ |_|\_||_|\_||___||_|_\",
        ];

        for (i, line) in title.iter().enumerate() {
            self.front.put_str(2, 2 + i, line, COL_GOLD, Color::Reset);
        }

        let subtitle = "◆◆  Collect them all. Reach the door.  ◆◆";
        let sx = 2 + (title[1].len().saturating_sub(subtitle.chars().count())) / 2;
        self.front.put_str(sx, 7, subtitle, COL_GREEN, Color::Reset);

        let tagline = "━━━ Terminal Edition (Rust) ━━━";
        let tx = 2 + (title[1].len().saturating_sub(tagline.chars().count())) / 2;
        self.front
            .put_str(tx, 9, tagline, Color::Rgb { r: 180, g: 140, b: 50 }, Color::Reset);

        // Menu options
        let menu_base = 12;
        self.front
            .put_str(8, menu_base, "SPACE   Start Game", COL_GREEN, Color::Reset);
        self.front
            .put_str(8, menu_base + 1, "  Q     Quit", Color::White, Color::Reset);

        // Controls reference
        let help = [
            "Controls",
            "  ←→ / AD       Move          ↑↓ / WS  Climb",
            "  SPACE / K     Jump          X / J    Shoot",
            "  P / F1 Pause                Q        Quit",
        ];

        let help_base = menu_base + 4;
        for (i, line) in help.iter().enumerate() {
            let color = if i == 0 { COL_GOLD } else { Color::White };
            self.front.put_str(8, help_base + i, line, color, Color::Reset);
        }

        if !s.message.is_empty() {
            let msg_row = self.front.height.saturating_sub(1);
            let msg = format!(" ◈ {} ", s.message);
            self.front.put_str(0, msg_row, &msg, Color::Black, COL_MSG_BG);
        }
    }

    fn compose_game_over(&mut self, s: &Session) {
        let box_art = [
            "╔═══════════════════════════════╗",
            "║       ✕  GAME  OVER  ✕        ║",
            "╚═══════════════════════════════╝",
        ];
        for (i, l) in box_art.iter().enumerate() {
            self.front.put_str(6, 4 + i, l, COL_RED, Color::Reset);
        }
        let score = format!("◈ Final Score: {}", s.state.score);
        let level = format!("◈ Reached Level: {}", s.state.current_level);
        self.front.put_str(8, 9, &score, Color::White, Color::Reset);
        self.front.put_str(8, 10, &level, Color::White, Color::Reset);
        self.front
            .put_str(8, 12, "▸ SPACE: Retry this level", COL_GREEN, Color::Reset);
        self.front
            .put_str(8, 13, "▸ Q:     Quit", Color::DarkGrey, Color::Reset);
    }

    fn compose_level_complete(&mut self, s: &Session) {
        let box_art = [
            "╔═══════════════════════════════╗",
            "║      ★  LEVEL COMPLETE  ★     ║",
            "╚═══════════════════════════════╝",
        ];
        for (i, l) in box_art.iter().enumerate() {
            self.front.put_str(6, 4 + i, l, COL_GOLD, Color::Reset);
        }
        let score = format!("◈ Score: {}", s.state.score);
        let lives = format!("◈ Lives left: {}", s.state.lives);
        self.front.put_str(8, 9, &score, Color::White, Color::Reset);
        self.front.put_str(8, 10, &lives, Color::White, Color::Reset);
        self.front
            .put_str(8, 12, "▸ SPACE: Next level", COL_GREEN, Color::Reset);
    }

    fn compose_victory(&mut self, s: &Session) {
        let box_art = [
            "╔═══════════════════════════════════════╗",
            "║   ★  ALL LEVELS CLEARED! VICTORY!  ★  ║",
            "╚═══════════════════════════════════════╝",
        ];
        for (i, l) in box_art.iter().enumerate() {
            self.front.put_str(4, 4 + i, l, COL_GOLD, Color::Reset);
        }
        let score = format!("◈ Final Score: {}", s.state.score);
        self.front.put_str(6, 9, &score, Color::White, Color::Reset);
        self.front
            .put_str(6, 11, "▸ SPACE: Back to Menu", COL_GREEN, Color::Reset);
    }

    fn compose_pause_overlay(&mut self, s: &Session) {
        let dim = Color::Rgb { r: 40, g: 40, b: 40 };
        let blink = (s.anim_tick / 8) % 2 == 0;

        let view_cols = s.level.width.min(self.front.width);
        let view_rows = s.level.height;
        let box_w = 30_usize.min(view_cols);
        let box_h = 8_usize.min(view_rows);
        let box_x = view_cols.saturating_sub(box_w) / 2;
        let box_y = MAP_ROW + view_rows.saturating_sub(box_h) / 2;

        // Dark background box over the frozen game frame
        for y in box_y..box_y + box_h {
            for x in box_x..box_x + box_w {
                self.front.set(x, y, Cell::from_char(' ', Color::Reset, dim));
            }
        }

        let pause_label = if blink { "║  ▶  PAUSED  ◀  ║" } else { "║     PAUSED     ║" };
        let bx = box_x + box_w.saturating_sub(18) / 2;
        self.front.put_str(bx, box_y + 1, "╔════════════════╗", COL_GOLD, dim);
        self.front.put_str(bx, box_y + 2, pause_label, COL_GOLD, dim);
        self.front.put_str(bx, box_y + 3, "╚════════════════╝", COL_GOLD, dim);
        self.front
            .put_str(box_x + 2, box_y + 5, "P/F1  Resume", COL_CYAN, dim);
        self.front
            .put_str(box_x + 2, box_y + 6, "Q     Quit", COL_CYAN, dim);
    }
}
