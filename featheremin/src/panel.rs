//! The front panel: menu lines, two status boxes, and (in the window) the play
//! field the mouse stands in for the hands over.
//!
//! Layout of [`WindowPanel`]:
//!
//! ```text
//! ┌──────────────────────────────┬───────────────────────────────┐
//! │  FEATHEREMIN                 │                               │
//! │    Waveform = Sine           │        PLAY FIELD             │
//! │  > LFO = Off                 │   up/down    → ToF A (pitch)  │
//! │    Chromatic = false         │   left/right → ToF B (LFO)    │
//! │    Volume = 75               │                               │
//! │  ┌──────────┐ ┌──────────┐   │                               │
//! │  │ left     │ │ right    │   │                               │
//! │  └──────────┘ └──────────┘   │                               │
//! │  key legend                                                  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use std::sync::mpsc::Sender;

use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};
use tracing::warn;

use gesture_menu::{clamp_focus_offset, DisplaySink, GestureCode};

use crate::sim::SimRangeSensor;

/// A display that shows the menu plus two status boxes and handles its own
/// input.
pub trait FrontPanel: DisplaySink {
    /// Left status box; `\n` separates lines.
    fn set_left_status(&mut self, text: &str);
    fn set_right_status(&mut self, text: &str);

    /// Process pending input.  Returns false once the panel is closing.
    fn pump(&mut self) -> bool;

    /// Show everything written since the last call.
    fn present(&mut self);
}

// ════════════════════════════════════════════════════════════════════════════
// TextPanel — in-memory
// ════════════════════════════════════════════════════════════════════════════

/// Keeps the text it is given; never closes on its own.
#[derive(Clone, Debug, Default)]
pub struct TextPanel {
    pub slots:    Vec<String>,
    pub left:     String,
    pub right:    String,
    pub presents: usize,
    pub closed:   bool,
}

impl TextPanel {
    pub fn new(slots: usize) -> Self {
        TextPanel { slots: vec![String::new(); slots], ..TextPanel::default() }
    }
}

impl DisplaySink for TextPanel {
    fn slot_count(&self) -> usize { self.slots.len() }

    fn set_slot_text(&mut self, index: usize, text: &str) {
        match self.slots.get_mut(index) {
            Some(slot) => *slot = text.to_string(),
            None       => warn!(index, slots = self.slots.len(), "panel slot out of range"),
        }
    }
}

impl FrontPanel for TextPanel {
    fn set_left_status(&mut self, text: &str)  { self.left  = text.to_string(); }
    fn set_right_status(&mut self, text: &str) { self.right = text.to_string(); }
    fn pump(&mut self) -> bool { !self.closed }
    fn present(&mut self) { self.presents += 1; }
}

// ════════════════════════════════════════════════════════════════════════════
// WindowPanel — minifb
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:     usize = 720;
pub const WIN_H:     usize = 360;
const SCALE:         usize = 2;        // font pixels per glyph pixel
const LINE_H:        usize = 7 * SCALE;
const MENU_X:        usize = 16;
const MENU_Y:        usize = 44;
const MENU_W:        usize = 300;
const SLOT_H:        usize = 24;
const STATUS_W:      usize = 140;
const STATUS_H:      usize = 52;
const FIELD_X:       usize = 340;
const FIELD_Y:       usize = 16;
const FIELD_W:       usize = WIN_W - FIELD_X - 16;
const FIELD_H:       usize = WIN_H - FIELD_Y - 40;
const LEGEND_Y:      usize = WIN_H - 18;
const BG_COLOR:      u32   = 0xFF1A1A2E;
const FIELD_BG:      u32   = 0xFF16213E;
const TEXT_BG:       u32   = 0xFF0F3460;
const TEXT_COLOR:    u32   = 0xFFEEEEEE;
const FOCUS_COLOR:   u32   = 0xFFFFD700;  // gold
const HAND_COLOR:    u32   = 0xFFFFBBAA;

/// Farthest distance the play field reports, top edge for ToF A and right
/// edge for ToF B.
const FIELD_A_MM:    f32   = 1000.0;
const FIELD_B_MM:    f32   = 600.0;

/// The instrument's panel as a desktop window.
///
/// Arrow keys or WASD swipe; the mouse over the play field is the hands;
/// Q or Escape quits.
pub struct WindowPanel {
    window:       Window,
    buf:          Vec<u32>,
    slots:        Vec<String>,
    focus_offset: usize,
    left:         String,
    right:        String,
    hand:         Option<(usize, usize)>,
    swipes:       Sender<GestureCode>,
    tof_a:        SimRangeSensor,
    tof_b:        SimRangeSensor,
}

impl WindowPanel {
    pub fn open(
        slots: usize,
        focus_offset: usize,
        swipes: Sender<GestureCode>,
        tof_a: SimRangeSensor,
        tof_b: SimRangeSensor,
    ) -> Result<Self, minifb::Error> {
        let mut window = Window::new(
            "Featheremin",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(WindowPanel {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            slots: vec![String::new(); slots],
            focus_offset: clamp_focus_offset(focus_offset, slots),
            left: String::new(),
            right: String::new(),
            hand: None,
            swipes,
            tof_a,
            tof_b,
        })
    }

    fn read_keys(&mut self) -> bool {
        let pressed = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if pressed(Key::Q) || pressed(Key::Escape) {
            return false;
        }

        let code = if pressed(Key::Down) || pressed(Key::S) {
            GestureCode::Down
        } else if pressed(Key::Up) || pressed(Key::W) {
            GestureCode::Up
        } else if pressed(Key::Left) || pressed(Key::A) {
            GestureCode::Left
        } else if pressed(Key::Right) || pressed(Key::D) {
            GestureCode::Right
        } else {
            GestureCode::None
        };

        if !code.is_none() {
            // receiver is gone only at shutdown
            let _ = self.swipes.send(code);
        }
        true
    }

    fn read_mouse(&mut self) {
        let pos = self.window.get_mouse_pos(MouseMode::Discard);
        match pos.and_then(|(x, y)| field_ranges(x, y)) {
            Some((a, b)) => {
                self.tof_a.set(a);
                self.tof_b.set(b);
                if let Some((x, y)) = pos {
                    self.hand = Some((x as usize, y as usize));
                }
            }
            None => {
                self.tof_a.clear();
                self.tof_b.clear();
                self.hand = None;
            }
        }
    }

    fn render(&mut self) {
        self.buf.fill(BG_COLOR);

        self.draw_label("FEATHEREMIN", MENU_X, 16, FOCUS_COLOR);

        // ── Menu lines ────────────────────────────────────────────────────
        for i in 0..self.slots.len() {
            let y = MENU_Y + i * SLOT_H;
            let focused = i == self.focus_offset;
            if focused {
                self.fill_rect(MENU_X, y - 4, MENU_W, SLOT_H - 2, TEXT_BG);
                self.draw_label(">", MENU_X + 4, y, FOCUS_COLOR);
            }
            let color = if focused { FOCUS_COLOR } else { TEXT_COLOR };
            let text = self.slots[i].clone();
            self.draw_label(&text, MENU_X + 20, y, color);
        }

        // ── Status boxes ──────────────────────────────────────────────────
        let status_y = MENU_Y + self.slots.len() * SLOT_H + 12;
        let left = self.left.clone();
        let right = self.right.clone();
        self.draw_status(&left,  MENU_X, status_y);
        self.draw_status(&right, MENU_X + STATUS_W + 16, status_y);

        // ── Play field ────────────────────────────────────────────────────
        self.fill_rect(FIELD_X, FIELD_Y, FIELD_W, FIELD_H, FIELD_BG);
        self.draw_border(FIELD_X, FIELD_Y, FIELD_W, FIELD_H, TEXT_BG);
        self.draw_label("PITCH", FIELD_X + 8, FIELD_Y + 8, 0xFF888888);
        self.draw_label("LFO", FIELD_X + FIELD_W - 44, FIELD_Y + FIELD_H - 20, 0xFF888888);
        if let Some((x, y)) = self.hand {
            self.draw_crosshair(x, y, HAND_COLOR);
        }

        // ── Key legend ────────────────────────────────────────────────────
        self.draw_label(
            "arrows/wasd = swipe   mouse = hands   q = quit",
            MENU_X, LEGEND_Y, 0xFF888888,
        );

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    fn draw_status(&mut self, text: &str, x: usize, y: usize) {
        self.fill_rect(x, y, STATUS_W, STATUS_H, TEXT_BG);
        for (i, line) in text.lines().enumerate() {
            self.draw_label(line, x + 6, y + 6 + i * LINE_H, TEXT_COLOR);
        }
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(WIN_H) {
            for col in x..(x+w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for col in x..(x+w).min(WIN_W) {
            self.set_pixel(col, y, color);
            self.set_pixel(col, y + h - 1, color);
        }
        for row in y..(y+h).min(WIN_H) {
            self.set_pixel(x, row, color);
            self.set_pixel(x + w - 1, row, color);
        }
    }

    fn draw_crosshair(&mut self, cx: usize, cy: usize, color: u32) {
        for d in 0..=8 {
            self.set_pixel(cx + d, cy, color);
            self.set_pixel(cx.saturating_sub(d), cy, color);
            self.set_pixel(cx, cy + d, color);
            self.set_pixel(cx, cy.saturating_sub(d), color);
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    /// 3×5 bitmap font drawn at `SCALE`.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        for dy in 0..SCALE {
                            for dx in 0..SCALE {
                                self.set_pixel(cx + col * SCALE + dx, y + row * SCALE + dy, color);
                            }
                        }
                    }
                }
            }
            cx += 4 * SCALE; // 3 wide + 1 gap
            if cx + 4 * SCALE > WIN_W { break; }
        }
    }
}

impl DisplaySink for WindowPanel {
    fn slot_count(&self) -> usize { self.slots.len() }

    fn set_slot_text(&mut self, index: usize, text: &str) {
        match self.slots.get_mut(index) {
            Some(slot) => *slot = text.to_string(),
            None       => warn!(index, slots = self.slots.len(), "panel slot out of range"),
        }
    }
}

impl FrontPanel for WindowPanel {
    fn set_left_status(&mut self, text: &str)  { self.left  = text.to_string(); }
    fn set_right_status(&mut self, text: &str) { self.right = text.to_string(); }

    fn pump(&mut self) -> bool {
        if !self.window.is_open() { return false; }
        if !self.read_keys() { return false; }
        self.read_mouse();
        true
    }

    fn present(&mut self) { self.render(); }
}

/// ToF A and ToF B readings for a mouse position, or `None` off the field.
///
/// The bottom edge of the field is 0 mm for ToF A; the left edge is 0 mm for
/// ToF B.
fn field_ranges(x: f32, y: f32) -> Option<(u16, u16)> {
    let fx = x - FIELD_X as f32;
    let fy = y - FIELD_Y as f32;
    if fx < 0.0 || fy < 0.0 || fx >= FIELD_W as f32 || fy >= FIELD_H as f32 {
        return None;
    }
    let a = (1.0 - fy / FIELD_H as f32) * FIELD_A_MM;
    let b = fx / FIELD_W as f32 * FIELD_B_MM;
    Some((a.round() as u16, b.round() as u16))
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '@' => [0b111, 0b101, 0b111, 0b100, 0b111],
        '>' => [0b100, 0b010, 0b001, 0b010, 0b100],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}
