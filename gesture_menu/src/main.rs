//! Interactive terminal demo of the gesture menu.
//!
//! W/A/S/D stand in for the four swipes; the menu window is printed after
//! every move.

use std::convert::Infallible;
use std::io::{self, Write};

use gesture_menu::{
    GestureCode, GestureMenu, GestureSource, ItemSpec, TextSlots,
    DEFAULT_WINDOW_SIZE,
};

/// Reads one command per poll from stdin.
struct KeyboardSwipes {
    quit: bool,
}

impl GestureSource for KeyboardSwipes {
    type Error = Infallible;

    fn gesture(&mut self) -> Result<GestureCode, Infallible> {
        let line = read_line("  Swipe (w/a/s/d, q to quit): ");
        if line.is_empty() {
            // stdin closed
            self.quit = true;
            return Ok(GestureCode::None);
        }
        let code = match line.trim() {
            "w" | "W" => GestureCode::Up,
            "s" | "S" => GestureCode::Down,
            "a" | "A" => GestureCode::Left,
            "d" | "D" => GestureCode::Right,
            "q" | "Q" => { self.quit = true; GestureCode::None }
            _         => GestureCode::None,
        };
        Ok(code)
    }
}

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              Gesture Menu — keyboard demo            ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let items = [
        ItemSpec::new("Waveform",  ["Sine", "Square", "Saw"], 0),
        ItemSpec::new("LFO",       ["Off", "Tremolo", "Vibrato", "Drone"], 0),
        ItemSpec::new("Chromatic", [false, true], 0),
        ItemSpec::new("Volume",    [25i64, 50, 75, 100], 2),
    ];

    let mut menu = match GestureMenu::from_specs(KeyboardSwipes { quit: false }, &items, DEFAULT_WINDOW_SIZE) {
        Ok(m)  => m,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let mut screen = TextSlots::new(DEFAULT_WINDOW_SIZE);
    menu.refresh(&mut screen);
    print_screen(&screen, menu.focus_offset());

    loop {
        let selection = match menu.poll(&mut screen) {
            Ok(s)      => s,
            Err(never) => match never {},
        };
        if let Some(sel) = selection {
            println!("  → {} is now {}", sel.item, sel.value);
        }
        if menu_wants_quit(&menu) {
            println!("\nGoodbye!\n");
            break;
        }
        print_screen(&screen, menu.focus_offset());
    }
}

fn menu_wants_quit(menu: &GestureMenu<KeyboardSwipes>) -> bool {
    menu.source().quit
}

fn print_screen(screen: &TextSlots, focus: usize) {
    println!("  ┌──────────────────────────────┐");
    for (i, line) in screen.slots().iter().enumerate() {
        let mark = if i == focus { '▶' } else { ' ' };
        println!("  │ {} {:27}│", mark, line);
    }
    println!("  └──────────────────────────────┘");
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
