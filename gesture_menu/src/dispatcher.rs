//! The gesture dispatcher: one swipe in, one model mutation and one redraw
//! out.
//!
//! Only option changes are reported to the caller.  Moving the focus is
//! purely navigational; it is visible on the display but `poll` still
//! answers `None`.
//!
//! | Swipe | Model operation | Reported |
//! |---|---|---|
//! | Down  | `select_next_item` | no |
//! | Up    | `select_prev_item` | no |
//! | Left  | `set_prev_option`  | yes |
//! | Right | `set_next_option`  | yes |

use tracing::{debug, trace};

use crate::error::MenuError;
use crate::gesture::{DisplaySink, GestureCode, GestureSource};
use crate::model::{ItemSpec, MenuItem, MenuModel, OptionValue};

/// Window size used when the caller has no preference.
pub const DEFAULT_WINDOW_SIZE: usize = 3;

/// Slot in which the focused item is drawn, when the window is big enough.
pub const DEFAULT_FOCUS_OFFSET: usize = 1;

/// The slot a focus offset lands in for a window of `lines` slots.
///
/// Offsets past the end of the window are pulled back to its last slot.
pub fn clamp_focus_offset(offset: usize, lines: usize) -> usize {
    offset.min(lines.saturating_sub(1))
}

// ════════════════════════════════════════════════════════════════════════════
// Selection
// ════════════════════════════════════════════════════════════════════════════

/// An item whose option just changed, with its new value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub item:  String,
    pub value: OptionValue,
}

// ════════════════════════════════════════════════════════════════════════════
// GestureMenu
// ════════════════════════════════════════════════════════════════════════════

/// A menu driven by a [`GestureSource`] and drawn into a [`DisplaySink`].
///
/// The menu owns its model and its gesture source.  The display is lent to
/// each drawing call, since the rest of the application usually writes to
/// other parts of the same screen.
pub struct GestureMenu<G> {
    model:        MenuModel,
    source:       G,
    window_size:  usize,
    focus_offset: usize,
}

impl<G: GestureSource> GestureMenu<G> {
    /// Wrap `model`, showing `window_size` items at a time.
    ///
    /// Fails unless `1 <= window_size <= model.len()`.
    pub fn new(source: G, model: MenuModel, window_size: usize) -> Result<Self, MenuError> {
        if window_size == 0 {
            return Err(MenuError::Configuration("window size must be at least 1".to_string()));
        }
        if window_size > model.len() {
            return Err(MenuError::Configuration(format!(
                "window size {} exceeds item count {}",
                window_size, model.len()
            )));
        }
        debug!(items = model.len(), window_size, "gesture menu ready");
        Ok(GestureMenu {
            model,
            source,
            window_size,
            focus_offset: clamp_focus_offset(DEFAULT_FOCUS_OFFSET, window_size),
        })
    }

    pub fn from_specs(source: G, specs: &[ItemSpec], window_size: usize) -> Result<Self, MenuError> {
        GestureMenu::new(source, MenuModel::from_specs(specs)?, window_size)
    }

    /// Draw the focused item in slot `offset` instead of the default.
    ///
    /// Offsets past the end of the window are pulled back to its last slot.
    pub fn with_focus_offset(mut self, offset: usize) -> Self {
        self.focus_offset = clamp_focus_offset(offset, self.window_size);
        self
    }

    pub fn model(&self)       -> &MenuModel { &self.model }
    pub fn source(&self)      -> &G         { &self.source }
    pub fn source_mut(&mut self) -> &mut G  { &mut self.source }
    pub fn window_size(&self) -> usize      { self.window_size }

    /// The slot the focused item is drawn in.
    pub fn focus_offset(&self) -> usize { self.focus_offset }

    /// Fail unless `display` has a slot for every line of the window.
    pub fn check_display<D: DisplaySink + ?Sized>(&self, display: &D) -> Result<(), MenuError> {
        let slots = display.slot_count();
        if slots < self.window_size {
            return Err(MenuError::Configuration(format!(
                "window size {} needs {} display slots, display has {}",
                self.window_size, self.window_size, slots
            )));
        }
        Ok(())
    }

    /// The focused item and its current value.
    pub fn selection(&self) -> Selection {
        Selection {
            item:  self.model.active_item_name().to_string(),
            value: self.model.active_value().clone(),
        }
    }

    /// Current value of the named item.
    pub fn option_value(&self, name: &str) -> Result<&OptionValue, MenuError> {
        self.model.option_value(name)
    }

    /// Look for a swipe and apply it.
    ///
    /// Returns `Some(selection)` only when an option value changed.  When the
    /// source reports nothing, neither the model nor the display is touched.
    /// Source errors are returned as-is, before anything is mutated.
    pub fn poll<D: DisplaySink + ?Sized>(
        &mut self,
        display: &mut D,
    ) -> Result<Option<Selection>, G::Error> {
        let code = self.source.gesture()?;

        let option_changed = match code {
            GestureCode::None  => return Ok(None),
            GestureCode::Down  => { self.model.select_next_item(); false }
            GestureCode::Up    => { self.model.select_prev_item(); false }
            GestureCode::Left  => { self.model.set_prev_option();  true  }
            GestureCode::Right => { self.model.set_next_option();  true  }
        };

        trace!(
            ?code,
            item = self.model.active_item_name(),
            value = %self.model.active_value(),
            "gesture applied"
        );

        self.refresh(display);

        if option_changed {
            Ok(Some(self.selection()))
        } else {
            Ok(None)
        }
    }

    /// The items currently visible, in slot order.
    ///
    /// The window wraps around the end of the item list and keeps the focused
    /// item at [`focus_offset`](Self::focus_offset).
    pub fn window(&self) -> Vec<&MenuItem> {
        self.visible(self.window_size)
    }

    /// Push the visible window to the display as `"{item} = {value}"` lines.
    ///
    /// A display with fewer slots than the window gets a shorter window that
    /// still holds the focused item.
    pub fn refresh<D: DisplaySink + ?Sized>(&self, display: &mut D) {
        let slots = display.slot_count();
        if slots < self.window_size {
            trace!(slots, window_size = self.window_size, "window cut to display");
        }
        for (slot, item) in self.visible(slots).into_iter().enumerate() {
            display.set_slot_text(slot, &format!("{} = {}", item.name(), item.selected()));
        }
    }

    fn visible(&self, lines: usize) -> Vec<&MenuItem> {
        let items = self.model.items();
        let n = items.len();
        let lines = lines.min(self.window_size);
        let offset = clamp_focus_offset(self.focus_offset, lines);
        let start = (self.model.active_index() + n - offset) % n;
        (0..lines)
            .map(|k| &items[(start + k) % n])
            .collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{ScriptedGestures, TextSlots};
    use proptest::prelude::*;

    fn wave_lfo() -> Vec<ItemSpec> {
        vec![
            ItemSpec::new("Wave", ["Sine", "Square", "Saw"], 0),
            ItemSpec::new("LFO",  ["Off", "Trem", "Vib"], 0),
        ]
    }

    fn five_items() -> Vec<ItemSpec> {
        vec![
            ItemSpec::new("Waveform",  ["Sine", "Square", "Saw"], 0),
            ItemSpec::new("LFO",       ["Off", "Tremolo", "Vibrato", "Drone"], 0),
            ItemSpec::new("Chromatic", [false, true], 0),
            ItemSpec::new("Bogus 1",   ["A", "B", "C"], 0),
            ItemSpec::new("Bogus 2",   ["A", "B", "C"], 1),
        ]
    }

    fn menu(codes: &[u8], specs: &[ItemSpec], w: usize) -> GestureMenu<ScriptedGestures> {
        GestureMenu::from_specs(ScriptedGestures::from_raw(codes), specs, w).unwrap()
    }

    /// A source whose sensor has gone away.
    struct Unplugged;

    impl GestureSource for Unplugged {
        type Error = String;
        fn gesture(&mut self) -> Result<GestureCode, String> {
            Err("i2c: no ack".to_string())
        }
    }

    #[test]
    fn wave_lfo_walkthrough() {
        // RIGHT, DOWN, LEFT with the focused item leading a 2-slot window
        let mut m = menu(&[4, 1, 3], &wave_lfo(), 2).with_focus_offset(0);
        let mut d = TextSlots::new(2);
        assert_eq!(m.model().active_item_name(), "Wave");
        assert_eq!(m.model().active_value(), &OptionValue::from("Sine"));

        let got = m.poll(&mut d).unwrap();
        assert_eq!(got, Some(Selection { item: "Wave".into(), value: "Square".into() }));
        assert_eq!(d.slots(), ["Wave = Square", "LFO = Off"]);

        let got = m.poll(&mut d).unwrap();
        assert_eq!(got, None);
        assert_eq!(m.model().active_item_name(), "LFO");
        assert_eq!(d.slots(), ["LFO = Off", "Wave = Square"]);

        let got = m.poll(&mut d).unwrap();
        assert_eq!(got, Some(Selection { item: "LFO".into(), value: "Vib".into() }));
    }

    #[test]
    fn default_layout_puts_focus_in_second_slot() {
        let m = menu(&[], &five_items(), 4);
        let mut d = TextSlots::new(4);
        m.refresh(&mut d);
        assert_eq!(d.slots(), [
            "Bogus 2 = B",
            "Waveform = Sine",
            "LFO = Off",
            "Chromatic = false",
        ]);
    }

    #[test]
    fn window_wraps_past_the_end() {
        let mut m = menu(&[2], &five_items(), 3);
        let mut d = TextSlots::new(3);
        m.poll(&mut d).unwrap();
        assert_eq!(m.model().active_item_name(), "Bogus 2");
        assert_eq!(d.slots(), ["Bogus 1 = A", "Bogus 2 = B", "Waveform = Sine"]);
    }

    #[test]
    fn none_touches_nothing() {
        let mut m = menu(&[0], &five_items(), 3);
        let before = m.model().clone();
        let mut d = TextSlots::new(3);
        assert_eq!(m.poll(&mut d).unwrap(), None);
        assert_eq!(d.writes(), 0);
        assert_eq!(m.model(), &before);
    }

    #[test]
    fn unrecognised_code_is_ignored() {
        let mut m = menu(&[9], &five_items(), 3);
        let mut d = TextSlots::new(3);
        assert_eq!(m.poll(&mut d).unwrap(), None);
        assert_eq!(d.writes(), 0);
    }

    #[test]
    fn focus_moves_redraw_but_report_nothing() {
        let mut m = menu(&[1, 2], &five_items(), 3);
        let mut d = TextSlots::new(3);
        assert_eq!(m.poll(&mut d).unwrap(), None);
        assert_eq!(d.writes(), 3);
        assert_eq!(d.slots()[1], "LFO = Off");
        assert_eq!(m.poll(&mut d).unwrap(), None);
        assert_eq!(d.writes(), 6);
        assert_eq!(d.slots()[1], "Waveform = Sine");
    }

    #[test]
    fn option_flag_is_not_latched() {
        // RIGHT reports; the following DOWN must not
        let mut m = menu(&[4, 1], &five_items(), 3);
        let mut d = TextSlots::new(3);
        assert!(m.poll(&mut d).unwrap().is_some());
        assert!(m.poll(&mut d).unwrap().is_none());
        assert!(m.poll(&mut d).unwrap().is_none());
    }

    #[test]
    fn left_reports_bool_options() {
        let mut m = menu(&[1, 1, 3], &five_items(), 3);
        let mut d = TextSlots::new(3);
        m.poll(&mut d).unwrap();
        m.poll(&mut d).unwrap();
        let sel = m.poll(&mut d).unwrap().unwrap();
        assert_eq!(sel.item, "Chromatic");
        assert_eq!(sel.value, OptionValue::Flag(true));
        assert_eq!(m.option_value("Chromatic").unwrap(), &OptionValue::Flag(true));
    }

    #[test]
    fn source_errors_propagate_without_mutation() {
        let mut m = GestureMenu::from_specs(Unplugged, &five_items(), 3).unwrap();
        let before = m.model().clone();
        let mut d = TextSlots::new(3);
        assert_eq!(m.poll(&mut d), Err("i2c: no ack".to_string()));
        assert_eq!(m.model(), &before);
        assert_eq!(d.writes(), 0);
    }

    #[test]
    fn focus_offset_is_clamped_to_window() {
        let m = menu(&[], &five_items(), 1);
        assert_eq!(m.focus_offset(), 0);
        let m = menu(&[], &five_items(), 3).with_focus_offset(7);
        assert_eq!(m.focus_offset(), 2);
    }

    #[test]
    fn focus_offset_is_stored_clamped() {
        let m = menu(&[], &five_items(), 2).with_focus_offset(9);
        assert_eq!(m.focus_offset(), clamp_focus_offset(9, 2));
        assert_eq!(clamp_focus_offset(1, 0), 0);
    }

    #[test]
    fn narrow_display_still_shows_focused_item() {
        let specs = [
            ItemSpec::new("A", ["x", "y"], 0),
            ItemSpec::new("B", ["x", "y"], 0),
            ItemSpec::new("C", ["x", "y"], 0),
            ItemSpec::new("D", ["x", "y"], 0),
        ];
        let mut m = menu(&[1], &specs, 4);
        let mut d = TextSlots::new(1);
        assert!(matches!(m.check_display(&d), Err(MenuError::Configuration(_))));

        assert_eq!(m.poll(&mut d).unwrap(), None);
        assert_eq!(m.model().active_item_name(), "B");
        assert_eq!(d.slots(), ["B = x"]);
        assert_eq!(d.writes(), 1);
    }

    #[test]
    fn matching_display_passes_the_check() {
        let m = menu(&[], &five_items(), 3);
        assert!(m.check_display(&TextSlots::new(3)).is_ok());
        assert!(m.check_display(&TextSlots::new(5)).is_ok());
    }

    #[test]
    fn zero_window_is_rejected() {
        let r = GestureMenu::from_specs(ScriptedGestures::default(), &five_items(), 0);
        assert!(matches!(r, Err(MenuError::Configuration(_))));
    }

    #[test]
    fn window_larger_than_menu_is_rejected() {
        let r = GestureMenu::from_specs(ScriptedGestures::default(), &wave_lfo(), 3);
        assert!(matches!(r, Err(MenuError::Configuration(_))));
    }

    #[test]
    fn empty_menu_is_rejected() {
        let r = GestureMenu::from_specs(ScriptedGestures::default(), &[], 1);
        assert!(matches!(r, Err(MenuError::Configuration(_))));
    }

    fn menu_and_window() -> impl Strategy<Value = (usize, usize, usize)> {
        (1usize..8).prop_flat_map(|n| (Just(n), 1..=n, 0..n))
    }

    proptest! {
        #[test]
        fn focused_item_sits_at_the_offset(
            (n, w, offset) in menu_and_window(),
            codes in prop::collection::vec(0u8..6, 0..40),
        ) {
            let specs: Vec<ItemSpec> = (0..n)
                .map(|i| ItemSpec::new(&format!("item{}", i), ["a", "b", "c"], 0))
                .collect();
            let mut m = GestureMenu::from_specs(ScriptedGestures::from_raw(&codes), &specs, w)
                .unwrap()
                .with_focus_offset(offset);
            let at = m.focus_offset();
            let mut d = TextSlots::new(w);

            for &raw in &codes {
                let writes = d.writes();
                let sel = m.poll(&mut d).unwrap();
                let code = GestureCode::from_raw(raw);

                prop_assert_eq!(sel.is_some(), matches!(code, GestureCode::Left | GestureCode::Right));
                if code.is_none() {
                    prop_assert_eq!(d.writes(), writes);
                } else {
                    prop_assert_eq!(d.writes(), writes + w);
                    let prefix = format!("{} = ", m.model().active_item_name());
                    prop_assert!(d.slots()[at].starts_with(&prefix));
                }
            }
        }
    }
}
