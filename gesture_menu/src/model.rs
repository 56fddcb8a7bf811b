//! The menu model: an ordered list of named items, each holding an ordered
//! list of options and a current selection, plus the focused ("active") item.
//!
//! Every navigation step wraps around, so the model is always live: there is
//! no first/last state to fall off.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MenuError;

// ════════════════════════════════════════════════════════════════════════════
// OptionValue
// ════════════════════════════════════════════════════════════════════════════

/// One selectable value of a menu item.
///
/// The menu never interprets these; it only cycles through them and prints
/// them.  Untagged, so a TOML list such as `[true, false]`, `[25, 50, 75]`
/// or `["Sine", "Saw"]` deserializes directly.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Flag(bool),
    Number(i64),
    Text(String),
}

impl OptionValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            OptionValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            OptionValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            OptionValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Flag(b)   => write!(f, "{}", b),
            OptionValue::Number(n) => write!(f, "{}", n),
            OptionValue::Text(s)   => f.write_str(s),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self { OptionValue::Text(s.to_string()) }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self { OptionValue::Text(s) }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self { OptionValue::Flag(b) }
}

impl From<i64> for OptionValue {
    fn from(n: i64) -> Self { OptionValue::Number(n) }
}

// ════════════════════════════════════════════════════════════════════════════
// ItemSpec — static configuration form of an item
// ════════════════════════════════════════════════════════════════════════════

/// How an item is described in configuration: name, options, and the index
/// of the option selected at startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSpec {
    pub name:    String,
    pub options: Vec<OptionValue>,
    #[serde(default)]
    pub default: usize,
}

impl ItemSpec {
    pub fn new<I, V>(name: &str, options: I, default: usize) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<OptionValue>,
    {
        ItemSpec {
            name:    name.to_string(),
            options: options.into_iter().map(Into::into).collect(),
            default,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MenuItem
// ════════════════════════════════════════════════════════════════════════════

/// A named setting with a non-empty option list and a valid selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuItem {
    name:     String,
    options:  Vec<OptionValue>,
    selected: usize,
}

impl MenuItem {
    pub fn new(name: &str, options: Vec<OptionValue>, selected: usize) -> Result<Self, MenuError> {
        if options.is_empty() {
            return Err(MenuError::Configuration(format!(
                "item \"{}\" has no options", name
            )));
        }
        if selected >= options.len() {
            return Err(MenuError::Configuration(format!(
                "item \"{}\": default option {} out of range (has {} options)",
                name, selected, options.len()
            )));
        }
        Ok(MenuItem { name: name.to_string(), options, selected })
    }

    pub fn from_spec(spec: &ItemSpec) -> Result<Self, MenuError> {
        MenuItem::new(&spec.name, spec.options.clone(), spec.default)
    }

    pub fn name(&self)           -> &str           { &self.name }
    pub fn options(&self)        -> &[OptionValue] { &self.options }
    pub fn selected_index(&self) -> usize          { self.selected }

    /// The currently selected option.
    pub fn selected(&self) -> &OptionValue {
        &self.options[self.selected]
    }

    fn select_next_option(&mut self) {
        self.selected = (self.selected + 1) % self.options.len();
    }

    fn select_prev_option(&mut self) {
        let n = self.options.len();
        self.selected = (self.selected + n - 1) % n;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MenuModel
// ════════════════════════════════════════════════════════════════════════════

/// All menu items in display order, plus which one has focus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuModel {
    items:  Vec<MenuItem>,
    active: usize,
}

impl MenuModel {
    /// Build a model from items; the first item starts active.
    pub fn new(items: Vec<MenuItem>) -> Result<Self, MenuError> {
        if items.is_empty() {
            return Err(MenuError::Configuration("menu has no items".to_string()));
        }
        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(item.name()) {
                return Err(MenuError::Configuration(format!(
                    "duplicate item name \"{}\"", item.name()
                )));
            }
        }
        Ok(MenuModel { items, active: 0 })
    }

    pub fn from_specs(specs: &[ItemSpec]) -> Result<Self, MenuError> {
        let items = specs.iter()
            .map(MenuItem::from_spec)
            .collect::<Result<Vec<_>, _>>()?;
        MenuModel::new(items)
    }

    pub fn len(&self) -> usize { self.items.len() }

    /// Always false for a constructed model; kept for the usual `len` pairing.
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub fn items(&self) -> &[MenuItem] { &self.items }

    /// Item names in menu order.
    pub fn item_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.items.iter().map(MenuItem::name)
    }

    pub fn active_index(&self) -> usize { self.active }

    pub fn active_item(&self) -> &MenuItem { &self.items[self.active] }

    pub fn active_item_name(&self) -> &str { self.active_item().name() }

    /// Selected option of the active item.
    pub fn active_value(&self) -> &OptionValue { self.active_item().selected() }

    /// Selected option of the named item.
    pub fn option_value(&self, name: &str) -> Result<&OptionValue, MenuError> {
        self.find(name).map(MenuItem::selected)
    }

    /// Full option list of the named item.
    pub fn options_for(&self, name: &str) -> Result<&[OptionValue], MenuError> {
        self.find(name).map(MenuItem::options)
    }

    // ── navigation ────────────────────────────────────────────────────────

    /// Focus the next item, wrapping from last to first.
    pub fn select_next_item(&mut self) {
        self.active = (self.active + 1) % self.items.len();
    }

    /// Focus the previous item, wrapping from first to last.
    pub fn select_prev_item(&mut self) {
        let n = self.items.len();
        self.active = (self.active + n - 1) % n;
    }

    /// Advance the active item's selection, wrapping.
    pub fn set_next_option(&mut self) {
        self.items[self.active].select_next_option();
    }

    /// Step the active item's selection back, wrapping.
    pub fn set_prev_option(&mut self) {
        self.items[self.active].select_prev_option();
    }

    fn find(&self, name: &str) -> Result<&MenuItem, MenuError> {
        self.items.iter()
            .find(|item| item.name() == name)
            .ok_or_else(|| MenuError::InvalidKey(name.to_string()))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
