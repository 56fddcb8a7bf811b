use thiserror::Error;

/// Errors raised by the menu itself.
///
/// Failures of the gesture source are not wrapped here; they come back out
/// of [`GestureMenu::poll`](crate::GestureMenu::poll) unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MenuError {
    /// Invalid construction parameters (empty menu, bad window size,
    /// duplicate names, empty option list, default index out of range).
    #[error("menu configuration error: {0}")]
    Configuration(String),

    /// Lookup of an item name that is not in the menu.
    #[error("no menu item named \"{0}\"")]
    InvalidKey(String),
}
