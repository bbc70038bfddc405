/// Keys the router cares about. Everything else is `Other`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Enter,
    Other,
}

/// User interaction with the input controls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiEvent {
    /// Replace the input field's content (the user typed).
    SetInput(String),
    /// A key was released while the input had focus.
    KeyUp(Key),
    /// The send control was activated.
    Click,
}

/// Single-line text input. Starts empty and focused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputField {
    value: String,
    focused: bool,
}

impl InputField {
    pub fn new() -> Self {
        Self {
            value: String::new(),
            focused: true,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn has_focus(&self) -> bool {
        self.focused
    }
}
