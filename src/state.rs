//! Value types stored by `#[loadable_state]`.

/// Progress of an asynchronous load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LoadingState {
    /// Nothing has been requested yet.
    #[default]
    None,
    Loading,
    Loaded,
    /// The load failed with the given message.
    Failed(String),
}

impl LoadingState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadingState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// An alert to present, with buttons that send actions of type `A`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlertState<A> {
    pub title: String,
    pub message: Option<String>,
    pub buttons: Vec<AlertButton<A>>,
}

impl<A> AlertState<A> {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: None,
            buttons: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_button(mut self, button: AlertButton<A>) -> Self {
        self.buttons.push(button);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlertButton<A> {
    pub label: String,
    /// Sent when the button is tapped. `None` only dismisses the alert.
    pub action: Option<A>,
}

impl<A> AlertButton<A> {
    pub fn new(label: impl Into<String>, action: Option<A>) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }

    pub fn cancel(label: impl Into<String>) -> Self {
        Self::new(label, None)
    }
}

/// Optional presented value. The wrapped value is the presented `T` itself, the wrapper is the
/// projected value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PresentationState<T>(Option<T>);

impl<T> PresentationState<T> {
    pub const fn new(value: Option<T>) -> Self {
        Self(value)
    }

    pub const fn none() -> Self {
        Self(None)
    }

    pub fn wrapped_value(&self) -> Option<&T> {
        self.0.as_ref()
    }

    pub fn wrapped_value_mut(&mut self) -> &mut Option<T> {
        &mut self.0
    }

    pub fn is_presented(&self) -> bool {
        self.0.is_some()
    }

    pub fn present(&mut self, value: T) {
        self.0 = Some(value);
    }

    /// Stop presenting, returning what was presented.
    pub fn dismiss(&mut self) -> Option<T> {
        self.0.take()
    }

    pub fn into_inner(self) -> Option<T> {
        self.0
    }
}

impl<T> Default for PresentationState<T> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T> From<Option<T>> for PresentationState<T> {
    fn from(value: Option<T>) -> Self {
        Self::new(value)
    }
}
