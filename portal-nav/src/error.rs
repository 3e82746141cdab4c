use snafu::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Failed to lock mutex: poisoned"))]
    LockPoisoned,

    #[snafu(display("Terminal error: {source}"))]
    TerminalError { source: std::io::Error },

    #[snafu(display("Invalid route path '{path}': must start with '/'"))]
    InvalidPath { path: String },

    #[snafu(display("Duplicate route path '{path}'"))]
    DuplicatePath { path: String },

    #[snafu(display("Duplicate route name '{name}'"))]
    DuplicateName { name: String },

    #[snafu(display("Unknown route name '{name}'"))]
    UnknownRouteName { name: String },

    #[snafu(display("Route '{name}' requires parameter '{param}'"))]
    MissingParam { name: String, param: String },

    #[snafu(display("Failed to load view for route '{route}': {message}"))]
    ViewLoadError { route: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
