use thiserror::Error;

pub type SceneResult<T> = Result<T, SceneError>;

/// Problems with the declarative body data.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("could not read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse catalog: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog has no bodies")]
    Empty,

    #[error("body name {0:?} appears more than once")]
    DuplicateName(String),

    #[error("body {name:?} has an invalid {field}: {value}")]
    InvalidOrbit {
        name: String,
        field: &'static str,
        value: f64,
    },

    #[error("catalog needs exactly one central body, found {0}")]
    CentralBodyCount(usize),

    #[error("bad color {0:?}, expected six hex digits")]
    BadColor(String),
}

#[derive(Error, Debug)]
pub enum SceneError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("no body named {0:?}")]
    UnknownBody(String),

    #[error("no scroll sections configured")]
    NoSections,

    #[error("graphics context unavailable: {0}")]
    GraphicsUnavailable(String),
}
