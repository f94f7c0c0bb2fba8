use web_sys::wasm_bindgen::JsValue;

/// All the errors that can occur while driving the backdrop.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unable to retrieve the window.
    #[error("unable to retrieve the window")]
    UnableToRetrieveWindow,

    /// Unable to retrieve the document.
    #[error("unable to retrieve the document")]
    UnableToRetrieveDocument,

    /// Unable to retrieve the viewport size.
    #[error("unable to retrieve the viewport size")]
    UnableToRetrieveViewportSize,

    /// Unable to retrieve the 2D rendering context of the canvas.
    #[error("unable to retrieve the canvas rendering context")]
    UnableToRetrieveCanvasContext,

    /// The element with the given id exists but is not a `<canvas>`.
    #[error("element `{0}` is not a canvas")]
    NotACanvasElement(String),

    /// An error originating from the JavaScript side.
    #[error("JavaScript error: {0}")]
    JsError(String),
}

impl From<JsValue> for Error {
    fn from(value: JsValue) -> Self {
        Error::JsError(format!("{value:?}"))
    }
}
