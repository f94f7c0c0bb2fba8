use web_sys::{
    wasm_bindgen::{prelude::Closure, JsCast},
    Document, HtmlCanvasElement, Window,
};

use crate::error::Error;

/// Returns the window.
pub(crate) fn window() -> Result<Window, Error> {
    web_sys::window().ok_or(Error::UnableToRetrieveWindow)
}

/// Returns the document.
pub(crate) fn document() -> Result<Document, Error> {
    window()?.document().ok_or(Error::UnableToRetrieveDocument)
}

/// Returns the current viewport size in pixels.
pub(crate) fn viewport_size() -> Result<(u32, u32), Error> {
    let window = window()?;
    let width = window
        .inner_width()?
        .as_f64()
        .ok_or(Error::UnableToRetrieveViewportSize)? as u32;
    let height = window
        .inner_height()?
        .as_f64()
        .ok_or(Error::UnableToRetrieveViewportSize)? as u32;
    Ok((width, height))
}

/// Looks up a canvas element by id.
///
/// Returns `Ok(None)` if no element with the given id exists; the element
/// existing but not being a `<canvas>` is an error.
pub(crate) fn get_canvas_by_id(id: &str) -> Result<Option<HtmlCanvasElement>, Error> {
    match document()?.get_element_by_id(id) {
        Some(element) => element
            .dyn_into::<HtmlCanvasElement>()
            .map(Some)
            .map_err(|_| Error::NotACanvasElement(id.to_string())),
        None => Ok(None),
    }
}

/// Requests an animation frame.
pub(crate) fn request_animation_frame(f: &Closure<dyn FnMut()>) -> Result<i32, Error> {
    Ok(window()?.request_animation_frame(f.as_ref().unchecked_ref())?)
}
