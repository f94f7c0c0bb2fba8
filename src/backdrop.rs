use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use rand::{rngs::SmallRng, SeedableRng};
use web_sys::{
    js_sys::{Boolean, Date, Map},
    wasm_bindgen::{prelude::Closure, JsCast, JsValue},
    CanvasRenderingContext2d, HtmlCanvasElement,
};

use crate::{
    error::Error,
    field::{ColumnField, GLYPH_SIZE},
    glyphs::{sample_glyph, GlyphFill, FADE_FILL, PRIMARY_COLOR},
    utils,
};

/// The well-known element id the backdrop attaches to by default.
pub const DEFAULT_CANVAS_ID: &str = "matrix-bg";

/// Glow radius applied to every glyph.
const SHADOW_BLUR: f64 = 2.0;

/// Font family used for the glyphs.
const FONT_FAMILY: &str = "JetBrains Mono, monospace";

/// Options for the [`GlyphBackdrop`].
#[derive(Debug, Default)]
pub struct BackdropOptions {
    /// The canvas element id.
    canvas_id: Option<String>,
    /// Override the RNG seed.
    seed: Option<u64>,
}

impl BackdropOptions {
    /// Constructs a new [`BackdropOptions`].
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the id of the canvas element to attach to.
    ///
    /// Defaults to [`DEFAULT_CANVAS_ID`].
    pub fn canvas_id(mut self, id: &str) -> Self {
        self.canvas_id = Some(id.to_string());
        self
    }

    /// Seeds the random generator, making the glyph stream reproducible.
    ///
    /// Without this the generator is seeded from the current time.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Run state of the render loop, shared with every scheduled frame closure.
///
/// A pending animation frame cannot be cancelled once requested, so each
/// start opens a new generation and every frame closure carries the
/// generation it was scheduled under. A frame from a superseded generation
/// observes the mismatch and dies instead of rescheduling, which keeps a
/// stop immediately followed by a start from leaving two loops running.
#[derive(Debug, Default)]
struct LoopState {
    /// Whether the loop is currently running.
    running: Cell<bool>,
    /// Generation of the current loop, bumped on every start.
    generation: Cell<u64>,
}

impl LoopState {
    /// Marks the loop as running and opens a new generation.
    ///
    /// Returns `None` if the loop is already running.
    fn begin(&self) -> Option<u64> {
        if self.running.replace(true) {
            return None;
        }
        let generation = self.generation.get().wrapping_add(1);
        self.generation.set(generation);
        Some(generation)
    }

    /// Marks the loop as stopped.
    fn halt(&self) {
        self.running.set(false);
    }

    /// Returns whether the loop is running.
    fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Returns whether a frame scheduled under the given generation may
    /// render and reschedule.
    fn is_current(&self, generation: u64) -> bool {
        self.running.get() && self.generation.get() == generation
    }
}

/// The animated falling-glyph backdrop.
///
/// Owns a full-viewport canvas, one falling cursor per column, and a
/// self-rescheduling render loop. On every tick it paints a translucent fade
/// rectangle over the previous frame, draws one random glyph per column, and
/// advances the columns.
///
/// The loop is started explicitly with [`start`] and can be halted with
/// [`stop`]; both the render tick and the resize listener share state through
/// `Rc`, so the handle itself can be dropped while the loop keeps running.
///
/// [`start`]: GlyphBackdrop::start
/// [`stop`]: GlyphBackdrop::stop
#[derive(Debug)]
pub struct GlyphBackdrop {
    /// Canvas element.
    canvas: HtmlCanvasElement,
    /// Rendering context.
    context: CanvasRenderingContext2d,
    /// Column state.
    field: Rc<RefCell<ColumnField>>,
    /// Random generator, shared between the tick and the resize listener.
    rng: Rc<RefCell<SmallRng>>,
    /// Run state of the render loop.
    state: Rc<LoopState>,
}

impl GlyphBackdrop {
    /// Attaches to the default [`DEFAULT_CANVAS_ID`] canvas.
    ///
    /// Returns `Ok(None)` if the page has no such element; the backdrop is a
    /// feature of the page, not a requirement, and its absence is tolerated
    /// silently.
    pub fn attach() -> Result<Option<Self>, Error> {
        Self::attach_with_options(BackdropOptions::default())
    }

    /// Attaches to the canvas named by the given options.
    pub fn attach_with_options(options: BackdropOptions) -> Result<Option<Self>, Error> {
        let id = options.canvas_id.as_deref().unwrap_or(DEFAULT_CANVAS_ID);
        match utils::get_canvas_by_id(id)? {
            Some(canvas) => Self::new_with_options(canvas, options).map(Some),
            None => Ok(None),
        }
    }

    /// Constructs a new [`GlyphBackdrop`] on the given canvas.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, Error> {
        Self::new_with_options(canvas, BackdropOptions::default())
    }

    /// Constructs a new [`GlyphBackdrop`] on the given canvas with options.
    ///
    /// Binds the 2D context, runs the initial layout pass and registers the
    /// viewport resize listener. The render loop is not started yet.
    pub fn new_with_options(
        canvas: HtmlCanvasElement,
        options: BackdropOptions,
    ) -> Result<Self, Error> {
        console_error_panic_hook::set_once();

        let context_options = Map::new();
        context_options.set(
            &JsValue::from_str("desynchronized"),
            &Boolean::from(JsValue::TRUE),
        );
        let context = canvas
            .get_context_with_context_options("2d", &context_options)?
            .ok_or(Error::UnableToRetrieveCanvasContext)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| Error::UnableToRetrieveCanvasContext)?;

        let mut rng = SmallRng::seed_from_u64(options.seed.unwrap_or_else(|| Date::now() as u64));
        let (width, height) = utils::viewport_size()?;
        canvas.set_width(width);
        canvas.set_height(height);
        let field = Rc::new(RefCell::new(ColumnField::new(width, height, &mut rng)));

        let backdrop = Self {
            canvas,
            context,
            field,
            rng: Rc::new(RefCell::new(rng)),
            state: Rc::new(LoopState::default()),
        };
        backdrop.add_on_resize_listener()?;
        Ok(backdrop)
    }

    /// Returns the current number of columns.
    pub fn column_count(&self) -> usize {
        self.field.borrow().column_count()
    }

    /// Returns whether the render loop is running.
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Starts the render loop.
    ///
    /// Every tick renders one frame and requests the next animation frame, so
    /// the loop is never re-entrant and runs until [`stop`] is called or the
    /// page unloads. Calling this while the loop is running is a no-op.
    ///
    /// [`stop`]: GlyphBackdrop::stop
    pub fn start(&self) {
        let Some(generation) = self.state.begin() else {
            return;
        };

        let context = self.context.clone();
        let field = Rc::clone(&self.field);
        let rng = Rc::clone(&self.rng);
        let state = Rc::clone(&self.state);

        let callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
        *callback.borrow_mut() = Some(Closure::wrap(Box::new({
            let cb = Rc::clone(&callback);
            move || {
                if !state.is_current(generation) {
                    return;
                }
                if let Err(err) =
                    render_frame(&context, &mut field.borrow_mut(), &mut rng.borrow_mut())
                {
                    web_sys::console::error_1(&format!("backdrop tick failed: {err}").into());
                    state.halt();
                    return;
                }
                if let Some(f) = cb.borrow().as_ref() {
                    if let Err(err) = utils::request_animation_frame(f) {
                        web_sys::console::error_1(
                            &format!("backdrop could not reschedule: {err}").into(),
                        );
                        state.halt();
                    }
                }
            }
        }) as Box<dyn FnMut()>));

        if let Some(f) = callback.borrow().as_ref() {
            if let Err(err) = utils::request_animation_frame(f) {
                web_sys::console::error_1(&format!("backdrop could not start: {err}").into());
                self.state.halt();
            }
        };
    }

    /// Stops the render loop.
    ///
    /// The frame in flight observes the stopped state and does not reschedule
    /// itself; restarting bumps the generation, so even a frame that was
    /// already scheduled before the stop cannot resume a superseded loop.
    pub fn stop(&self) {
        self.state.halt();
    }

    /// Registers the window resize listener.
    ///
    /// A resize re-runs the layout pass: the canvas is resized to the viewport
    /// (which clears its pixels) and the column state is fully rebuilt.
    fn add_on_resize_listener(&self) -> Result<(), Error> {
        let canvas = self.canvas.clone();
        let field = Rc::clone(&self.field);
        let rng = Rc::clone(&self.rng);
        let closure = Closure::<dyn FnMut(_)>::new(move |_: web_sys::Event| {
            if let Err(err) = layout_pass(&canvas, &mut field.borrow_mut(), &mut rng.borrow_mut())
            {
                web_sys::console::error_1(&format!("backdrop resize failed: {err}").into());
            }
        });
        utils::window()?.set_onresize(Some(closure.as_ref().unchecked_ref()));
        closure.forget();
        Ok(())
    }
}

/// Resizes the canvas to the viewport and rebuilds the column state.
fn layout_pass(
    canvas: &HtmlCanvasElement,
    field: &mut ColumnField,
    rng: &mut SmallRng,
) -> Result<(), Error> {
    let (width, height) = utils::viewport_size()?;
    canvas.set_width(width);
    canvas.set_height(height);
    field.resize(width, height, rng);
    Ok(())
}

/// Renders a single frame and advances the column state.
fn render_frame(
    context: &CanvasRenderingContext2d,
    field: &mut ColumnField,
    rng: &mut SmallRng,
) -> Result<(), Error> {
    // Fade the previous frame instead of clearing it; the accumulated
    // overpaint is what forms the trails.
    context.set_fill_style_str(FADE_FILL);
    context.fill_rect(0.0, 0.0, f64::from(field.width()), f64::from(field.height()));

    // Resizing the canvas resets the context state, so the font and glow are
    // reapplied every tick.
    context.set_font(&format!("{GLYPH_SIZE}px {FONT_FAMILY}"));
    context.set_shadow_color(PRIMARY_COLOR);
    context.set_shadow_blur(SHADOW_BLUR);

    let mut buf = [0u8; 4];
    for (x, y) in field.positions() {
        let glyph = sample_glyph(rng);
        context.set_fill_style_str(&GlyphFill::sample(rng).as_css());
        context.fill_text(glyph.encode_utf8(&mut buf), x, y)?;
    }

    field.advance(rng);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backdrop_options_builder() {
        let options = BackdropOptions::new().canvas_id("backdrop").seed(7);
        assert_eq!(options.canvas_id.as_deref(), Some("backdrop"));
        assert_eq!(options.seed, Some(7));

        let defaults = BackdropOptions::default();
        assert_eq!(defaults.canvas_id, None);
        assert_eq!(defaults.seed, None);
    }

    #[test]
    fn test_restart_invalidates_pending_frames() {
        let state = LoopState::default();
        let first = state.begin().expect("loop starts");
        assert!(state.is_current(first));
        // While running, a second start is refused.
        assert!(state.begin().is_none());

        // Stop with a frame still pending, then restart immediately.
        state.halt();
        assert!(!state.is_current(first));
        let second = state.begin().expect("loop restarts");

        // The restarted loop runs under the new generation only; the frame
        // scheduled before the stop must die instead of forking a second
        // loop.
        assert!(state.is_current(second));
        assert!(!state.is_current(first));
        assert!(state.is_running());
    }

    #[test]
    fn test_halt_stops_the_current_generation() {
        let state = LoopState::default();
        let generation = state.begin().expect("loop starts");
        state.halt();
        assert!(!state.is_running());
        assert!(!state.is_current(generation));
    }
}
