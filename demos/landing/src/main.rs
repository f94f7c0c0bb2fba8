use glyphfall::{error::Error, GlyphBackdrop};

fn main() -> Result<(), Error> {
    // The backdrop is decoration: if the page carries no `matrix-bg` canvas,
    // the rest of the page stays fully functional.
    if let Some(backdrop) = GlyphBackdrop::attach()? {
        backdrop.start();
    }
    Ok(())
}
