use std::io::Write;

use anyhow::{Context, Result};
use tillage_rendering::{rasterize, RenderingBackend, Scene};

/// Backend that prints every scene as text to a writer.
#[derive(Debug)]
pub(crate) struct TerminalBackend<W> {
    out: W,
}

impl<W: Write> TerminalBackend<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }

    /// Prints a line that is not part of a scene.
    pub(crate) fn message(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{text}").context("failed to write to terminal")?;
        self.out.flush().context("failed to flush terminal")
    }
}

impl<W: Write> RenderingBackend for TerminalBackend<W> {
    fn present(&mut self, scene: &Scene) -> Result<()> {
        let frame = rasterize(scene);
        writeln!(self.out, "{frame}").context("failed to draw scene")?;
        self.out.flush().context("failed to flush terminal")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tillage_world::World;

    #[test]
    fn presented_scene_is_written_in_full() {
        let scene = Scene::capture(&World::with_seed(2, 1)).with_status("ready");
        let mut backend = TerminalBackend::new(Vec::new());
        backend.present(&scene).expect("writes to memory");
        backend.message("bye").expect("writes to memory");

        let text = String::from_utf8(backend.out).expect("utf8");
        assert!(text.starts_with("@.. ..\n .. ..\n"));
        assert!(text.contains("ready\n"));
        assert!(text.ends_with("bye\n"));
    }
}
