//! Raster and vector image transforms.
//!
//! ```text
//! image/
//! ├── color    # hex parsing, luminance contrast, HSL variants
//! ├── mask     # circular alpha masks + compositing
//! ├── mono     # greyscale + binary threshold (notification icons)
//! ├── resize   # contain/cover fit policies
//! ├── svg      # SVG rasterization (resvg)
//! └── text     # initials fallback icon synthesis
//! ```

pub mod color;
pub mod mask;
pub mod mono;
pub mod resize;
pub mod svg;
pub mod text;
