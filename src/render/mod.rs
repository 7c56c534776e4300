pub mod ascii;
pub mod canvas;
pub mod color;
pub mod gradient;
pub mod halfblock;

pub use canvas::{Canvas, RenderMode};
pub use color::{ColorMode, Rgb};
pub use gradient::ColorGradient;
