pub mod bars;
pub mod controls;
pub mod render_loop;

pub use bars::*;
pub use controls::*;
pub use render_loop::RenderLoop;
