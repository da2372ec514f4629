pub(crate) mod circle;
pub(crate) mod quad;

pub use circle::CircleCmd;
pub use quad::QuadCmd;
