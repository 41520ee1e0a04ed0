pub mod computed;
pub mod dimension;
pub mod flex;
pub mod flow;
pub mod font;
pub mod gradient;
pub mod parsers;

pub use computed::ComputedStyle;
pub use dimension::Dimension;
pub use flex::FlexDirection;
pub use flow::{Clear, Direction, Display, Float, Position, TextAlign, VerticalAlign, Visibility};
pub use font::{FontStyle, FontWeight};
pub use gradient::Gradient;
pub use parsers::StyleParseError;
