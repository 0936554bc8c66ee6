//! CSS engine: tokenizer, parser, specificity, custom properties, cascade,
//! calc expressions, colors and gradients.

pub mod tokenizer;
pub mod model;
pub mod parser;
pub mod specificity;
pub mod variables;
pub mod matching;
pub mod stylesheet;
pub mod properties;
pub mod styles;
pub mod value;
pub mod color;
pub mod calc;
pub mod gradient;

pub use color::Color;
pub use stylesheet::StylesheetRegistry;
pub use styles::Styles;
pub use value::StyleValue;
