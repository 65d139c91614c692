//! Loader plugins shipped with the bundler.

pub mod css;

pub use css::CssPlugin;
