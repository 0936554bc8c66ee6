//! # cellcss
//!
//! A CSS rendering engine for terminals. Element trees are styled by a
//! cascade of registered stylesheets, laid out with taffy, and painted into
//! a grid of character cells. Images become sixel graphics; dialogs,
//! popovers and dropdowns are lifted into a top layer above the page.
//!
//! ## Core Systems
//!
//! - **[`css`]**: tokenizer, parser, selector matching, cascade, `var()`, `calc()`, gradients
//! - **[`dom`]**: slotmap-backed element tree with attributes and interaction state
//! - **[`layout`]**: taffy-powered block/flex/grid layout in cell units
//! - **[`render`]**: cell grid, compositor, top layer, dialogs, sixel codec, crossterm driver
//! - **[`widgets`]**: element renderers for form controls, tables, lists and images
//! - **[`session`]**: `RenderConfig` and `RenderSession`, the per-frame entry point
//! - **[`testing`]**: headless `Pilot` and snapshot helpers
//! - **[`geometry`]**: Offset, Size, Region, Spacing primitives

// Foundation
pub mod geometry;

// Core systems
pub mod css;
pub mod dom;
pub mod layout;

// Rendering
pub mod render;
pub mod widgets;
pub mod session;

// Headless helpers
pub mod testing;

pub use session::{RenderConfig, RenderError, RenderSession};
