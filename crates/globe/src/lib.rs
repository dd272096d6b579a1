//! Rotating globe widget core: country table, value coloring, rotation and
//! zoom state, pointer interaction and the renderer seam.

pub mod atlas;
pub mod color;
pub mod config;
pub mod hooks;
pub mod pointer;
pub mod render;
pub mod rotation;
pub mod view;

pub use atlas::{AtlasError, CountryAtlas};
pub use color::{Color, ColorScale, LegendEntry, ParseColorError};
pub use config::{ConfigError, GlobeConfig, MIN_SCALE_FACTOR, Palette};
pub use hooks::{CountryRef, DefaultHooks, GlobeHooks, TOOLTIP_OFFSET, Tooltip};
pub use pointer::{DragPhase, PointerEvent, PointerState, Viewport, WheelDelta};
pub use render::{CountryState, GlobeRenderer, NoopRenderer, RenderFrame};
pub use rotation::{CompletionCallback, MAX_LATITUDE_DEG, Rotation};
pub use view::{CountryAction, GlobeView};
