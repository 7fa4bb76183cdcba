//! Map-side state for the browser UI, driven by a [`source::BusinessSource`].

pub mod controller;
pub mod source;

pub use controller::{marker_color, LocationError, MapController, Marker, Viewport};
pub use source::{BusinessSource, HttpBusinessSource, SourceError};
