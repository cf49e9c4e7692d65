//! Command implementations for the segalign CLI

#[cfg(feature = "align")] pub mod align;
#[cfg(feature = "segments")] pub mod segments;
