pub mod decor;
pub mod labels;
#[cfg(feature = "vectors")]
pub mod vector;
#[cfg(feature = "vectors")]
pub mod overlay;
