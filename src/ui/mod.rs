pub mod icons;
pub mod panel;

pub use panel::{NOT_APPLICABLE_HINT, render, render_json};
