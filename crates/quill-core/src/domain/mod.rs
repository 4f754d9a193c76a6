//! Domain entities - the core business objects.

mod attachment;
mod post;

pub use attachment::{ImageChange, Upload};
pub use post::{Post, PostDraft};
