//! Submission export
//!
//! Field label resolution, value normalization and the document renderer.

mod image;
mod normalize;
mod php_serialized;
pub mod pdf;
mod renderer;
mod resolver;
mod scratch;

pub use image::{image_reference, load_embeddable, ImageReference, ReqwestImageFetcher, IMAGE_EXTENSIONS};
pub use normalize::{normalize_value, strip_markup, LIST_SEPARATOR};
pub use renderer::ExportRenderer;
pub use resolver::{FieldLabelResolver, EXTRA_KEYS, INTERNAL_FIELD_PREFIX};
pub use scratch::{RenderScratch, ScratchSpace, STAGED_FILE_PREFIX};
