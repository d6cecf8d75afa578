pub mod collage;
pub mod decode;
pub mod derivatives;
pub mod error;
pub mod side;

pub use collage::detect_collage;
pub use decode::{probe_metadata, ImageMetadata};
pub use derivatives::{generate_derivatives, Derivative, DerivativeVariant};
pub use error::ImagingError;
pub use side::{detect_side, CardSide, DetectionMethod, SideDetection};
