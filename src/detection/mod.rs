pub mod bbox;
pub mod contours;
pub mod postprocess;
pub mod preprocessing;
pub mod rescale;

pub use bbox::bounding_box;
pub use contours::{contour_area, find_contours, simplify_chain, threshold_mask};
pub use postprocess::{process_class, process_mask, ClassDetections};
pub use preprocessing::InferenceTransform;
pub use rescale::{rescale_contours, truncate_contour};
