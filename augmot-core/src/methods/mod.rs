//! Built-in augmentation methods.

pub mod do_not_augment;
pub mod visual_similarity;

pub use do_not_augment::DoNotAugment;
pub use visual_similarity::VisualSimilarity2D;
