pub mod downsample;
pub mod hsv;
pub mod mask;

pub use downsample::{downsample, scale_factor};
pub use hsv::{Hsv, HsvRange};

use std::any::TypeId;

pub fn is_floating_point<T: 'static>() -> bool {
    TypeId::of::<T>() == TypeId::of::<f32>() || TypeId::of::<T>() == TypeId::of::<f64>()
}
