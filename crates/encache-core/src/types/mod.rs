pub mod cache;
pub mod tensor;

pub use cache::*;
pub use tensor::*;
