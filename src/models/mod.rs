pub mod case;
pub mod enums;
pub mod paper;

pub use case::*;
pub use enums::*;
pub use paper::*;
