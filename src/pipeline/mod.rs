pub mod preprocess;
pub mod region;
pub mod classify;

pub use classify::*;
pub use preprocess::*;
pub use region::*;
