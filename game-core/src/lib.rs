pub mod effects;
pub mod input_validation;
pub mod reducer;
pub mod session;
pub mod stats;
pub mod timer;

// Re-export main components
pub use effects::*;
pub use input_validation::*;
pub use reducer::*;
pub use session::*;
pub use stats::*;
pub use timer::*;
