pub mod control;
pub mod interp;
pub mod stoch;

pub use control::*;
pub use interp::*;
pub use stoch::*;
