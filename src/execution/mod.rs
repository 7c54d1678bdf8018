pub mod router;
pub mod simulated;
pub mod traits;

pub use router::{ExecutionReport, ExecutionRouter};
pub use simulated::SimulatedExecutor;
pub use traits::*;
