mod counter;
mod desc;
mod registry;

pub use counter::{Collector, Counter, CounterVec, Metric};
pub use desc::Desc;
pub use registry::Registry;
