//! Rate limiting logic and state management.

mod backend;
mod clock;
mod counter;
mod events;
mod limiter;

pub use backend::AdmissionControl;
pub use clock::{Clock, ManualClock, SystemClock};
pub use counter::{CounterSnapshot, Decision};
pub use events::{AdmissionEvent, EventSink, NoopSink, TracingSink};
pub use limiter::RateLimiter;
