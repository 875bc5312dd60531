pub mod asserts;
pub mod error;
pub mod logging;
pub mod matcher;
pub mod probe;
pub mod stub_scheduler;
pub mod util;

// Re-export the assertion surface at the crate root so test code can pull in
// one path for matchers, probes, and waits.
pub use error::WaitTimeout;
pub use matcher::{MatchEnv, Matcher, ValueKind};
pub use probe::{Job, JobId, SchedulerProbe, WaitOptions};
pub use stub_scheduler::StubScheduler;
pub use util::wait_until;

#[cfg(test)]
mod matcher_tests;
