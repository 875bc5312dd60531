use crate::probe::JobId;
use std::fmt;
use std::time::Duration;

#[macro_export]
macro_rules! function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        type_name_of(f)
            .rsplit("::")
            .find(|&part| part != "f" && part != "{{closure}}")
            .expect("Short function name")
    }};
}

#[macro_export]
macro_rules! bail_loc {
    ($msg:expr) => {
        anyhow::bail!("[{}:{} - {}] {}", file!(), function_name!(), line!(), $msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        anyhow::bail!("[{}:{} - {}] {}", file!(), function_name!(), line!(), format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! anyhow_loc {
    ($msg:expr) => {
        anyhow::anyhow!("[{}:{} - {}] {}", file!(), function_name!(), line!(), $msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        anyhow::anyhow!("[{}:{} - {}] {}", file!(), function_name!(), line!(), format!($fmt, $($arg)*))
    };
}

/// A bounded wait gave up before its condition held.
///
/// Travels inside `anyhow::Error`; recover it with
/// `err.downcast_ref::<WaitTimeout>()` to tell a timeout apart from other
/// failures. `pending` lists the job ids still absent from the completion
/// registry, and is empty when the wait was over an arbitrary condition
/// rather than a set of jobs.
#[derive(Debug)]
pub struct WaitTimeout {
    pub waited: Duration,
    pub pending: Vec<JobId>,
}

impl fmt::Display for WaitTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pending.is_empty() {
            write!(f, "timed out after {:?}", self.waited)
        } else {
            write!(
                f,
                "timed out after {:?} waiting for jobs {:?}",
                self.waited, self.pending
            )
        }
    }
}

impl std::error::Error for WaitTimeout {}
