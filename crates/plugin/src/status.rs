//! Stage status codes

use std::fmt;

/// Result of a plugin stage
///
/// Non-negative codes are success; negative codes are failures. A plugin
/// reports the details of a failure as metadata on the key it was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Status(i32);

impl Status {
    /// Stage completed and changed something
    pub const SUCCESS: Status = Status(1);
    /// Stage completed without changes
    pub const NO_UPDATE: Status = Status(0);
    /// Stage failed
    pub const ERROR: Status = Status(-1);

    /// Wrap a raw code
    pub const fn new(code: i32) -> Self {
        Status(code)
    }

    /// Raw code
    pub const fn code(self) -> i32 {
        self.0
    }

    /// Whether the code signals success
    pub const fn is_success(self) -> bool {
        self.0 >= 0
    }

    /// Whether the code signals failure
    pub const fn is_error(self) -> bool {
        self.0 < 0
    }
}

impl From<i32> for Status {
    fn from(code: i32) -> Self {
        Status(code)
    }
}

impl From<Status> for i32 {
    fn from(status: Status) -> Self {
        status.0
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Status::SUCCESS => write!(f, "success"),
            Status::NO_UPDATE => write!(f, "no update"),
            Status(code) if code < 0 => write!(f, "error ({})", code),
            Status(code) => write!(f, "success ({})", code),
        }
    }
}
