//! the test_utils folder here will share utils or test components between unit
//! tests
mod common;
mod fake_sentinel;

pub use common::*;
pub use fake_sentinel::*;
