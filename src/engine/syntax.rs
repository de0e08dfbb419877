//! Query text parsing
//!
//! The queries look like this:
//! ```sql
//! SELECT student.name, enrollment.course
//! FROM student
//! LEFT JOIN enrollment ON student.id = enrollment.student_id
//! WHERE student.age > 20 AND enrollment.course != Physics
//! ```
//!
//! Parsing happens in two stages:
//! 1. Pest checks the text against the grammar in query.pest and hands us a tree of pairs.
//! 2. The pairs are translated into a [Query].
//!
//! Only stage 1 knows about positions in the input, so all of the syntax errors come from there.

/// Uses Pest to parse input strings.
mod stage1;

/// Walks Pest's output and builds the query.
mod stage2;

pub use stage1::{ParseError, PestError, Rule};

use crate::engine::structure::Query;
use crate::engine::syntax::stage1::parse_stage1;

pub fn parse(input: &str) -> Result<Query, crate::Error> {
    let stage1 = parse_stage1(input)?;

    stage1.try_into()
}
