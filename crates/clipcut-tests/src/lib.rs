//! Integration test crate for ClipCut.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! Sessions run against an in-memory service so the whole
//! submit/poll/edit/finalize loop can be driven end to end.

#[cfg(test)]
mod fake;

#[cfg(test)]
mod job;

#[cfg(test)]
mod editing;
