//! Line splitting shared by every reader.

mod accumulator;

pub(crate) use accumulator::LineAccumulator;
