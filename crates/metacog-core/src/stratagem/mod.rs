pub mod catalog;
pub mod engine;

pub use catalog::{available, catalog, lookup, Step, StepKind, StratagemDef};
pub use engine::{
    abort, advance, record_primitive, start, status, Advance, StepInstructions,
    StratagemProgress,
};
