mod object;

pub use object::{ComponentObject, SaveOptions, ValidationIssue};
