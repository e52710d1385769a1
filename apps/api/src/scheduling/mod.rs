// Shift generation pipeline.
// calendar/constraints build the business days, composer and the workflow
// client produce raw text, extraction/recovery/remap/validator turn it into a
// schedule the caller can trust.

pub mod calendar;
pub mod composer;
pub mod constraints;
pub mod extraction;
pub mod generator;
pub mod handlers;
pub mod models;
pub mod recovery;
pub mod remap;
pub mod validator;
pub mod workload;
