//! Turns a CV, a spreadsheet of mapping rules, and an optional job
//! description into a populated slide deck plus a JSON traceability report.

pub mod config;
pub mod cv;
pub mod error;
pub mod instructions;
pub mod job_description;
pub mod pipeline;
pub mod report;
pub mod slides;
pub mod telemetry;
pub mod trace;

pub use error::PipelineError;
pub use pipeline::{Collaborators, CvAutomation, RunInputs};
