pub mod clients;
pub mod config;
pub mod deserializers;
pub mod error;
pub mod evaluate;
pub mod extract;
pub mod gate;
pub mod http;
pub mod prompts;
pub mod report;
pub mod sanitize;
pub mod schemas;
pub mod validation;

pub use config::Config;
pub use error::{CouncilError, Result};
pub use evaluate::{Evaluation, Evaluator};
