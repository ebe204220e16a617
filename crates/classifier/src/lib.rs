pub mod forwarder;
pub mod openai;

pub use forwarder::{build_prompt, Classification, ClassificationForwarder, SAMPLE_SIZE, SCHEMA_VERSION};
pub use openai::OpenAiClient;
