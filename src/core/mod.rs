pub mod analyst;
pub mod engine;
pub mod news_pipeline;
pub mod podcast_pipeline;
pub mod publish;
pub mod random;

pub use crate::domain::model::{Post, RunReport};
pub use crate::domain::ports::{LlmProvider, Pipeline, Storage};
pub use crate::utils::error::Result;

pub use analyst::Analyst;
pub use engine::RunEngine;
pub use news_pipeline::NewsPipeline;
pub use podcast_pipeline::PodcastPipeline;
pub use publish::Publisher;
pub use random::Randomizer;
