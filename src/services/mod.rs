pub mod browser;
pub mod extractor;
pub mod geo;
pub mod orchestrator;
pub mod scraper;
pub mod sink;

pub use browser::*;
pub use orchestrator::*;
pub use scraper::*;
pub use sink::*;
