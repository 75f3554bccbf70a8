//! Image provider adapters: stock-photo search and banner generation.

mod huggingface;
mod unsplash;

pub use huggingface::HuggingFaceBanner;
pub use unsplash::UnsplashSearch;
