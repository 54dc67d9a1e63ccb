pub mod classifier;
pub mod entropy;
pub mod scorer;

pub use classifier::TorchClassifier;
pub use scorer::Scorer;
