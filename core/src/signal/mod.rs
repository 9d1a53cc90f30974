pub mod technology;
pub mod tier;

pub use technology::Technology;
pub use tier::SignalTier;
