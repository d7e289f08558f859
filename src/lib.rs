#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

/// The grammar emitter and its configuration.
mod emit;
mod rng;
/// Date-time value types shared by the generator and its model.
mod time;
/// The evolving TOML tree that keeps emitted syntax legal.
mod tree;
mod value;

pub use emit::{Config, Generated, Generator};
pub use time::{Date, Datetime, Time, TimeOffset};
pub use value::{Table, Value};

#[cfg(feature = "serde")]
mod impl_serde;

/// Generates a document/model pair from a seed with the default [`Config`].
///
/// The output is fully determined by the seed: the same seed always yields
/// the same document bytes and the same model.
pub fn generate(seed: u64) -> Generated {
    Generator::new(seed).generate()
}

/// Generates a document/model pair from a seed with a custom [`Config`].
pub fn generate_with(seed: u64, config: Config) -> Generated {
    Generator::with_config(seed, config).generate()
}
