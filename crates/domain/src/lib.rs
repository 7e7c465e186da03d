#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

/// Define a UUID-backed identifier newtype.
macro_rules! entity_id {
    ($name: ident) => {
        #[derive(
            derive_more::Deref,
            derive_more::Display,
            Debug,
            Default,
            Clone,
            Copy,
            Hash,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
        )]
        pub struct $name(uuid::Uuid);

        impl $name {
            #[must_use]
            pub fn nil() -> Self {
                Self(uuid::Uuid::nil())
            }

            #[must_use]
            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }

            #[must_use]
            pub fn random() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(value: uuid::Uuid) -> Self {
                Self(value)
            }
        }

        impl From<u128> for $name {
            fn from(value: u128) -> Self {
                Self(uuid::Uuid::from_bytes(value.to_be_bytes()))
            }
        }
    };
}

pub(crate) use entity_id;

pub mod catalog;
mod error;
mod exercise;
mod graph;
mod history;
mod name;
mod service;
mod set;
mod template;
mod units;
mod workout;

pub use catalog::{SeedExercise, SeedRepository};
pub use error::*;
pub use exercise::*;
pub use graph::*;
pub use history::*;
pub use name::*;
pub use service::*;
pub use set::*;
pub use template::*;
pub use units::*;
pub use workout::*;
