//! Common re-exports for convenient entity usage.

pub use super::developer::{
    ActiveModel as DeveloperActiveModel, Column as DeveloperColumn, Entity as Developer,
    Model as DeveloperModel,
};
