//! Services implementing the business logic behind the Pokemon manager endpoints.

pub mod pokemon;
