//! `SeaORM` entity definitions.

pub mod profiles;
