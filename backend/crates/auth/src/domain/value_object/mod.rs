//! Value Object Module

pub mod email;
pub mod national_id;
pub mod user_password;
pub mod user_role;
