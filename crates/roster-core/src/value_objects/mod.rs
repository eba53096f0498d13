//! Value objects - immutable types that represent domain concepts

mod managed_roles;
mod registered_name;
mod snowflake;

pub use managed_roles::{ManagedRoleIds, ManagedRoles};
pub use registered_name::{
    validate_registered_name, NameRejection, MAX_NAME_LENGTH, MIN_NAME_LENGTH,
};
pub use snowflake::{Snowflake, SnowflakeParseError};
