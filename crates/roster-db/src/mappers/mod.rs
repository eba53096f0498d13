//! Entity <-> model mappers

mod member_record;
