pub mod quiz;
pub mod quiz_type;
