pub mod listing_string;
pub mod structured_program;
