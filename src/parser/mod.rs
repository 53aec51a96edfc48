pub mod token_field;
