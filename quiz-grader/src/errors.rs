pub mod quiz_error;
