pub mod grading_result;
pub mod quiz_attempt;
