pub mod generate_quiz_route;
pub mod quiz_request;
pub mod score_quiz_route;
