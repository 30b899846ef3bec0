pub mod explainer;
pub mod matching;
pub mod providers;
pub mod retry;
pub mod taste_profile;
