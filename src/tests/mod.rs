pub mod test_encoder;
pub mod test_scratch;
pub mod test_session;
pub mod test_trainer;
