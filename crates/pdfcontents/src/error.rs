#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("No text found in {0}")]
    NoText(String),

    #[error("Invalid patterns file {0}: {1}")]
    Patterns(String, String),
}
