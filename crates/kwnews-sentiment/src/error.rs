use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("lexicon term in the {set} set is blank")]
    BlankTerm { set: &'static str },

    #[error("lexicon has no terms")]
    EmptyLexicon,
}
