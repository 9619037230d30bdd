pub mod answer_oracle;
pub mod session_initiator;

pub use answer_oracle::{format_prompt, parse_index, AnswerOracle};
pub use session_initiator::SessionInitiator;
