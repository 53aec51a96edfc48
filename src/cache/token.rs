/// Slot holding the CSRF token for the lifetime of a page session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Token {
    /// nothing fetched yet, or the fetch failed
    #[default]
    Unset,
    /// fetch succeeded but the response carried no usable token field
    Absent,
    Value(String),
}

impl Token {
    pub fn value(&self) -> Option<&str> {
        match self {
            Token::Value(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Token::Unset)
    }

    /// Numeric form used by the `token_state` gauge
    pub fn as_gauge(&self) -> i64 {
        match self {
            Token::Unset => 0,
            Token::Absent => 1,
            Token::Value(_) => 2,
        }
    }
}
