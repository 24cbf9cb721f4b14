use docfill_derive::api_model;

#[api_model]
/// JSON body returned by every failing API call.
pub struct ErrorBody {
    /// Human readable description
    pub error: String,
    /// Machine readable error kind (`snake_case` variant name)
    pub kind: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, kind: impl Into<String>) -> Self {
        Self { error: error.into(), kind: kind.into() }
    }
}
