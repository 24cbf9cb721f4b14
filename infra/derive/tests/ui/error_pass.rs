use docfill_derive::docfill_error;
use std::borrow::Cow;

#[docfill_error]
pub enum SheetError {
    #[error("Read failure{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Bad header{}: {message}", format_context(.context))]
    Header { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read(path: &str) -> Result<Vec<u8>, SheetError> {
    std::fs::read(path).context("Reading replacements sheet")
}

fn header(raw: &str) -> Result<(), SheetError> {
    if raw.is_empty() {
        return Err(SheetError::Header { message: "empty".into(), context: None })
            .context("column 1");
    }
    Err("unreachable in practice".into())
}

fn main() {
    let _ = read("missing.csv");
    let err = header("").unwrap_err();
    assert_eq!(err.to_string(), "Bad header (column 1): empty");
}
