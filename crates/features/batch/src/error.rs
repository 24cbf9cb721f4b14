use std::borrow::Cow;

/// Errors raised while validating uploads or generating documents.
#[docfill_derive::docfill_error]
pub enum BatchError {
    /// A required upload (template or sheet) was not provided.
    #[error("Missing file{}: {message}", format_context(.context))]
    MissingFile { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid file extension{}: {message}", format_context(.context))]
    InvalidExtension { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Malformed replacements sheet{}: {message}", format_context(.context))]
    MalformedSheet { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Replacements sheet has no rows{}: {message}", format_context(.context))]
    EmptySheet { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The template is not a readable `.docx` package.
    #[error("Invalid template{}: {message}", format_context(.context))]
    InvalidTemplate { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A row names a `__CATEGORY__` without a matching category template.
    #[error("Unknown template category{}: {message}", format_context(.context))]
    UnknownCategory { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid batch options{}: {message}", format_context(.context))]
    InvalidOptions { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Zip archive error{}: {source}", format_context(.context))]
    Zip { source: zip::result::ZipError, context: Option<Cow<'static, str>> },

    #[error("XML error{}: {source}", format_context(.context))]
    Xml { source: quick_xml::Error, context: Option<Cow<'static, str>> },

    #[error("I/O error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Pattern error{}: {source}", format_context(.context))]
    Pattern { source: regex::Error, context: Option<Cow<'static, str>> },

    /// The multipart body could not be read (includes oversized uploads).
    #[cfg(feature = "server")]
    #[error("Upload error{}: {source}", format_context(.context))]
    Upload { source: axum::extract::multipart::MultipartError, context: Option<Cow<'static, str>> },

    #[error("Internal batch error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
