//! `.docx` package handling.
//!
//! A template is kept as the raw list of zip entries. Rendering streams each targeted XML part
//! through `quick-xml` and rewrites the text of every `w:t` inside a `w:r`. A token is only
//! found when it sits inside a single run; Word may split typed text across runs, and such
//! split tokens are left untouched.

use crate::error::{BatchError, BatchErrorExt};
use docfill_domain::config::ReplaceScope;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use regex::{NoExpand, Regex};
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const DOCUMENT_PART: &str = "word/document.xml";

/// Largest accepted uncompressed entry.
const MAX_ENTRY_BYTES: u64 = 64 * 1024 * 1024;
/// Largest accepted uncompressed package, all entries together.
const MAX_PACKAGE_BYTES: u64 = 128 * 1024 * 1024;

const RUN: &[u8] = b"w:r";
const TEXT: &[u8] = b"w:t";

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    data: Vec<u8>,
    is_dir: bool,
}

/// An opened Word template.
#[derive(Debug, Clone)]
pub struct DocxTemplate {
    entries: Vec<Entry>,
}

/// A literal token and the text that replaces it.
#[derive(Debug, Clone)]
pub struct Substitution {
    token: String,
    value: String,
    pattern: Regex,
}

impl Substitution {
    /// # Errors
    /// [`BatchError::InvalidOptions`] when the token is empty.
    pub fn new(token: impl Into<String>, value: impl Into<String>) -> Result<Self, BatchError> {
        let token = token.into();
        if token.is_empty() {
            return Err(BatchError::InvalidOptions {
                message: "a replacement token cannot be empty".into(),
                context: None,
            });
        }
        let pattern = Regex::new(&regex::escape(&token)).context("Failed to compile token")?;
        Ok(Self { token, value: value.into(), pattern })
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Output of [`DocxTemplate::render`].
#[derive(Debug, Clone)]
pub struct Rendered {
    pub bytes: Vec<u8>,
    /// Replacements made per substitution, in the order they were given.
    pub hits: Vec<usize>,
}

impl Rendered {
    #[must_use]
    pub fn total_hits(&self) -> usize {
        self.hits.iter().sum()
    }
}

impl DocxTemplate {
    /// Opens a `.docx` from memory.
    ///
    /// # Errors
    /// [`BatchError::InvalidTemplate`] when the bytes are not a zip package, an entry or the
    /// whole package inflates past its size limit, or `word/document.xml` is missing or not
    /// well-formed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BatchError> {
        Self::open(bytes, MAX_PACKAGE_BYTES)
    }

    fn open(bytes: &[u8], budget: u64) -> Result<Self, BatchError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|err| {
            BatchError::InvalidTemplate { message: err.to_string().into(), context: None }
        })?;

        let mut entries = Vec::with_capacity(archive.len());
        let mut inflated = 0u64;
        for index in 0..archive.len() {
            let file = archive.by_index(index).map_err(|err| BatchError::InvalidTemplate {
                message: err.to_string().into(),
                context: Some(format!("entry {index}").into()),
            })?;
            let name = file.name().to_owned();

            let limit = MAX_ENTRY_BYTES.min(budget.saturating_sub(inflated));
            if file.size() > limit {
                return Err(too_large(name, budget));
            }

            let is_dir = file.is_dir();
            let mut data = Vec::new();
            if !is_dir {
                file.take(limit + 1).read_to_end(&mut data).map_err(|err| {
                    BatchError::InvalidTemplate {
                        message: err.to_string().into(),
                        context: Some(name.clone().into()),
                    }
                })?;
            }
            let size = u64::try_from(data.len()).unwrap_or(u64::MAX);
            if size > limit {
                return Err(too_large(name, budget));
            }
            inflated += size;
            entries.push(Entry { name, data, is_dir });
        }

        let template = Self { entries };
        let document = template.entry(DOCUMENT_PART).ok_or_else(|| BatchError::InvalidTemplate {
            message: format!("{DOCUMENT_PART} not found; is this a Word document?").into(),
            context: None,
        })?;
        rewrite_runs(&document.data, |_| None).map_err(|err| BatchError::InvalidTemplate {
            message: err.to_string().into(),
            context: Some(DOCUMENT_PART.into()),
        })?;

        Ok(template)
    }

    /// Entry names in package order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    /// Applies `substitutions` in order to every run of the parts selected by `scope` and
    /// packs a new `.docx`. Values are inserted literally.
    ///
    /// # Errors
    /// [`BatchError::Xml`] for unparsable parts, [`BatchError::Zip`]/[`BatchError::Io`] when
    /// writing the package fails.
    pub fn render(
        &self,
        substitutions: &[Substitution],
        scope: ReplaceScope,
    ) -> Result<Rendered, BatchError> {
        let mut hits = vec![0; substitutions.len()];
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in &self.entries {
            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), options)?;
                continue;
            }

            zip.start_file(entry.name.as_str(), options)?;
            if is_target_part(&entry.name, scope) && !substitutions.is_empty() {
                let xml = rewrite_runs(&entry.data, |text| apply(substitutions, text, &mut hits))
                    .context(entry.name.clone())?;
                zip.write_all(&xml)?;
            } else {
                zip.write_all(&entry.data)?;
            }
        }

        let bytes = zip.finish()?.into_inner();
        Ok(Rendered { bytes, hits })
    }

    /// Counts `token` inside single runs of the selected parts.
    ///
    /// # Errors
    /// [`BatchError::Xml`] for unparsable parts.
    pub fn count_occurrences(&self, token: &str, scope: ReplaceScope) -> Result<usize, BatchError> {
        if token.is_empty() {
            return Ok(0);
        }
        Ok(self.run_texts(scope)?.iter().map(|text| text.matches(token).count()).sum())
    }

    /// Plain text of the selected parts, one run after another.
    ///
    /// # Errors
    /// [`BatchError::Xml`] for unparsable parts.
    pub fn text(&self, scope: ReplaceScope) -> Result<String, BatchError> {
        Ok(self.run_texts(scope)?.concat())
    }

    fn run_texts(&self, scope: ReplaceScope) -> Result<Vec<String>, BatchError> {
        let mut texts = Vec::new();
        for entry in self.entries.iter().filter(|e| !e.is_dir && is_target_part(&e.name, scope)) {
            rewrite_runs(&entry.data, |text| {
                texts.push(text.to_owned());
                None
            })
            .context(entry.name.clone())?;
        }
        Ok(texts)
    }

    fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}

fn too_large(name: String, budget: u64) -> BatchError {
    BatchError::InvalidTemplate {
        message: format!(
            "entry inflates past {MAX_ENTRY_BYTES} bytes or the package past {budget} bytes"
        )
        .into(),
        context: Some(name.into()),
    }
}

fn apply(substitutions: &[Substitution], text: &str, hits: &mut [usize]) -> Option<String> {
    let mut current: Option<String> = None;
    for (sub, hit) in substitutions.iter().zip(hits.iter_mut()) {
        let source = current.as_deref().unwrap_or(text);
        let found = sub.pattern.find_iter(source).count();
        if found == 0 {
            continue;
        }
        *hit += found;
        current = Some(sub.pattern.replace_all(source, NoExpand(&sub.value)).into_owned());
    }
    current
}

fn is_target_part(name: &str, scope: ReplaceScope) -> bool {
    if name == DOCUMENT_PART {
        return true;
    }
    if scope == ReplaceScope::Body {
        return false;
    }
    let Some(file) = name.strip_prefix("word/").and_then(|rest| rest.strip_suffix(".xml")) else {
        return false;
    };
    if file == "footnotes" || file == "endnotes" {
        return true;
    }
    ["header", "footer"].iter().any(|prefix| {
        file.strip_prefix(prefix).is_some_and(|n| n.chars().all(|c| c.is_ascii_digit()))
    })
}

/// Streams `xml` and hands the text of each run's `w:t` to `edit`. When `edit` returns a new
/// text the element is rewritten; otherwise the buffered events are copied verbatim.
fn rewrite_runs<F>(xml: &[u8], mut edit: F) -> Result<Vec<u8>, BatchError>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));

    let mut run_depth = 0usize;
    let mut pending: Option<(BytesStart<'_>, Vec<Event<'_>>, String)> = None;

    loop {
        let event = reader.read_event()?;

        if let Some((start, events, text)) = pending.as_mut() {
            match event {
                Event::Text(ref t) => {
                    text.push_str(&t.unescape()?);
                    events.push(event);
                }
                Event::CData(ref c) => {
                    text.push_str(&String::from_utf8_lossy(c));
                    events.push(event);
                }
                Event::End(ref e) if e.name().as_ref() == TEXT => {
                    match edit(text.as_str()) {
                        Some(replaced) => {
                            let mut start = start.clone();
                            if needs_preserve(&replaced) && !has_space_attribute(&start) {
                                start.push_attribute(("xml:space", "preserve"));
                            }
                            writer.write_event(Event::Start(start))?;
                            writer.write_event(Event::Text(BytesText::new(&replaced)))?;
                        }
                        None => {
                            writer.write_event(Event::Start(start.clone()))?;
                            for buffered in events.drain(..) {
                                writer.write_event(buffered)?;
                            }
                        }
                    }
                    writer.write_event(event)?;
                    pending = None;
                }
                Event::Eof => {
                    return Err(BatchError::Internal {
                        message: "document ended inside a text element".into(),
                        context: None,
                    });
                }
                other => events.push(other),
            }
            continue;
        }

        match event {
            Event::Start(ref e) if e.name().as_ref() == RUN => {
                run_depth += 1;
                writer.write_event(event)?;
            }
            Event::End(ref e) if e.name().as_ref() == RUN => {
                run_depth = run_depth.saturating_sub(1);
                writer.write_event(event)?;
            }
            Event::Start(e) if run_depth > 0 && e.name().as_ref() == TEXT => {
                pending = Some((e, Vec::new(), String::new()));
            }
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
    }

    Ok(writer.into_inner())
}

fn needs_preserve(text: &str) -> bool {
    text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace)
}

fn has_space_attribute(start: &BytesStart<'_>) -> bool {
    start.attributes().flatten().any(|attr| attr.key.as_ref() == b"xml:space")
}
