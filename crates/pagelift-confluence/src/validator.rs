//! Storage-format markup validation.
//!
//! Confluence accepts most HTML-ish input but rejects a few common forms,
//! so markup is checked before any mutating call: a lenient structural
//! parse first, then substring checks for void-element forms the store
//! refuses even though a generic HTML parser tolerates them.

use quick_xml::Reader;
use quick_xml::events::Event;

/// Void elements the lenient parse auto-closes. Unclosed occurrences of
/// these are valid HTML and must not fail the structural check.
const AUTO_CLOSE: &[&str] = &[
    "area", "base", "basefont", "br", "col", "frame", "hr", "img", "input", "isindex", "link",
    "meta", "param",
];

/// Markup validation failure.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The markup failed the lenient structural parse.
    #[error("malformed storage markup: {0}")]
    Malformed(String),

    /// The markup parsed cleanly but uses a tag form the store rejects.
    #[error("invalid storage markup: Confluence requires `{required}`")]
    DisallowedTagForm {
        /// The self-closed XHTML form the store expects.
        required: &'static str,
    },
}

/// Check that markup is acceptable to the store.
///
/// Pure, no I/O. Runs before every create and update, never on read.
///
/// # Errors
///
/// Returns [`ValidationError::Malformed`] on a structural parse failure and
/// [`ValidationError::DisallowedTagForm`] when well-formed markup contains a
/// `<br>`/`<br/>` or `<hr>`/`<hr/>` tag.
pub fn check(markup: &str) -> Result<(), ValidationError> {
    lenient_parse(markup)?;

    // Storage format requires explicitly self-closed void elements, with a
    // space before the slash. These checks only apply once the document
    // parsed cleanly.
    if markup.contains("<br>") || markup.contains("<br/>") {
        return Err(ValidationError::DisallowedTagForm { required: "<br />" });
    }
    if markup.contains("<hr>") || markup.contains("<hr/>") {
        return Err(ValidationError::DisallowedTagForm { required: "<hr />" });
    }

    Ok(())
}

/// Structural parse with HTML auto-close rules.
///
/// End-tag matching is tracked here rather than by quick-xml so that void
/// elements may stay unclosed; unknown entity references pass through as
/// events and are tolerated.
fn lenient_parse(markup: &str) -> Result<(), ValidationError> {
    let mut reader = Reader::from_str(markup);
    reader.config_mut().check_end_names = false;

    let mut open: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
                if !AUTO_CLOSE.contains(&tag.as_str()) {
                    open.push(tag);
                }
            }
            Ok(Event::End(e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
                match open.pop() {
                    Some(expected) if expected == tag => {}
                    Some(expected) => {
                        return Err(ValidationError::Malformed(format!(
                            "mismatched close tag </{tag}>, expected </{expected}>"
                        )));
                    }
                    None => {
                        return Err(ValidationError::Malformed(format!(
                            "close tag </{tag}> without a matching open tag"
                        )));
                    }
                }
            }
            Ok(Event::Eof) => {
                if let Some(tag) = open.pop() {
                    return Err(ValidationError::Malformed(format!("unclosed tag <{tag}>")));
                }
                return Ok(());
            }
            Ok(_) => {}
            Err(e) => return Err(ValidationError::Malformed(e.to_string())),
        }
    }
}
