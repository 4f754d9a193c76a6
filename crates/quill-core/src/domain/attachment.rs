//! Attachment inputs carried by mutation requests.

/// An uploaded file, fully read from the request before any record is written.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Original client-side file name; only its extension is preserved.
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

/// Explicit three-way image input for an update.
///
/// The choice is tagged rather than inferred from absent form fields, so
/// "keep the current image" and "clear the image" can never be confused.
#[derive(Debug, Clone)]
pub enum ImageChange {
    /// Store a new file and replace the previous reference.
    Replace(Upload),
    /// Keep the echoed prior reference untouched.
    Keep(String),
    /// Clear the image to null.
    Clear,
}
