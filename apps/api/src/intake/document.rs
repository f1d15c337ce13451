//! Uploaded job-description documents.

use bytes::Bytes;

use crate::errors::AppError;

pub const UNSUPPORTED_TYPE_MESSAGE: &str =
    "Unsupported file format. Please upload a .txt or .pdf file";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    PlainText,
    Pdf,
}

impl DocumentKind {
    /// Maps a declared MIME type (parameters such as `charset` ignored) to a supported kind.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "text/plain" => Some(DocumentKind::PlainText),
            "application/pdf" => Some(DocumentKind::Pdf),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadedDocument {
    pub fn kind(&self) -> Result<DocumentKind, AppError> {
        DocumentKind::from_content_type(&self.content_type)
            .ok_or_else(|| AppError::Validation(UNSUPPORTED_TYPE_MESSAGE.to_string()))
    }

    /// Text to place in the intake draft.
    ///
    /// PDF files are not parsed; they contribute a placeholder naming the file.
    pub fn draft_text(&self) -> Result<String, AppError> {
        match self.kind()? {
            DocumentKind::PlainText => String::from_utf8(self.bytes.to_vec()).map_err(|_| {
                AppError::Validation(format!("{} is not valid UTF-8 text", self.file_name))
            }),
            DocumentKind::Pdf => Ok(format!("[Contents of PDF {}]", self.file_name)),
        }
    }
}
