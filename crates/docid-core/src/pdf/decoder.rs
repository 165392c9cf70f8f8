//! PDF text decoding using lopdf and pdf-extract.

use lopdf::Document;
use tracing::debug;

use super::{Result, TextDecoder};
use crate::error::DecodeError;

/// A loaded PDF ready for text extraction.
pub struct PdfDocument {
    document: Document,
    raw_data: Vec<u8>,
}

impl PdfDocument {
    /// Load a PDF from bytes.
    ///
    /// Documents encrypted with an empty user password are decrypted;
    /// any other encryption is rejected.
    pub fn load(data: &[u8]) -> Result<Self> {
        let mut document =
            Document::load_mem(data).map_err(|e| DecodeError::Parse(e.to_string()))?;

        let raw_data = if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(DecodeError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract reads bytes, so hand it the decrypted document
            let mut decrypted = Vec::new();
            document
                .save_to(&mut decrypted)
                .map_err(|e| DecodeError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = document.get_pages().len();
        if page_count == 0 {
            return Err(DecodeError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        Ok(Self { document, raw_data })
    }

    /// Get the number of pages in the PDF.
    pub fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    /// Extract text from the entire PDF.
    pub fn extract_text(&self) -> Result<String> {
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| DecodeError::TextExtraction(e.to_string()))
    }
}

/// Text decoder for PDF documents with an embedded text layer.
#[derive(Debug, Clone, Default)]
pub struct PdfTextDecoder;

impl PdfTextDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl TextDecoder for PdfTextDecoder {
    fn decode(&self, data: &[u8]) -> Result<String> {
        let pdf = PdfDocument::load(data)?;
        let text = pdf.extract_text()?;

        debug!(
            "Decoded {} chars of text from {} pages",
            text.len(),
            pdf.page_count()
        );
        Ok(text)
    }
}
