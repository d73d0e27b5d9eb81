//! Request and response types for image edits.

/// An image edit: source bytes plus instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    /// Instructions for the model.
    pub prompt: String,
    /// Encoded source image.
    pub image: Vec<u8>,
    /// MIME type of `image`.
    pub mime_type: String,
    /// File name reported in the upload.
    pub file_name: String,
}

impl EditRequest {
    /// Create a request for a PNG source image.
    pub fn new(prompt: impl Into<String>, image: Vec<u8>) -> Self {
        Self {
            prompt: prompt.into(),
            image,
            mime_type: "image/png".to_string(),
            file_name: "image.png".to_string(),
        }
    }

    /// Override the MIME type, deriving the file name from it.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        let ext = match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            _ => "png",
        };
        self.file_name = format!("image.{ext}");
        self
    }
}

/// The image a generator produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditedImage {
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`.
    pub mime_type: String,
    /// Prompt as rewritten by the model, when reported.
    pub revised_prompt: Option<String>,
}

impl EditedImage {
    /// Wrap PNG bytes.
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime_type: "image/png".to_string(),
            revised_prompt: None,
        }
    }
}
