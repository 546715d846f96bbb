//! ArangoDB batch request encoding.
//!
//! A batch is a `multipart/form-data` body; each part carries one raw
//! HTTP request with content type `application/x-arango-batchpart`.

use crate::interfaces::BatchPart;

/// Multipart boundary used for batch requests.
pub const BATCH_BOUNDARY: &str = "XXXsnapshotbatchXXX";

const BATCH_PART_CONTENT_TYPE: &str = "application/x-arango-batchpart";

/// Encode batch parts as a multipart body.
pub fn encode_batch_body(parts: &[BatchPart], boundary: &str) -> String {
    let mut body = String::new();

    for (index, part) in parts.iter().enumerate() {
        body.push_str(&format!("--{boundary}\r\n"));
        body.push_str(&format!("Content-Type: {BATCH_PART_CONTENT_TYPE}\r\n"));
        body.push_str(&format!("Content-Id: {}\r\n\r\n", index + 1));
        body.push_str(&format!("{} {} HTTP/1.1\r\n\r\n", part.method, part.path));
        if let Some(payload) = &part.body {
            body.push_str(payload);
        }
        body.push_str("\r\n");
    }

    body.push_str(&format!("--{boundary}--\r\n"));
    body
}
