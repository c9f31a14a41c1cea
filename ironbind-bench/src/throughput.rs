//! Throughput measurement over encoded documents.

use ironbind_codec::{Codec, DecodeError, EncodeError};
use ironbind_core::Document;
use std::time::{Duration, Instant};

/// Result of a throughput run.
#[derive(Debug, Clone)]
pub struct ThroughputResult {
    /// Documents processed.
    pub documents: u64,
    /// XML bytes processed.
    pub bytes: u64,
    /// Total duration.
    pub duration: Duration,
}

impl ThroughputResult {
    /// Returns documents per second.
    #[must_use]
    pub fn documents_per_second(&self) -> f64 {
        self.documents as f64 / self.duration.as_secs_f64()
    }

    /// Returns megabytes of XML per second.
    #[must_use]
    pub fn mb_per_second(&self) -> f64 {
        self.bytes as f64 / self.duration.as_secs_f64() / (1024.0 * 1024.0)
    }
}

/// Decodes `input` `iterations` times.
///
/// # Errors
/// Returns the decode error of the first failing iteration.
pub fn decode_throughput(
    codec: &Codec,
    input: &[u8],
    iterations: u64,
) -> Result<ThroughputResult, DecodeError> {
    let start = Instant::now();
    for _ in 0..iterations {
        std::hint::black_box(codec.decode(std::hint::black_box(input))?);
    }

    Ok(ThroughputResult {
        documents: iterations,
        bytes: iterations * input.len() as u64,
        duration: start.elapsed(),
    })
}

/// Encodes `document` `iterations` times.
///
/// # Errors
/// Returns the encode error of the first failing iteration.
pub fn encode_throughput(
    codec: &Codec,
    document: &Document,
    iterations: u64,
) -> Result<ThroughputResult, EncodeError> {
    let mut bytes = 0u64;
    let start = Instant::now();
    for _ in 0..iterations {
        let encoded = codec.encode(std::hint::black_box(document))?;
        bytes += encoded.len() as u64;
    }

    Ok(ThroughputResult {
        documents: iterations,
        bytes,
        duration: start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{htd_document, keyresponse_codec};

    #[test]
    fn test_throughput_result_rates() {
        let result = ThroughputResult {
            documents: 1000,
            bytes: 1024 * 1024,
            duration: Duration::from_secs(1),
        };
        assert!((result.documents_per_second() - 1000.0).abs() < 0.001);
        assert!((result.mb_per_second() - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_decode_and_encode_throughput() {
        let codec = keyresponse_codec().unwrap();
        let document = htd_document(3, 2, 1);

        let encoded = encode_throughput(&codec, &document, 10).unwrap();
        assert_eq!(encoded.documents, 10);
        let size = codec.encode(&document).unwrap().len() as u64;
        assert_eq!(encoded.bytes, size * 10);

        let input = codec.encode(&document).unwrap();
        let decoded = decode_throughput(&codec, &input, 10).unwrap();
        assert_eq!(decoded.bytes, size * 10);
    }

    #[test]
    fn test_decode_throughput_propagates_errors() {
        let codec = keyresponse_codec().unwrap();
        assert!(decode_throughput(&codec, b"<Unknown/>", 3).is_err());
    }
}
