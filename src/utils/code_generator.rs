//! Short code generation.
//!
//! Codes are 6 characters over the URL-safe alphabet `A-Z a-z 0-9 - _`.

use crate::error::AppError;
use serde_json::json;

/// Length of every generated short code.
pub const CODE_LENGTH: usize = 6;

/// URL-safe alphabet, 64 symbols.
const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Source of candidate short codes.
///
/// Generators know nothing about storage; uniqueness is checked by
/// [`crate::application::allocator::CodeAllocator`].
pub trait CodeGenerator: Send + Sync {
    /// Produces one candidate code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the entropy source fails.
    fn generate(&self) -> Result<String, AppError>;
}

/// Cryptographically secure random generator.
///
/// Draws [`CODE_LENGTH`] bytes from the OS random source and maps the low six
/// bits of each byte onto [`ALPHABET`]. 256 is a multiple of 64, so every
/// position is uniform over the alphabet.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> Result<String, AppError> {
        let mut buffer = [0u8; CODE_LENGTH];

        getrandom::fill(&mut buffer).map_err(|e| {
            AppError::internal(
                "Random source unavailable",
                json!({ "reason": e.to_string() }),
            )
        })?;

        Ok(encode(&buffer))
    }
}

fn encode(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| ALPHABET[(b & 0x3f) as usize] as char)
        .collect()
}

/// Returns `true` if `code` has the shape of a generated code.
pub fn is_well_formed(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| ALPHABET.contains(&b))
}
