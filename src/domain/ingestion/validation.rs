//! Validation helpers for ingestion

use crate::domain::DomainError;

/// Upper bound accepted for any chunk size
pub const MAX_CHUNK_SIZE: usize = 100_000;

/// Validate chunk size parameters
pub fn validate_chunk_params(chunk_size: usize, chunk_overlap: usize) -> Result<(), DomainError> {
    if chunk_size == 0 {
        return Err(DomainError::invalid_splitter_configuration(
            "chunk_size must be greater than 0",
        ));
    }

    if chunk_size > MAX_CHUNK_SIZE {
        return Err(DomainError::invalid_splitter_configuration(format!(
            "chunk_size cannot exceed {}",
            MAX_CHUNK_SIZE
        )));
    }

    if chunk_overlap >= chunk_size {
        return Err(DomainError::invalid_splitter_configuration(format!(
            "chunk_overlap ({}) must be less than chunk_size ({})",
            chunk_overlap, chunk_size
        )));
    }

    Ok(())
}

/// Validate an uploaded file's size before it is ingested
pub fn validate_upload_size(size: u64, max_file_size: u64) -> Result<(), DomainError> {
    if size == 0 {
        return Err(DomainError::validation("Uploaded file is empty"));
    }

    if size > max_file_size {
        return Err(DomainError::validation(format!(
            "Uploaded file is {} bytes, exceeding the {} byte limit",
            size, max_file_size
        )));
    }

    Ok(())
}

/// Validate pagination parameters for chunk listings
pub fn validate_page(limit: usize) -> Result<(), DomainError> {
    if limit == 0 {
        return Err(DomainError::validation("limit must be greater than 0"));
    }

    if limit > 1000 {
        return Err(DomainError::validation("limit cannot exceed 1000"));
    }

    Ok(())
}
