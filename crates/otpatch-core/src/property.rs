//! Embedded `name=value` property rewriting.
//!
//! The client carries its service URLs as plain ASCII text inside the
//! executable: a `name=` marker followed by the value and a line terminator.
//! The existing value's byte span is the hard capacity for any replacement;
//! shorter values are padded with spaces to exactly that span so no other
//! byte in the file moves. This is the part of the patcher where a one-byte
//! miscalculation produces a broken client, so every rewrite re-checks the
//! buffer length itself on top of the pipeline's final check.

use tracing::{debug, info};

use crate::buffer::PatchBuffer;
use crate::error::{Error, Result};
use crate::report::PatchOutcome;

/// Padding byte appended after a shorter replacement value.
pub const PADDING_BYTE: u8 = b' ';

/// A property to rewrite and the value it should hold.
#[derive(Debug, Clone)]
pub struct PropertySpec {
    pub name: String,
    pub desired_value: String,
    pub mandatory: bool,
}

impl PropertySpec {
    pub fn new(name: impl Into<String>, desired_value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            desired_value: desired_value.into(),
            mandatory: false,
        }
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    fn marker(&self) -> Vec<u8> {
        format!("{}=", self.name).into_bytes()
    }

    /// Scan for this property's marker and derive its value span.
    ///
    /// `None` when the marker is absent, or present but with no line
    /// terminator after it (not a real property line).
    pub fn locate(&self, buffer: &PatchBuffer) -> Option<PropertyOccurrence> {
        let marker = self.marker();
        let marker_span = buffer.find_span(0, &marker)?;
        let value_start = marker_span.end;
        let newline = buffer.next_newline(value_start)?;

        // The client uses CRLF line endings; the CR belongs to the
        // terminator, never to the value span.
        let mut value_end = newline;
        if value_end > value_start && buffer.byte_at(value_end - 1) == Some(b'\r') {
            value_end -= 1;
        }

        let current_value =
            String::from_utf8_lossy(&buffer.as_slice()[value_start..value_end]).into_owned();

        Some(PropertyOccurrence {
            marker_offset: marker_span.start,
            value_start,
            value_end,
            current_value,
        })
    }

    /// Rewrite the property value in place, padded to the existing span.
    ///
    /// An already-correct value is rewritten all the same; the operation is
    /// idempotent by construction and needs no special case. Mandatory-miss
    /// handling belongs to the orchestrator.
    pub fn apply(&self, buffer: &mut PatchBuffer) -> Result<PatchOutcome> {
        let Some(occurrence) = self.locate(buffer) else {
            debug!("Property marker '{}=' not present", self.name);
            return Ok(PatchOutcome::NotFound);
        };

        let capacity = occurrence.capacity();
        if self.desired_value.len() > capacity {
            return Err(Error::CapacityExceeded {
                name: self.name.clone(),
                desired: self.desired_value.clone(),
                capacity,
            });
        }

        debug!(
            "Property '{}' found at offset {:#x}, current value '{}' (capacity {})",
            self.name,
            occurrence.marker_offset,
            occurrence.current_value.trim_end(),
            capacity,
        );

        let mut replacement = Vec::with_capacity(capacity);
        replacement.extend_from_slice(self.desired_value.as_bytes());
        replacement.resize(capacity, PADDING_BYTE);

        let before = buffer.len();
        buffer.splice(occurrence.value_start..occurrence.value_end, &replacement);
        let after = buffer.len();

        // Self-check on every splice. A mismatch here is a patcher bug, not
        // bad input, and must stop everything before anything is written.
        if after != before {
            return Err(Error::SizeInvariantViolated { before, after });
        }

        info!("Property '{}' set to '{}'", self.name, self.desired_value);
        Ok(PatchOutcome::Patched)
    }
}

/// Where a property lives in the buffer, derived at scan time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyOccurrence {
    pub marker_offset: usize,
    pub value_start: usize,
    pub value_end: usize,
    pub current_value: String,
}

impl PropertyOccurrence {
    /// Maximum byte length a replacement value may occupy.
    pub fn capacity(&self) -> usize {
        self.value_end - self.value_start
    }
}
