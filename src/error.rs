//! Error taxonomy for drawing generation.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::validate::PanelClass;

pub type DrawingResult<T> = Result<T, DrawingError>;

/// Reason attached to a floor-plan gate failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateReason {
    MissingFloorData,
    EmptyRoomGeometry,
    InsufficientRoomsForInteriorWalls,
}

impl GateReason {
    pub fn code(self) -> &'static str {
        match self {
            Self::MissingFloorData => "MISSING_FLOOR_DATA",
            Self::EmptyRoomGeometry => "EMPTY_ROOM_GEOMETRY",
            Self::InsufficientRoomsForInteriorWalls => "INSUFFICIENT_ROOMS_FOR_INTERIOR_WALLS",
        }
    }
}

/// Structured payload raised by the floor-plan gates before any markup is emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlanValidationError {
    pub floor: u32,
    pub expected_room_count: usize,
    pub actual_room_count: usize,
    pub reason: GateReason,
}

impl fmt::Display for FloorPlanValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on floor {} (expected {} rooms, found {})",
            self.reason.code(),
            self.floor,
            self.expected_room_count,
            self.actual_room_count
        )
    }
}

/// Failures while assembling markup. Always surfaced wrapped in
/// [`DrawingError::Generation`].
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("drawing scale must be positive and finite, got {0}")]
    InvalidScale(f64),
    #[error("non-finite coordinate in {0}")]
    NonFiniteCoordinate(&'static str),
    #[error("canvas has no drawable extent")]
    EmptyCanvas,
}

#[derive(Debug, Error)]
pub enum DrawingError {
    #[error("floor plan rejected: {0}")]
    MissingFloorData(FloorPlanValidationError),

    #[error("floor plan rejected: {0}")]
    EmptyRoomGeometry(FloorPlanValidationError),

    #[error("floor plan rejected: {0}")]
    InsufficientRoomsForInteriorWalls(FloorPlanValidationError),

    #[error("failed to generate {context}")]
    Generation {
        context: String,
        #[source]
        source: AssemblyError,
    },

    #[error("SVG validation failed for {panel:?} panel: {}", errors.join("; "))]
    SvgValidationFailed {
        panel: PanelClass,
        errors: Vec<String>,
    },
}

impl DrawingError {
    pub fn gate(detail: FloorPlanValidationError) -> Self {
        match detail.reason {
            GateReason::MissingFloorData => Self::MissingFloorData(detail),
            GateReason::EmptyRoomGeometry => Self::EmptyRoomGeometry(detail),
            GateReason::InsufficientRoomsForInteriorWalls => {
                Self::InsufficientRoomsForInteriorWalls(detail)
            }
        }
    }

    pub fn generation(context: impl Into<String>, source: AssemblyError) -> Self {
        Self::Generation {
            context: context.into(),
            source,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingFloorData(_) => GateReason::MissingFloorData.code(),
            Self::EmptyRoomGeometry(_) => GateReason::EmptyRoomGeometry.code(),
            Self::InsufficientRoomsForInteriorWalls(_) => {
                GateReason::InsufficientRoomsForInteriorWalls.code()
            }
            Self::Generation { .. } => "GENERATION_ERROR",
            Self::SvgValidationFailed { .. } => "SVG_VALIDATION_FAILED",
        }
    }

    pub fn gate_detail(&self) -> Option<&FloorPlanValidationError> {
        match self {
            Self::MissingFloorData(detail)
            | Self::EmptyRoomGeometry(detail)
            | Self::InsufficientRoomsForInteriorWalls(detail) => Some(detail),
            _ => None,
        }
    }

    /// Every failure may be retried by the orchestrator after regenerating
    /// upstream data. The renderer itself never retries.
    pub fn is_recoverable(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_errors_report_their_codes() {
        let err = DrawingError::gate(FloorPlanValidationError {
            floor: 1,
            expected_room_count: 3,
            actual_room_count: 0,
            reason: GateReason::EmptyRoomGeometry,
        });
        assert_eq!(err.code(), "EMPTY_ROOM_GEOMETRY");
        assert!(matches!(err, DrawingError::EmptyRoomGeometry(_)));
        assert!(err.to_string().contains("expected 3 rooms, found 0"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn generation_error_keeps_cause() {
        let err = DrawingError::generation("floor plan 0", AssemblyError::InvalidScale(-1.0));
        assert_eq!(err.code(), "GENERATION_ERROR");
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(
            source.as_deref(),
            Some("drawing scale must be positive and finite, got -1")
        );
    }
}
