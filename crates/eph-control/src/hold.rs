//! An action model that never accelerates.

use eph_core::Vec2;

use crate::{ActionModel, Decision, Diagnostics, PerceptionFrame, TickContext};

/// Always returns the zero action; agents coast at their current velocity.
///
/// Useful in tests and for passive crowds that only occupy space.
pub struct HoldCourse;

impl ActionModel for HoldCourse {
    fn decide_action(&self, frame: &PerceptionFrame<'_>, _ctx: &TickContext<'_>) -> Decision {
        Decision {
            action:      Vec2::ZERO,
            diagnostics: Diagnostics {
                haze: frame.percept.haze.mean(),
                converged: true,
                ..Diagnostics::default()
            },
        }
    }

    fn name(&self) -> &'static str {
        "hold-course"
    }
}
