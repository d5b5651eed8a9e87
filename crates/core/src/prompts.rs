//! Deterministic prompt shaping applied to structure-call output.
//!
//! The backend returns raw per-scene prompts; before they are handed to the
//! image and video stages every image prompt gets a fixed cinematic-style
//! preamble and every motion directive is pinned to a fast-cut pacing
//! constraint. Shaping happens exactly once, at the gateway, when a
//! structure response is unwrapped -- retried prompts pass through verbatim.

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Preamble prepended to every image prompt.
pub const CINEMATIC_PREFIX: &str = "Cinematic photo, high detail. ";

/// Pacing constraint appended to motion directives.
pub const MOTION_CONSTRAINT: &str =
    "There is no slow motion, and the scene unfolds quickly.";

/// Substring whose presence marks a directive as already constrained.
const MOTION_MARKER: &str = "scene unfolds quickly";

// ---------------------------------------------------------------------------
// Shaping
// ---------------------------------------------------------------------------

/// Prefix an image prompt with the cinematic preamble.
///
/// Always prefixes; callers must apply this once per structure response.
pub fn shape_image_prompt(prompt: &str) -> String {
    format!("{CINEMATIC_PREFIX}{prompt}")
}

/// Append the pacing constraint to a motion directive.
///
/// A no-op when the directive already contains the constraint marker;
/// otherwise appends exactly one instance with a single leading space.
pub fn shape_i2v_prompt(prompt: &str) -> String {
    if prompt.contains(MOTION_MARKER) {
        prompt.to_string()
    } else {
        format!("{prompt} {MOTION_CONSTRAINT}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
