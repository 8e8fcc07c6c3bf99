// SPDX-License-Identifier: MIT
//! # Scaling Plan Computation
//!
//! Computes the output size for a bounded-dimension downscale. The longest edge
//! is clamped to a limit and the shorter edge follows by the same ratio, so the
//! result is never cropped or padded.
//!
//! ## Rules
//!
//! - Portrait (`h > w`) above the limit: `h = limit`, `w = w * limit / h`
//! - Landscape (`w > h`) above the limit: `w = limit`, `h = h * limit / w`
//! - Anything else is returned unchanged: images already inside the limit
//!   (no upscaling) and squares of any size
//!
//! All computations use `f64` and round to the nearest pixel, clamped to at
//! least 1px so extreme aspect ratios never produce an empty edge.

/// Longest-edge limit applied when nothing else is configured.
pub const DEFAULT_MAX_DIMENSION: u32 = 512;

/// Represents a 2D size with width and height in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    /// Length of the longer edge.
    pub fn long_side(&self) -> u32 {
        self.w.max(self.h)
    }
}

/// Complete scaling plan computed from input parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScalePlan {
    /// Original input dimensions
    pub input: Size,
    /// Limit applied to the longest edge
    pub max_long_side: u32,
    /// Final computed output dimensions
    pub out: Size,
}

impl ScalePlan {
    /// True when the output equals the input and resampling can be skipped.
    pub fn is_identity(&self) -> bool {
        self.input == self.out
    }
}

/// Compute a scaling plan that fits `input` inside `max_long_side`.
///
/// # Performance
/// O(1) computation with minimal floating-point operations
pub fn build_plan(input: Size, max_long_side: u32) -> ScalePlan {
    let (w, h) = fit_preserve(input, max_long_side);
    ScalePlan {
        input,
        max_long_side,
        out: Size { w, h },
    }
}

/// Fit image within max_long constraint while preserving aspect ratio.
/// Only the strictly longer edge is clamped; squares and images already inside
/// the limit keep their original dimensions.
fn fit_preserve(input: Size, max_long: u32) -> (u32, u32) {
    let (w, h) = (input.w as f64, input.h as f64);
    let limit = max_long.max(1);
    let fit = |v: f64| (v.round() as u32).clamp(1, limit);

    if input.h > input.w && input.h > max_long {
        (fit(w * max_long as f64 / h), max_long)
    } else if input.w > input.h && input.w > max_long {
        (max_long, fit(h * max_long as f64 / w))
    } else {
        (input.w, input.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn landscape_clamps_width() {
        let plan = build_plan(Size { w: 1920, h: 1080 }, 512);
        assert_eq!(plan.out, Size { w: 512, h: 288 });
        assert!(!plan.is_identity());
    }

    #[test]
    fn portrait_clamps_height() {
        let plan = build_plan(Size { w: 3000, h: 4000 }, 512);
        assert_eq!(plan.out, Size { w: 384, h: 512 });
    }

    #[test]
    fn small_image_is_untouched() {
        let plan = build_plan(Size { w: 300, h: 200 }, 512);
        assert_eq!(plan.out, Size { w: 300, h: 200 });
        assert!(plan.is_identity());
    }

    #[test]
    fn exactly_at_limit_is_untouched() {
        let plan = build_plan(Size { w: 512, h: 100 }, 512);
        assert!(plan.is_identity());
    }

    #[test]
    fn oversized_square_is_untouched() {
        let plan = build_plan(Size { w: 1000, h: 1000 }, 512);
        assert_eq!(plan.out, Size { w: 1000, h: 1000 });
        assert!(plan.is_identity());
    }

    #[test]
    fn extreme_aspect_keeps_one_pixel() {
        let plan = build_plan(Size { w: 10_000, h: 3 }, 512);
        assert_eq!(plan.out, Size { w: 512, h: 1 });
    }

    proptest! {
        #[test]
        fn longest_edge_equals_limit_when_oversized(
            long in 513u32..8000,
            short_frac in 0.01f64..0.999,
            portrait in any::<bool>(),
        ) {
            let short = ((long as f64 * short_frac) as u32).max(1);
            let input = if portrait { Size { w: short, h: long } } else { Size { w: long, h: short } };
            let plan = build_plan(input, DEFAULT_MAX_DIMENSION);

            prop_assert_eq!(plan.out.long_side(), DEFAULT_MAX_DIMENSION);

            let expected_short = short as f64 * DEFAULT_MAX_DIMENSION as f64 / long as f64;
            let actual_short = (if portrait { plan.out.w } else { plan.out.h }) as f64;
            prop_assert!((actual_short - expected_short).abs() <= 1.0);
        }

        #[test]
        fn squares_keep_their_size(side in 1u32..8000) {
            let plan = build_plan(Size { w: side, h: side }, DEFAULT_MAX_DIMENSION);
            prop_assert!(plan.is_identity());
        }

        #[test]
        fn never_upscales(w in 1u32..=512, h in 1u32..=512) {
            let plan = build_plan(Size { w, h }, 512);
            prop_assert_eq!(plan.out, Size { w, h });
        }
    }
}
