// SPDX-License-Identifier: MIT
//! # img-scale: Bounded-Dimension Downscaling
//!
//! This crate computes and executes the downscale step that runs before an image
//! is uploaded for classification. It has no I/O and no codec dependencies: callers
//! decode to raw RGB8, ask for a plan, and hand both buffers to the CPU scaler.
//!
//! ## Key Components
//!
//! - [`presets`]: Scaling plan computation (longest edge clamped to a limit)
//! - [`cpu`]: CPU resampling built on `fast_image_resize`
//!
//! ## Guarantees
//!
//! - The longest output edge of a non-square image never exceeds the limit
//! - Squares are passed through at their original size
//! - Aspect ratio is preserved to within one pixel of rounding
//! - Images already inside the limit are never upscaled
//!
//! ## Usage Example
//!
//! ```rust
//! use img_scale::presets::{build_plan, Size};
//!
//! let plan = build_plan(Size { w: 2048, h: 1024 }, 512);
//! assert_eq!((plan.out.w, plan.out.h), (512, 256));
//! ```

pub mod cpu;
pub mod presets;
