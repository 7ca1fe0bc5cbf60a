// SPDX-License-Identifier: MPL-2.0
//! Scale and crop planning for fitting decoded images onto the display.
//!
//! The hardware scaler only accepts factors in 1/8 steps between 1/8 and 16,
//! so every computed factor is quantized before use.

use super::ImageInfo;
use crate::error::{Error, Result};

const SCALE_STEP: f32 = 0.125;
const MIN_SCALE: f32 = 0.125;
const MAX_SCALE: f32 = 16.0;

/// How an image is mapped onto the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleMode {
    /// Scale down to fit, cropping whatever still overflows after quantization.
    Fit,
    /// Scale to cover the display, cropping the overflow.
    Fill,
    /// Keep at 1:1 when it fits, otherwise scale down.
    Center,
    /// Cut the centered display-sized window without scaling.
    CropOnly,
}

impl ScaleMode {
    /// Mode used by the album for an image of `src` size on a `dst` display.
    ///
    /// Images that fit are centered. Oversized landscape images are cropped,
    /// oversized portrait images are scaled down.
    #[must_use]
    pub fn for_display(src: ImageInfo, dst: ImageInfo) -> Self {
        if src.fits_within(dst) {
            Self::Center
        } else if src.is_landscape() {
            Self::CropOnly
        } else {
            Self::Fit
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOp {
    Scale,
    Crop,
    ScaleCrop,
}

/// Source rectangle cut before scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessPlan {
    pub mode: ScaleMode,
    pub operation: ProcessOp,
    pub crop: CropRect,
    pub scale: f32,
    /// Output dimensions.
    pub target: ImageInfo,
}

impl ProcessPlan {
    /// Computes the plan for mapping `src` onto `dst`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if either size has a zero side.
    pub fn compute(src: ImageInfo, dst: ImageInfo, mode: ScaleMode) -> Result<Self> {
        if src.width == 0 || src.height == 0 || dst.width == 0 || dst.height == 0 {
            return Err(Error::InvalidArgument(format!(
                "cannot plan {}x{} onto {}x{}",
                src.width, src.height, dst.width, dst.height
            )));
        }

        let full = CropRect {
            x: 0,
            y: 0,
            width: src.width,
            height: src.height,
        };
        let scale_x = dst.width as f32 / src.width as f32;
        let scale_y = dst.height as f32 / src.height as f32;

        let plan = match mode {
            ScaleMode::Fit => {
                let scale = quantize(scale_x.min(scale_y));
                let (crop, target) = crop_overflow(src, dst, scale);
                Self {
                    mode,
                    operation: ProcessOp::ScaleCrop,
                    crop,
                    scale,
                    target,
                }
            }
            ScaleMode::Fill => {
                let scale = quantize(scale_x.max(scale_y));
                let (crop, target) = crop_overflow(src, dst, scale);
                Self {
                    mode,
                    operation: ProcessOp::ScaleCrop,
                    crop,
                    scale,
                    target,
                }
            }
            ScaleMode::Center if src.fits_within(dst) => Self {
                mode,
                operation: ProcessOp::Scale,
                crop: full,
                scale: 1.0,
                target: src,
            },
            ScaleMode::Center => {
                let scale = quantize(scale_x.min(scale_y));
                Self {
                    mode,
                    operation: ProcessOp::Scale,
                    crop: full,
                    scale,
                    target: scaled(src, scale),
                }
            }
            ScaleMode::CropOnly => {
                // Never cut outside the source.
                let width = dst.width.min(src.width);
                let height = dst.height.min(src.height);
                Self {
                    mode,
                    operation: ProcessOp::Crop,
                    crop: CropRect {
                        x: (src.width - width) / 2,
                        y: (src.height - height) / 2,
                        width,
                        height,
                    },
                    scale: 1.0,
                    target: ImageInfo::new(width, height),
                }
            }
        };
        Ok(plan)
    }

    /// True when applying the plan to `src` would return it unchanged.
    #[must_use]
    pub fn is_identity_for(&self, src: ImageInfo) -> bool {
        self.crop.x == 0
            && self.crop.y == 0
            && self.crop.width == src.width
            && self.crop.height == src.height
            && self.target == src
    }
}

fn quantize(scale: f32) -> f32 {
    ((scale / SCALE_STEP).round() * SCALE_STEP).clamp(MIN_SCALE, MAX_SCALE)
}

fn scaled(src: ImageInfo, scale: f32) -> ImageInfo {
    ImageInfo::new(
        ((src.width as f32 * scale) as u32).max(1),
        ((src.height as f32 * scale) as u32).max(1),
    )
}

/// Crops the source so that, once scaled, it no longer exceeds `dst`.
fn crop_overflow(src: ImageInfo, dst: ImageInfo, scale: f32) -> (CropRect, ImageInfo) {
    let out = scaled(src, scale);
    let mut crop = CropRect {
        x: 0,
        y: 0,
        width: src.width,
        height: src.height,
    };
    let mut target = out;

    if out.width > dst.width {
        crop.width = ((dst.width as f32 / scale) as u32).clamp(1, src.width);
        crop.x = (src.width - crop.width) / 2;
        target.width = dst.width;
    }
    if out.height > dst.height {
        crop.height = ((dst.height as f32 / scale) as u32).clamp(1, src.height);
        crop.y = (src.height - crop.height) / 2;
        target.height = dst.height;
    }
    (crop, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: ImageInfo = ImageInfo {
        width: 1024,
        height: 600,
    };

    #[test]
    fn mode_selection_follows_orientation() {
        assert_eq!(
            ScaleMode::for_display(ImageInfo::new(800, 600), SCREEN),
            ScaleMode::Center
        );
        assert_eq!(
            ScaleMode::for_display(ImageInfo::new(1920, 1080), SCREEN),
            ScaleMode::CropOnly
        );
        assert_eq!(
            ScaleMode::for_display(ImageInfo::new(1080, 1920), SCREEN),
            ScaleMode::Fit
        );
    }

    #[test]
    fn crop_only_centers_display_window() {
        let src = ImageInfo::new(1920, 1080);
        let plan = ProcessPlan::compute(src, SCREEN, ScaleMode::CropOnly).expect("plan");

        assert_eq!(plan.operation, ProcessOp::Crop);
        assert_eq!(plan.target, SCREEN);
        assert_eq!(plan.crop.x, (1920 - 1024) / 2);
        assert_eq!(plan.crop.y, (1080 - 600) / 2);
        assert_eq!((plan.crop.width, plan.crop.height), (1024, 600));
    }

    #[test]
    fn crop_only_never_exceeds_source() {
        let src = ImageInfo::new(2000, 400);
        let plan = ProcessPlan::compute(src, SCREEN, ScaleMode::CropOnly).expect("plan");
        assert_eq!(plan.crop.height, 400);
        assert_eq!(plan.crop.y, 0);
        assert_eq!(plan.target, ImageInfo::new(1024, 400));
    }

    #[test]
    fn center_on_fitting_image_is_identity() {
        let src = ImageInfo::new(640, 480);
        let plan = ProcessPlan::compute(src, SCREEN, ScaleMode::Center).expect("plan");
        assert!(plan.is_identity_for(src));
        assert_eq!(plan.scale, 1.0);
    }

    #[test]
    fn fit_portrait_overflow_stays_within_display() {
        let src = ImageInfo::new(1200, 2400);
        let plan = ProcessPlan::compute(src, SCREEN, ScaleMode::Fit).expect("plan");

        assert!(plan.target.fits_within(SCREEN));
        assert_eq!(plan.scale, 0.25);
        assert_eq!(plan.target, ImageInfo::new(300, 600));
        assert!(!plan.is_identity_for(src));
    }

    #[test]
    fn fit_crops_what_quantization_leaves_over() {
        let src = ImageInfo::new(1080, 1920);
        let plan = ProcessPlan::compute(src, SCREEN, ScaleMode::Fit).expect("plan");

        assert!(plan.target.fits_within(SCREEN));
        assert_eq!(plan.scale % SCALE_STEP, 0.0);
        assert!(plan.crop.height < src.height);
    }

    #[test]
    fn fill_covers_display() {
        let src = ImageInfo::new(512, 200);
        let plan = ProcessPlan::compute(src, SCREEN, ScaleMode::Fill).expect("plan");
        assert_eq!(plan.scale, 3.0);
        assert_eq!(plan.target, SCREEN);
        assert_eq!(plan.crop.width, 341);
    }

    #[test]
    fn zero_sized_input_is_rejected() {
        let result = ProcessPlan::compute(ImageInfo::new(0, 10), SCREEN, ScaleMode::Fit);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }
}
