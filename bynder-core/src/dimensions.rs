//! Target size calculation for resized derivatives
//!
//! Requested sizes use the host's dimension grammar: a plain integer (`200`),
//! `m` to keep the aspect ratio (`200m`), or `c` to crop to the exact box
//! (`200c`). A size that is empty or `0` is unset.

use crate::asset::leading_int;

/// Resolved target size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u64,
    pub height: u64,
    pub crop: bool,
}

impl Dimensions {
    /// Width in dimension grammar; crop mode keeps its `c` suffix
    pub fn width_param(&self) -> String {
        self.param(self.width)
    }

    pub fn height_param(&self) -> String {
        self.param(self.height)
    }

    fn param(&self, value: u64) -> String {
        if self.crop {
            format!("{}c", value)
        } else {
            value.to_string()
        }
    }
}

/// `value * numerator / denominator` without overflow
fn scale(value: u64, numerator: u64, denominator: u64) -> u64 {
    let scaled = u128::from(value) * u128::from(numerator) / u128::from(denominator);
    u64::try_from(scaled).unwrap_or(u64::MAX)
}

fn is_set(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != "0"
}

/// Compute the size to request for an asset of `original_width` x `original_height`.
///
/// The aspect ratio is kept unless both sizes are given without `m`. Crop mode
/// applies when both sizes are given and either has a `c`. A missing size is
/// derived from the original ratio, and the result never exceeds the original.
pub fn calculate_dimensions(
    original_width: u64,
    original_height: u64,
    width: &str,
    height: &str,
) -> Dimensions {
    let both = is_set(width) && is_set(height);
    let suffixes = format!("{}{}", width, height);
    let crop = both && suffixes.contains('c');
    let keep_ratio = !crop && (!both || suffixes.contains('m'));

    let mut w = leading_int(width);
    let mut h = leading_int(height);

    if original_width == 0 || original_height == 0 {
        return Dimensions { width: w, height: h, crop };
    }

    if keep_ratio {
        let (w_req, h_req) = (w.min(original_width), h.min(original_height));
        match (w_req, h_req) {
            (0, 0) => {}
            (w_req, 0) => (w, h) = (w_req, scale(original_height, w_req, original_width)),
            (0, h_req) => (w, h) = (scale(original_width, h_req, original_height), h_req),
            (w_req, h_req) => {
                // Fit inside the requested box
                (w, h) = (w_req, h_req);
                if u128::from(w_req) * u128::from(original_height) <= u128::from(h_req) * u128::from(original_width) {
                    h = scale(original_height, w_req, original_width);
                } else {
                    w = scale(original_width, h_req, original_height);
                }
            }
        }
    }

    if w > original_width {
        h = scale(h, original_width, w);
        w = original_width;
    }
    if h > original_height {
        w = scale(w, original_height, h);
        h = original_height;
    }

    Dimensions { width: w, height: h, crop }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(w: &str, h: &str) -> (u64, u64, bool) {
        let d = calculate_dimensions(1000, 500, w, h);
        (d.width, d.height, d.crop)
    }

    #[test]
    fn test_oversized_width_clamped_to_original() {
        assert_eq!(dims("2000", ""), (1000, 500, false));
    }

    #[test]
    fn test_crop_keeps_suffix() {
        let d = calculate_dimensions(1000, 500, "200c", "100c");
        assert!(d.crop);
        assert_eq!(d.width_param(), "200c");
        assert_eq!(d.height_param(), "100c");
    }

    #[test]
    fn test_single_dimension_is_symmetric() {
        assert_eq!(dims("500", ""), (500, 250, false));
        assert_eq!(dims("", "250"), (500, 250, false));
        assert_eq!(dims("500m", "0"), (500, 250, false));
    }

    #[test]
    fn test_both_with_m_fit_inside_box() {
        assert_eq!(dims("400m", "400m"), (400, 200, false));
        assert_eq!(dims("900m", "100"), (200, 100, false));
    }

    #[test]
    fn test_exact_box_without_suffix() {
        assert_eq!(dims("300", "300"), (300, 300, false));
        assert_eq!(dims("3000", "100"), (1000, 33, false));
        assert_eq!(dims("100", "1000"), (50, 500, false));
    }

    #[test]
    fn test_crop_needs_both_dimensions() {
        assert_eq!(dims("200c", ""), (200, 100, false));
        let d = calculate_dimensions(1000, 500, "2000c", "400");
        assert_eq!((d.width, d.height, d.crop), (1000, 200, true));
        assert_eq!(d.width_param(), "1000c");
    }

    #[test]
    fn test_unknown_original_passes_through() {
        let d = calculate_dimensions(0, 0, "200", "");
        assert_eq!((d.width, d.height), (200, 0));
        assert_eq!(d.height_param(), "0");
    }

    #[test]
    fn test_huge_requests_clamp_without_overflow() {
        assert_eq!(dims("18446744073709551615", ""), (1000, 500, false));
        assert_eq!(dims("", "99999999999999999999999"), (1000, 500, false));
        assert_eq!(
            dims("10000000000000000000m", "10000000000000000000m"),
            (1000, 500, false)
        );
        assert_eq!(
            dims("18446744073709551615", "18446744073709551615"),
            (500, 500, false)
        );
    }

    #[test]
    fn test_nothing_requested() {
        assert_eq!(dims("", ""), (0, 0, false));
    }
}
