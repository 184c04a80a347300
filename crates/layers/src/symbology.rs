/// 8-bit RGB color.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_css(self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Marker fill for a group with `total_views` views.
///
/// Red is pinned at max and blue at zero; green falls by 2 per view, so a
/// fresh group is yellow and anything at 128 views or more is pure red.
pub fn heat_color(total_views: u64) -> Rgb {
    let drop = total_views.saturating_mul(2).min(255) as u8;
    Rgb::new(255, 255 - drop, 0)
}

/// Visual constants for markers and their popups.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerStyle {
    /// Marker diameter; the marker is anchored at its center.
    pub size_px: u32,
    pub border_px: u32,
    /// Popup anchor offset from the marker, in pixels.
    pub popup_offset_px: (i32, i32),
    pub popup_max_width_px: u32,
    pub popup_max_height_px: u32,
    /// Preview rows before the "+N more" footer.
    pub max_previews: usize,
    /// Preview text is cut to this many characters.
    pub excerpt_chars: usize,
}

impl MarkerStyle {
    pub const fn new(size_px: u32, max_previews: usize) -> Self {
        Self {
            size_px,
            border_px: 2,
            popup_offset_px: (0, -10),
            popup_max_width_px: 200,
            popup_max_height_px: 300,
            max_previews,
            excerpt_chars: 140,
        }
    }
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self::new(30, 4)
    }
}
