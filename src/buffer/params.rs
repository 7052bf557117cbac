use crate::float_types::Real;

/// Shape of the curve at the ends of buffered lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EndCapStyle {
    /// Semicircular cap, radius = buffer distance
    #[default]
    Round,
    /// Cap cut off flush with the line end
    Flat,
    /// Square cap projecting one buffer distance past the line end
    Square,
}

/// Shape of the curve at convex vertices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JoinStyle {
    /// Circular-arc fillet
    #[default]
    Round,
    /// Extend offset segments to their intersection, up to the mitre limit
    Mitre,
    /// Connect offset segments directly
    Bevel,
}

/// The knobs of a buffer computation. Plain value object: variants with one
/// field overridden are made by copying.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BufferParams {
    /// Number of line segments used to approximate a quarter circle.
    pub quadrant_segments: u32,
    pub end_cap_style: EndCapStyle,
    pub join_style: JoinStyle,
    /// Maximum ratio of mitre length to buffer distance before the join is
    /// beveled off.
    pub mitre_limit: Real,
    /// Buffer only one side of the input line.
    pub single_sided: bool,
    /// Fraction of the buffer distance used as the input simplification
    /// tolerance.
    pub simplify_factor: Real,
}

impl Default for BufferParams {
    fn default() -> Self {
        Self {
            quadrant_segments: BufferParams::DEFAULT_QUADRANT_SEGMENTS,
            end_cap_style: EndCapStyle::Round,
            join_style: JoinStyle::Round,
            mitre_limit: BufferParams::DEFAULT_MITRE_LIMIT,
            single_sided: false,
            simplify_factor: BufferParams::DEFAULT_SIMPLIFY_FACTOR,
        }
    }
}

impl BufferParams {
    pub const DEFAULT_QUADRANT_SEGMENTS: u32 = 8;
    pub const DEFAULT_MITRE_LIMIT: Real = 5.0;
    pub const DEFAULT_SIMPLIFY_FACTOR: Real = 0.01;

    pub fn with_quadrant_segments(mut self, quadrant_segments: u32) -> Self {
        self.quadrant_segments = quadrant_segments.max(1);
        self
    }

    pub fn with_end_cap_style(mut self, end_cap_style: EndCapStyle) -> Self {
        self.end_cap_style = end_cap_style;
        self
    }

    pub fn with_join_style(mut self, join_style: JoinStyle) -> Self {
        self.join_style = join_style;
        self
    }

    pub fn with_mitre_limit(mut self, mitre_limit: Real) -> Self {
        self.mitre_limit = mitre_limit;
        self
    }

    pub fn with_single_sided(mut self, single_sided: bool) -> Self {
        self.single_sided = single_sided;
        self
    }

    pub fn with_simplify_factor(mut self, simplify_factor: Real) -> Self {
        self.simplify_factor = simplify_factor.max(0.0);
        self
    }
}
