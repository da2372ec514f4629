//! Path geometry.
//!
//! A path is laid out in a local frame running along +x from 0 to its length,
//! then rotated by the direction angle and translated to the source endpoint.
//! Width lives on the local y axis, which is the only axis zoom correction
//! touches.

use starmap_engine::coords::Vec2;
use starmap_engine::paint::Color;

/// Dash lengths outside this range are clamped.
pub const DASH_MIN: f32 = 1.0;
pub const DASH_MAX: f32 = 16.0;

/// Solid interval `[start, end]` along the local x axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Span {
    pub start: f32,
    pub end: f32,
}

impl Span {
    #[inline]
    pub const fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.end - self.start
    }
}

/// Dash layout for a line of `length`.
///
/// With `D = clamp(dash_length)`, voids of `V = D / 2` and
/// `n = floor(length / (D + V))` dashes, the slack `E = length - n (D + V)`
/// plus half a void is added to both end dashes, so the line starts and ends
/// solid. Fewer than two dashes degrade to one solid span.
pub fn dash_spans(length: f32, dash_length: f32) -> Vec<Span> {
    let d = dash_length.clamp(DASH_MIN, DASH_MAX);
    let v = d / 2.0;
    let period = d + v;

    let n = (length / period).floor();
    if n.is_nan() || n < 2.0 {
        return vec![Span::new(0.0, length.max(0.0))];
    }

    let n = n as usize;
    let slack = length - n as f32 * period;
    let cap = slack / 2.0 + v / 2.0;

    let mut spans = Vec::with_capacity(n);
    spans.push(Span::new(0.0, cap + d));
    let second = cap + d + v;
    for k in 0..n - 2 {
        let start = second + k as f32 * period;
        spans.push(Span::new(start, start + d));
    }
    spans.push(Span::new(second + (n - 2) as f32 * period, length));
    spans
}

/// One drawable path between two endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct PathGeometry {
    origin: Vec2,
    angle: f32,
    length: f32,
    half_width: f32,
    spans: Vec<Span>,
    y_scale: f32,
    alpha: f32,
    colour: Color,
}

impl PathGeometry {
    /// Continuous line from `from` to `to`, `2 * half_width` wide.
    pub fn solid(from: Vec2, to: Vec2, half_width: f32, colour: Color) -> Self {
        let length = from.distance(to);
        Self::with_spans(from, to, half_width, colour, vec![Span::new(0.0, length)])
    }

    /// Dashed line from `from` to `to`; see [`dash_spans`].
    pub fn dashed(from: Vec2, to: Vec2, dash_length: f32, half_width: f32, colour: Color) -> Self {
        let length = from.distance(to);
        Self::with_spans(from, to, half_width, colour, dash_spans(length, dash_length))
    }

    fn with_spans(from: Vec2, to: Vec2, half_width: f32, colour: Color, spans: Vec<Span>) -> Self {
        Self {
            origin: from,
            angle: (to - from).angle(),
            length: from.distance(to),
            half_width,
            spans,
            y_scale: 1.0,
            alpha: 1.0,
            colour,
        }
    }

    #[inline]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Direction in radians, `atan2(dy, dx)`.
    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.length
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.half_width
    }

    #[inline]
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    #[inline]
    pub fn is_dashed(&self) -> bool {
        self.spans.len() > 1
    }

    #[inline]
    pub fn y_scale(&self) -> f32 {
        self.y_scale
    }

    #[inline]
    pub fn set_y_scale(&mut self, y_scale: f32) {
        self.y_scale = y_scale;
    }

    #[inline]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    #[inline]
    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }

    #[inline]
    pub fn colour(&self) -> Color {
        self.colour
    }

    /// Colour with the path alpha applied (saturating at 1).
    #[inline]
    pub fn draw_colour(&self) -> Color {
        let (_, _, _, a) = self.colour.to_straight();
        self.colour.with_alpha(a * self.alpha)
    }

    /// World-space corners of every span, clockwise from the start edge.
    pub fn quads(&self) -> impl Iterator<Item = [Vec2; 4]> + '_ {
        let hw = self.half_width * self.y_scale;
        self.spans.iter().map(move |s| {
            [
                Vec2::new(s.start, -hw),
                Vec2::new(s.end, -hw),
                Vec2::new(s.end, hw),
                Vec2::new(s.start, hw),
            ]
            .map(|p| p.rotated(self.angle) + self.origin)
        })
    }
}
