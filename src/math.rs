//! Tiny helpers over `[f32; 2]`, the vector type used for positions and directions.

#[inline]
pub fn add(a: [f32; 2], b: [f32; 2]) -> [f32; 2] {
    [a[0] + b[0], a[1] + b[1]]
}

#[inline]
pub fn sub(a: [f32; 2], b: [f32; 2]) -> [f32; 2] {
    [a[0] - b[0], a[1] - b[1]]
}

#[inline]
pub fn scale(v: [f32; 2], s: f32) -> [f32; 2] {
    [v[0] * s, v[1] * s]
}

#[inline]
pub fn dot(a: [f32; 2], b: [f32; 2]) -> f32 {
    a[0] * b[0] + a[1] * b[1]
}

#[inline]
pub fn length(v: [f32; 2]) -> f32 {
    dot(v, v).sqrt()
}

/// Rotate `v` by `angle` radians. With +y pointing down the screen a positive
/// angle turns clockwise.
#[inline]
pub fn rotate(v: [f32; 2], angle: f32) -> [f32; 2] {
    let (s, c) = angle.sin_cos();
    [v[0] * c - v[1] * s, v[0] * s + v[1] * c]
}

/// Unit-length copy of `v`; zero vectors come back unchanged.
#[inline]
pub fn normalize(v: [f32; 2]) -> [f32; 2] {
    let len = length(v);
    if len > 0.0 { scale(v, 1.0 / len) } else { v }
}
