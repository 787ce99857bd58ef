use crate::types::{ProgramVariant, Viewport};

/// Projection used to view the full-screen quad.
///
/// The quad is emitted in clip space so the projection never moves pixels; it
/// is still kept in sync with the surface so that aspect-dependent consumers
/// observe the same numbers the host does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Camera {
    Perspective {
        fov_y_degrees: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        near: f32,
        far: f32,
    },
}

impl Camera {
    pub fn perspective(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Camera::Perspective {
            fov_y_degrees,
            aspect,
            near,
            far,
        }
    }

    /// Unit orthographic box covering clip space.
    pub fn unit_orthographic() -> Self {
        Camera::Orthographic {
            left: -1.0,
            right: 1.0,
            top: 1.0,
            bottom: -1.0,
            near: 0.0,
            far: 1.0,
        }
    }

    pub fn for_variant(variant: ProgramVariant, viewport: Viewport) -> Self {
        match variant {
            ProgramVariant::Vortex | ProgramVariant::StarryNight => {
                Camera::perspective(75.0, viewport.aspect(), 0.1, 1000.0)
            }
            ProgramVariant::BlackHole => Camera::unit_orthographic(),
        }
    }

    /// Perspective cameras follow the surface aspect; orthographic ones are
    /// fixed to the unit box.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if let Camera::Perspective { aspect, .. } = self {
            *aspect = viewport.aspect();
        }
    }

    pub fn aspect(&self) -> Option<f32> {
        match self {
            Camera::Perspective { aspect, .. } => Some(*aspect),
            Camera::Orthographic { .. } => None,
        }
    }

    /// Column-major projection matrix with a `[-1, 1]` depth range.
    pub fn projection(&self) -> [[f32; 4]; 4] {
        match *self {
            Camera::Perspective {
                fov_y_degrees,
                aspect,
                near,
                far,
            } => {
                let f = 1.0 / (fov_y_degrees.to_radians() * 0.5).tan();
                let depth = near - far;
                [
                    [f / aspect, 0.0, 0.0, 0.0],
                    [0.0, f, 0.0, 0.0],
                    [0.0, 0.0, (far + near) / depth, -1.0],
                    [0.0, 0.0, 2.0 * far * near / depth, 0.0],
                ]
            }
            Camera::Orthographic {
                left,
                right,
                top,
                bottom,
                near,
                far,
            } => {
                let width = right - left;
                let height = top - bottom;
                let depth = far - near;
                [
                    [2.0 / width, 0.0, 0.0, 0.0],
                    [0.0, 2.0 / height, 0.0, 0.0],
                    [0.0, 0.0, -2.0 / depth, 0.0],
                    [
                        -(right + left) / width,
                        -(top + bottom) / height,
                        -(far + near) / depth,
                        1.0,
                    ],
                ]
            }
        }
    }
}

/// Remembers the last observed host size and reports real changes only.
#[derive(Debug, Clone, Copy)]
pub struct ViewportTracker {
    current: Viewport,
}

impl ViewportTracker {
    pub fn new(initial: Viewport) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> Viewport {
        self.current
    }

    /// Returns the new viewport when it differs from the current one.
    ///
    /// Repeated identical sizes are a no-op. Empty sizes (minimised hosts) are
    /// ignored so the resolution uniform never carries a zero denominator.
    pub fn observe(&mut self, next: Viewport) -> Option<Viewport> {
        if next.is_empty() || next == self.current {
            return None;
        }
        self.current = next;
        Some(next)
    }
}
