//! Perspective camera, orbit controls and the camera uniform.
//!
//! The camera always looks at a target point. [`OrbitController`] moves the camera on a sphere
//! around that target: left drag rotates, right drag pans in screen space and the wheel dollies.
//! Input only accumulates deltas; they are applied (and damped) in [`OrbitController::update`]
//! once per frame.

use std::f32::consts::{PI, TAU};

use cgmath::{Deg, InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector2, Vector3, Zero};
use instant::Duration;
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Where the camera starts and how it projects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraSetup {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for CameraSetup {
    fn default() -> Self {
        Self {
            position: Point3::new(4.2, 4.0, 4.2),
            target: Point3::new(0.0, 0.0, 0.0),
            fovy: Deg(40.0),
            znear: 0.1,
            zfar: 100.0,
        }
    }
}

impl CameraSetup {
    pub fn build(&self, width: u32, height: u32) -> (Camera, Projection) {
        (
            Camera::new(self.position, self.target),
            Projection::new(width, height, self.fovy, self.znear, self.zfar),
        )
    }
}

/// Keeps the polar angle away from the poles, where the view matrix degenerates.
const POLAR_EPSILON: f32 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>, T: Into<Point3<f32>>>(position: P, target: T) -> Self {
        Self {
            position: position.into(),
            target: target.into(),
            up: Vector3::unit_y(),
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn distance(&self) -> f32 {
        (self.position - self.target).magnitude()
    }

    /// Unit vectors pointing right and up on screen.
    fn screen_axes(&self) -> (Vector3<f32>, Vector3<f32>) {
        let forward = (self.target - self.position).normalize();
        let right = forward.cross(self.up).normalize();
        (right, right.cross(forward))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: OrbitController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DragMode {
    None,
    Rotate,
    Pan,
}

/// Orbit controls with optional damping.
///
/// Angles follow the usual spherical convention around +Y: `theta` is the azimuth measured from
/// +Z towards +X, `phi` the polar angle measured from +Y.
#[derive(Clone, Debug)]
pub struct OrbitController {
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    viewport_height: f32,
    theta_delta: f32,
    phi_delta: f32,
    pan_pixels: Vector2<f32>,
    pan_offset: Vector3<f32>,
    scale: f32,
    drag: DragMode,
    cursor: Option<PhysicalPosition<f64>>,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self {
            rotate_speed: 1.0,
            pan_speed: 1.0,
            zoom_speed: 1.0,
            enable_damping: true,
            damping_factor: 0.05,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            viewport_height: 1.0,
            theta_delta: 0.0,
            phi_delta: 0.0,
            pan_pixels: Vector2::zero(),
            pan_offset: Vector3::zero(),
            scale: 1.0,
            drag: DragMode::None,
            cursor: None,
        }
    }
}

impl OrbitController {
    pub fn new(damping_factor: f32) -> Self {
        Self {
            damping_factor: damping_factor.clamp(0.0, 1.0),
            ..Default::default()
        }
    }

    /// Drag distances are measured relative to the viewport height.
    pub fn set_viewport_height(&mut self, height: u32) {
        if height > 0 {
            self.viewport_height = height as f32;
        }
    }

    /// Rotation for a drag of `dx`, `dy` pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        let height = self.viewport_height;
        self.theta_delta -= TAU * dx / height * self.rotate_speed;
        self.phi_delta -= TAU * dy / height * self.rotate_speed;
    }

    /// Screen-space pan for a drag of `dx`, `dy` pixels.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.pan_pixels += Vector2::new(dx, dy) * self.pan_speed;
    }

    /// Positive steps move towards the target.
    pub fn dolly(&mut self, steps: f32) {
        let zoom_scale = 0.95_f32.powf(self.zoom_speed);
        self.scale *= zoom_scale.powf(steps);
    }

    pub fn is_idle(&self) -> bool {
        self.theta_delta == 0.0
            && self.phi_delta == 0.0
            && self.pan_pixels == Vector2::zero()
            && self.pan_offset == Vector3::zero()
            && self.scale == 1.0
    }

    /// Turns pointer events into rotate, pan and dolly requests. Returns whether the event was
    /// used.
    pub fn handle_window_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = *state == ElementState::Pressed;
                self.drag = match (button, pressed) {
                    (MouseButton::Left, true) => DragMode::Rotate,
                    (MouseButton::Right, true) => DragMode::Pan,
                    (_, false) => DragMode::None,
                    _ => self.drag,
                };
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let previous = self.cursor.replace(*position);
                let Some(previous) = previous else {
                    return false;
                };
                let dx = (position.x - previous.x) as f32;
                let dy = (position.y - previous.y) as f32;
                match self.drag {
                    DragMode::Rotate => self.rotate(dx, dy),
                    DragMode::Pan => self.pan(dx, dy),
                    DragMode::None => return false,
                }
                true
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.drag = DragMode::None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => (position.y as f32).signum(),
                };
                if steps != 0.0 {
                    self.dolly(steps);
                }
                true
            }
            WindowEvent::Resized(size) => {
                self.set_viewport_height(size.height);
                false
            }
            _ => false,
        }
    }

    /// Applies pending input to `camera`.
    ///
    /// With damping, every 60 Hz frame applies `damping_factor` of what is left of the rotation
    /// and pan; the exponent on `dt` makes the decay independent of the actual frame rate.
    pub fn update(&mut self, camera: &mut Camera, fovy: Rad<f32>, dt: Duration) {
        if !self.pan_pixels.is_zero() {
            let (right, up) = camera.screen_axes();
            let target_distance = camera.distance() * (fovy.0 / 2.0).tan();
            let per_pixel = 2.0 * target_distance / self.viewport_height;
            self.pan_offset += right * (-self.pan_pixels.x * per_pixel) + up * (self.pan_pixels.y * per_pixel);
            self.pan_pixels = Vector2::zero();
        }

        let (applied, remaining) = if self.enable_damping {
            let remaining = (1.0 - self.damping_factor).powf(dt.as_secs_f32() * 60.0);
            (1.0 - remaining, remaining)
        } else {
            (1.0, 0.0)
        };

        let mut radius = camera.distance();
        let (mut theta, mut phi) = orbit_angles(camera.position, camera.target);

        theta += self.theta_delta * applied;
        phi += self.phi_delta * applied;
        phi = phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        camera.target += self.pan_offset * applied;
        let offset = Vector3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        camera.position = camera.target + offset;

        self.theta_delta *= remaining;
        self.phi_delta *= remaining;
        self.pan_offset *= remaining;
        self.scale = 1.0;
        // Snap tiny leftovers so an idle controller stays exactly still
        if self.theta_delta.abs() < 1e-7 {
            self.theta_delta = 0.0;
        }
        if self.phi_delta.abs() < 1e-7 {
            self.phi_delta = 0.0;
        }
        if self.pan_offset.magnitude2() < 1e-14 {
            self.pan_offset = Vector3::zero();
        }
    }
}

/// Spherical angles of `position` around `target`, as used by [`OrbitController`].
pub fn orbit_angles(position: Point3<f32>, target: Point3<f32>) -> (f32, f32) {
    let offset = position - target;
    let radius = offset.magnitude();
    if radius == 0.0 {
        return (0.0, PI / 2.0);
    }
    (offset.x.atan2(offset.z), (offset.y / radius).clamp(-1.0, 1.0).acos())
}
