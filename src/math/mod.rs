//! Fixed-size linear algebra used by every other subsystem.
//!
//! # Conventions
//! - Right-handed world space, +Y up, the camera looks down -Z.
//! - Column vectors: `Mat4 * Vec4`. `A * B` applies `B` first, then `A`.
//! - Clip space follows OpenGL: NDC z in [-1, 1].
//!
//! Nothing in this module returns an error. Degenerate input (zero-length
//! vectors, singular matrices) produces a safe default, or `None` where the
//! caller needs to know that no answer exists.

pub mod mat4;
pub mod quat;
pub mod scalar;
pub mod vec2;
pub mod vec3;
pub mod vec4;

pub use mat4::Mat4;
pub use quat::Quat;
pub use vec2::Vec2;
pub use vec3::Vec3;
pub use vec4::Vec4;
