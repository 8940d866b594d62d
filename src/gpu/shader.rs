//! WGSL for the instanced stone pass.

use bytemuck::{Pod, Zeroable};

/// Mirrors `Uniforms` in [`STONE_SHADER`].
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
    /// xyz: unit direction toward the light, w: intensity.
    pub light: [f32; 4],
    /// rgb: stone albedo, w: ambient intensity.
    pub color: [f32; 4],
}

pub(crate) const STONE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    light: vec4<f32>,
    color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) normal: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * model * vec4<f32>(vertex.position, 1.0);
    // Stones are scaled uniformly, so the model matrix keeps normals perpendicular.
    out.normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.normal);
    let diffuse = max(dot(n, uniforms.light.xyz), 0.0) * uniforms.light.w;
    let lit = uniforms.color.rgb * (uniforms.color.w + diffuse);
    return vec4<f32>(lit, 1.0);
}
"#;
