use bevy::{
    pbr::{MaterialPipeline, MaterialPipelineKey},
    prelude::*,
    reflect::TypePath,
    render::{
        mesh::MeshVertexBufferLayoutRef,
        render_resource::{
            AsBindGroup, BlendComponent, BlendFactor, BlendOperation, BlendState,
            ColorTargetState, RenderPipelineDescriptor, ShaderDefVal, ShaderRef, ShaderType,
            SpecializedMeshPipelineError,
        },
    },
};
use bytemuck::{Pod, Zeroable};

const SHADER_ASSET_PATH: &str = "shaders/galaxy_points.wgsl";

/// `dst + src` on color. `AlphaMode::Add` alone only gets premultiplied alpha
/// blending, which still covers the destination when the fragment alpha is 1.
const ADDITIVE_BLENDING: BlendState = BlendState {
    color: BlendComponent {
        src_factor: BlendFactor::One,
        dst_factor: BlendFactor::One,
        operation: BlendOperation::Add,
    },
    alpha: BlendComponent::OVER,
};

pub struct PointMaterialPlugin;

impl Plugin for PointMaterialPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(MaterialPlugin::<GalaxyPointMaterial> {
            prepass_enabled: false,
            shadows_enabled: false,
            ..default()
        });
    }
}

/// How a particle system is drawn. Nothing here feeds back into generation.
#[derive(Clone, Debug, PartialEq)]
pub struct PointStyle {
    pub size: f32,
    pub size_attenuation: bool,
    pub depth_write: bool,
    pub additive: bool,
    pub vertex_colors: bool,
    /// Used when `vertex_colors` is off
    pub color: [f32; 3],
}

impl PointStyle {
    pub fn star_field(size: f32) -> Self {
        Self {
            size,
            size_attenuation: true,
            depth_write: false,
            additive: true,
            vertex_colors: true,
            color: [1.0; 3],
        }
    }

    pub fn flat(size: f32, color: [f32; 3]) -> Self {
        Self {
            vertex_colors: false,
            color,
            ..Self::star_field(size)
        }
    }
}

// Duplicated in galaxy_points.wgsl, so make sure to update both
#[derive(ShaderType, Pod, Zeroable, Clone, Copy, Debug)]
#[repr(C)]
struct PointParams {
    flat_color: Vec4,
    size: f32,
    pad: Vec3,
}

#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
#[bind_group_data(PointMaterialKey)]
pub struct GalaxyPointMaterial {
    #[uniform(0)]
    params: PointParams,
    alpha_mode: AlphaMode,
    size_attenuation: bool,
    vertex_colors: bool,
    depth_write: bool,
    additive: bool,
}

impl GalaxyPointMaterial {
    pub fn new(style: &PointStyle) -> Self {
        let [r, g, b] = style.color;
        Self {
            params: PointParams {
                flat_color: vec4(r, g, b, 1.0),
                size: style.size,
                pad: Vec3::ZERO,
            },
            alpha_mode: if style.additive {
                AlphaMode::Add
            } else {
                AlphaMode::Blend
            },
            size_attenuation: style.size_attenuation,
            vertex_colors: style.vertex_colors,
            depth_write: style.depth_write,
            additive: style.additive,
        }
    }
}

fn blend_color_targets(targets: &mut [Option<ColorTargetState>], additive: bool) {
    if !additive {
        return;
    }
    for target in targets.iter_mut().flatten() {
        target.blend = Some(ADDITIVE_BLENDING);
    }
}

impl Material for GalaxyPointMaterial {
    fn vertex_shader() -> ShaderRef {
        SHADER_ASSET_PATH.into()
    }

    fn fragment_shader() -> ShaderRef {
        SHADER_ASSET_PATH.into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        self.alpha_mode
    }

    fn specialize(
        _pipeline: &MaterialPipeline<Self>,
        descriptor: &mut RenderPipelineDescriptor,
        layout: &MeshVertexBufferLayoutRef,
        key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        let mut attributes = vec![
            Mesh::ATTRIBUTE_POSITION.at_shader_location(0),
            Mesh::ATTRIBUTE_UV_0.at_shader_location(1),
        ];
        let mut shader_defs: Vec<ShaderDefVal> = Vec::new();

        if key.bind_group_data.vertex_colors {
            attributes.push(Mesh::ATTRIBUTE_COLOR.at_shader_location(2));
            shader_defs.push("VERTEX_COLORS".into());
        }
        if key.bind_group_data.size_attenuation {
            shader_defs.push("SIZE_ATTENUATION".into());
        }

        descriptor.vertex.buffers = vec![layout.0.get_layout(&attributes)?];
        descriptor.vertex.shader_defs.extend(shader_defs.iter().cloned());
        if let Some(fragment) = descriptor.fragment.as_mut() {
            fragment.shader_defs.extend(shader_defs);
            blend_color_targets(&mut fragment.targets, key.bind_group_data.additive);
        }

        // quads are built facing the camera, winding is irrelevant
        descriptor.primitive.cull_mode = None;
        if let Some(depth_stencil) = descriptor.depth_stencil.as_mut() {
            depth_stencil.depth_write_enabled = key.bind_group_data.depth_write;
        }
        Ok(())
    }
}

#[derive(Eq, PartialEq, Hash, Clone)]
pub struct PointMaterialKey {
    size_attenuation: bool,
    vertex_colors: bool,
    depth_write: bool,
    additive: bool,
}

impl From<&GalaxyPointMaterial> for PointMaterialKey {
    fn from(material: &GalaxyPointMaterial) -> Self {
        Self {
            size_attenuation: material.size_attenuation,
            vertex_colors: material.vertex_colors,
            depth_write: material.depth_write,
            additive: material.additive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::render::render_resource::{ColorWrites, TextureFormat};

    fn factor(factor: BlendFactor, src: [f32; 4], dst: [f32; 4]) -> f32 {
        match factor {
            BlendFactor::One => 1.0,
            BlendFactor::Zero => 0.0,
            BlendFactor::SrcAlpha => src[3],
            BlendFactor::OneMinusSrcAlpha => 1.0 - src[3],
            BlendFactor::DstAlpha => dst[3],
            BlendFactor::OneMinusDstAlpha => 1.0 - dst[3],
            other => panic!("unexpected blend factor {other:?}"),
        }
    }

    fn blend_rgb(blend: BlendState, src: [f32; 4], dst: [f32; 4]) -> [f32; 3] {
        assert_eq!(blend.color.operation, BlendOperation::Add);
        let s = factor(blend.color.src_factor, src, dst);
        let d = factor(blend.color.dst_factor, src, dst);
        [0, 1, 2].map(|i| src[i] * s + dst[i] * d)
    }

    fn transparent_target() -> Option<ColorTargetState> {
        Some(ColorTargetState {
            format: TextureFormat::Rgba16Float,
            blend: Some(BlendState::PREMULTIPLIED_ALPHA_BLENDING),
            write_mask: ColorWrites::ALL,
        })
    }

    #[test]
    fn star_field_style_blends_additively_without_depth_writes() {
        let material = GalaxyPointMaterial::new(&PointStyle::star_field(0.02));
        assert_eq!(material.alpha_mode(), AlphaMode::Add);
        assert!(material.vertex_colors);
        assert_eq!(material.params.size, 0.02);

        let key = PointMaterialKey::from(&material);
        assert!(!key.depth_write);
        assert!(key.size_attenuation);
        assert!(key.additive);
    }

    #[test]
    fn additive_targets_keep_what_is_behind() {
        let material = GalaxyPointMaterial::new(&PointStyle::star_field(0.02));
        let key = PointMaterialKey::from(&material);
        let mut targets = vec![transparent_target()];
        blend_color_targets(&mut targets, key.additive);

        let blend = targets[0].as_ref().and_then(|t| t.blend).unwrap();
        assert_eq!(blend.color.src_factor, BlendFactor::One);
        assert_eq!(blend.color.dst_factor, BlendFactor::One);

        // particle colors carry alpha 1
        let rgb = blend_rgb(blend, [0.2, 0.1, 0.05, 1.0], [0.5, 0.5, 0.5, 1.0]);
        for (got, want) in rgb.iter().zip([0.7, 0.6, 0.55]) {
            assert!((got - want).abs() < 1e-6, "{rgb:?}");
        }
    }

    #[test]
    fn center_style_is_additive_too() {
        let material = GalaxyPointMaterial::new(&PointStyle::flat(0.01, [1.0, 0.8, 0.5]));
        let mut targets = vec![transparent_target(), None];
        blend_color_targets(&mut targets, PointMaterialKey::from(&material).additive);
        assert_eq!(
            targets[0].as_ref().and_then(|t| t.blend),
            Some(ADDITIVE_BLENDING)
        );
        assert!(targets[1].is_none());
    }

    #[test]
    fn non_additive_targets_are_left_alone() {
        let mut targets = vec![transparent_target()];
        blend_color_targets(&mut targets, false);
        assert_eq!(
            targets[0].as_ref().and_then(|t| t.blend),
            Some(BlendState::PREMULTIPLIED_ALPHA_BLENDING)
        );
    }

    #[test]
    fn flat_style_carries_its_color() {
        let material = GalaxyPointMaterial::new(&PointStyle::flat(0.01, [0.5, 0.25, 1.0]));
        assert!(!material.vertex_colors);
        assert_eq!(material.params.flat_color, vec4(0.5, 0.25, 1.0, 1.0));
    }
}
