/// What the cone-tracing pass outputs. Cycled at runtime.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum ShadingMode {
    /// Direct light plus indirect diffuse and specular.
    #[default]
    Full,
    Direct,
    IndirectDiffuse,
    IndirectSpecular,
    /// Raw voxel grid contents sampled at the surface.
    Voxels,
    AmbientOcclusion,
}

impl ShadingMode {
    pub const COUNT: u32 = 6;

    const ALL: [ShadingMode; 6] = [
        ShadingMode::Full,
        ShadingMode::Direct,
        ShadingMode::IndirectDiffuse,
        ShadingMode::IndirectSpecular,
        ShadingMode::Voxels,
        ShadingMode::AmbientOcclusion,
    ];

    /// Index uploaded to the shader's `mode` uniform.
    pub fn index(self) -> u32 {
        self as u32
    }

    /// Wraps out-of-range indices.
    pub fn from_index(index: u32) -> Self {
        Self::ALL[(index % Self::COUNT) as usize]
    }

    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_wraps_after_six() {
        let mut mode = ShadingMode::default();
        for expected in 1..=ShadingMode::COUNT {
            mode = mode.next();
            assert_eq!(mode.index(), expected % ShadingMode::COUNT);
        }
        assert_eq!(mode, ShadingMode::Full);
    }

    #[test]
    fn indices_match_shader_branches() {
        assert_eq!(ShadingMode::Direct.index(), 1);
        assert_eq!(ShadingMode::Voxels.index(), 4);
        assert_eq!(ShadingMode::from_index(11), ShadingMode::AmbientOcclusion);
    }
}
