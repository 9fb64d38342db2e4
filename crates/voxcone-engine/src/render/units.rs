use crate::error::BindError;

/// A sampled texture as one bind-group slot pair (view + sampler).
#[derive(Debug, Clone)]
pub struct TextureBinding {
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub dimension: wgpu::TextureViewDimension,
}

/// Fixed-size table of texture units.
///
/// Passes bind resources to numbered units, then assemble bind groups from
/// whatever is bound. The table size comes from the device limit on sampled
/// textures per shader stage, and binding past it is rejected without
/// touching the table.
#[derive(Debug, Clone)]
pub struct TextureUnits<T = TextureBinding> {
    slots: Vec<Option<T>>,
}

impl<T> TextureUnits<T> {
    pub fn new(max_units: u32) -> Self {
        Self {
            slots: (0..max_units).map(|_| None).collect(),
        }
    }

    pub fn from_limits(limits: &wgpu::Limits) -> Self {
        Self::new(limits.max_sampled_textures_per_shader_stage)
    }

    pub fn max_units(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Binds `resource` to `unit`, replacing what was there.
    pub fn bind(&mut self, unit: u32, resource: T) -> Result<(), BindError> {
        let max_units = self.max_units();
        let slot = self
            .slots
            .get_mut(unit as usize)
            .ok_or(BindError::UnitOutOfRange { unit, max_units })?;
        *slot = Some(resource);
        Ok(())
    }

    pub fn get(&self, unit: u32) -> Option<&T> {
        self.slots.get(unit as usize)?.as_ref()
    }

    /// Like [`get`](Self::get), but reports why nothing was found.
    pub fn require(&self, unit: u32) -> Result<&T, BindError> {
        match self.slots.get(unit as usize) {
            None => Err(BindError::UnitOutOfRange {
                unit,
                max_units: self.max_units(),
            }),
            Some(slot) => slot.as_ref().ok_or(BindError::Unbound { unit }),
        }
    }

    pub fn unbind_all(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_within_range() {
        let mut units: TextureUnits<&str> = TextureUnits::new(2);
        units.bind(0, "grid").unwrap();
        units.bind(1, "cornell").unwrap();
        assert_eq!(units.get(0), Some(&"grid"));
        assert_eq!(units.get(1), Some(&"cornell"));
    }

    #[test]
    fn unit_equal_to_max_is_rejected() {
        let mut units: TextureUnits<&str> = TextureUnits::new(2);
        assert_eq!(
            units.bind(2, "x"),
            Err(BindError::UnitOutOfRange { unit: 2, max_units: 2 })
        );
    }

    #[test]
    fn rejected_bind_leaves_table_unchanged() {
        let mut units: TextureUnits<&str> = TextureUnits::new(3);
        units.bind(0, "grid").unwrap();

        assert!(units.bind(7, "overflow").is_err());
        assert!(units.bind(u32::MAX, "overflow").is_err());

        assert_eq!(units.get(0), Some(&"grid"));
        assert_eq!(units.get(1), None);
        assert_eq!(units.get(2), None);
        assert_eq!(units.max_units(), 3);
    }

    #[test]
    fn rebinding_replaces() {
        let mut units: TextureUnits<u32> = TextureUnits::new(1);
        units.bind(0, 1).unwrap();
        units.bind(0, 2).unwrap();
        assert_eq!(units.get(0), Some(&2));
    }

    #[test]
    fn unbind_all_clears_every_unit() {
        let mut units: TextureUnits<u32> = TextureUnits::new(4);
        units.bind(0, 1).unwrap();
        units.bind(3, 4).unwrap();
        units.unbind_all();
        assert!((0..4).all(|u| units.get(u).is_none()));
        assert_eq!(units.require(0).unwrap_err(), BindError::Unbound { unit: 0 });
    }

    #[test]
    fn table_size_follows_device_limits() {
        let units: TextureUnits<u32> = TextureUnits::from_limits(&wgpu::Limits::default());
        assert_eq!(
            units.max_units(),
            wgpu::Limits::default().max_sampled_textures_per_shader_stage
        );
    }
}
