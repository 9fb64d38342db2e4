use glam::{Mat4, Vec3};
use slotmap::SlotMap;

use crate::scene::ObjectKey;

/// Longest parent chain followed before giving up.
///
/// Chains this deep only happen when a parent link loops back on itself.
pub const MAX_PARENT_DEPTH: usize = 64;

/// Resolves parent handles to transforms.
pub trait TransformLookup {
    fn transform(&self, key: ObjectKey) -> Option<&Transform>;
}

impl TransformLookup for SlotMap<ObjectKey, Transform> {
    fn transform(&self, key: ObjectKey) -> Option<&Transform> {
        self.get(key)
    }
}

/// Local model matrix plus the view/projection of the current pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    local: Mat4,
    view: Mat4,
    proj: Mat4,
    parent: Option<ObjectKey>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            local: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
            parent: None,
        }
    }
}

impl AsRef<Transform> for Transform {
    fn as_ref(&self) -> &Transform {
        self
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    // ── local composition ─────────────────────────────────────────────────

    /// Right-multiplies a translation onto the local matrix.
    pub fn translate(&mut self, v: Vec3) {
        self.local *= Mat4::from_translation(v);
    }

    /// Right-multiplies a rotation of `angle` radians about `axis`.
    pub fn rotate(&mut self, angle: f32, axis: Vec3) {
        self.local *= Mat4::from_axis_angle(unit_axis(axis), angle);
    }

    /// Right-multiplies a non-uniform scale.
    pub fn scale(&mut self, s: Vec3) {
        self.local *= Mat4::from_scale(s);
    }

    /// Replaces the local matrix with translate, then rotate, then scale,
    /// applied to vertices in that order. Prior composition is discarded.
    pub fn set_chain(&mut self, pos: Vec3, angle: f32, axis: Vec3, scale: Vec3) {
        self.local = Mat4::from_scale(scale)
            * Mat4::from_axis_angle(unit_axis(axis), angle)
            * Mat4::from_translation(pos);
    }

    pub fn local_model_transform(&self) -> Mat4 {
        self.local
    }

    // ── hierarchy ─────────────────────────────────────────────────────────

    pub fn set_parent(&mut self, parent: Option<ObjectKey>) {
        self.parent = parent;
    }

    /// Parent's model matrix times the local matrix, or the local matrix alone.
    ///
    /// A parent handle that no longer resolves ends the chain there.
    pub fn model_transform(&self, lookup: &impl TransformLookup) -> Mat4 {
        let mut model = self.local;
        let mut next = self.parent;
        let mut depth = 0;

        while let Some(key) = next {
            if depth == MAX_PARENT_DEPTH {
                log::warn!("transform parent chain exceeds {MAX_PARENT_DEPTH} links; truncated");
                break;
            }
            let Some(parent) = lookup.transform(key) else { break };
            model = parent.local * model;
            next = parent.parent;
            depth += 1;
        }

        model
    }

    // ── view / projection ─────────────────────────────────────────────────

    pub fn set_view(&mut self, view: Mat4) {
        self.view = view;
    }

    pub fn set_proj(&mut self, proj: Mat4) {
        self.proj = proj;
    }

    /// `proj * view * model`, recomputed on every call.
    pub fn mvp(&self, lookup: &impl TransformLookup) -> Mat4 {
        self.proj * self.view * self.model_transform(lookup)
    }
}

fn unit_axis(axis: Vec3) -> Vec3 {
    axis.try_normalize().unwrap_or(Vec3::Y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Mat4, b: Mat4) -> bool {
        a.abs_diff_eq(b, 1e-5)
    }

    // ── composition ───────────────────────────────────────────────────────

    #[test]
    fn operations_compose_instead_of_replacing() {
        let mut t = Transform::new();
        t.translate(Vec3::new(1.0, 0.0, 0.0));
        t.translate(Vec3::new(0.0, 2.0, 0.0));
        let p = t.local_model_transform().transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), 1e-6));
    }

    #[test]
    fn right_multiplication_applies_last_call_first() {
        let mut t = Transform::new();
        t.translate(Vec3::new(1.0, 0.0, 0.0));
        t.scale(Vec3::splat(2.0));
        // scale happens in object space, then the translation
        let p = t.local_model_transform().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(3.0, 0.0, 0.0), 1e-6));
    }

    // ── set_chain ─────────────────────────────────────────────────────────

    #[test]
    fn set_chain_discards_prior_composition() {
        let mut t = Transform::new();
        t.translate(Vec3::new(5.0, -3.0, 1.0));
        t.rotate(1.2, Vec3::new(0.3, 1.0, 0.0));
        t.set_chain(Vec3::new(1.0, 2.0, 3.0), 0.0, Vec3::Y, Vec3::ONE);
        assert!(approx(
            t.local_model_transform(),
            Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0))
        ));
    }

    #[test]
    fn set_chain_scales_the_translation() {
        let mut t = Transform::new();
        t.set_chain(Vec3::new(20.0, 20.0, 0.0), 0.0, Vec3::ONE, Vec3::splat(0.025));
        let p = t.local_model_transform().transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(0.5, 0.5, 0.0), 1e-6));
    }

    #[test]
    fn zero_axis_does_not_produce_nan() {
        let mut t = Transform::new();
        t.rotate(FRAC_PI_2, Vec3::ZERO);
        assert!(t.local_model_transform().is_finite());
    }

    // ── hierarchy ─────────────────────────────────────────────────────────

    #[test]
    fn without_parent_model_is_local() {
        let table: SlotMap<ObjectKey, Transform> = SlotMap::with_key();
        let mut t = Transform::new();
        t.rotate(FRAC_PI_2, Vec3::Z);
        assert!(approx(t.model_transform(&table), t.local_model_transform()));
    }

    #[test]
    fn parent_model_premultiplies_local() {
        let mut table: SlotMap<ObjectKey, Transform> = SlotMap::with_key();

        let mut root = Transform::new();
        root.translate(Vec3::new(0.0, 1.0, 0.0));
        let root_key = table.insert(root.clone());

        let mut mid = Transform::new();
        mid.rotate(FRAC_PI_2, Vec3::Z);
        mid.set_parent(Some(root_key));
        let mid_key = table.insert(mid.clone());

        let mut leaf = Transform::new();
        leaf.scale(Vec3::splat(3.0));
        leaf.set_parent(Some(mid_key));

        let expected = mid.model_transform(&table) * leaf.local_model_transform();
        assert!(approx(leaf.model_transform(&table), expected));
        assert!(approx(
            expected,
            root.local_model_transform() * mid.local_model_transform() * leaf.local_model_transform()
        ));
    }

    #[test]
    fn dangling_parent_ends_chain() {
        let mut table: SlotMap<ObjectKey, Transform> = SlotMap::with_key();
        let key = table.insert(Transform::new());
        table.remove(key);

        let mut t = Transform::new();
        t.translate(Vec3::X);
        t.set_parent(Some(key));
        assert!(approx(t.model_transform(&table), t.local_model_transform()));
    }

    #[test]
    fn parent_cycle_terminates() {
        let mut table: SlotMap<ObjectKey, Transform> = SlotMap::with_key();
        let a = table.insert(Transform::new());
        let b = table.insert(Transform::new());
        table[a].set_parent(Some(b));
        table[b].set_parent(Some(a));

        let m = table[a].model_transform(&table);
        assert!(approx(m, Mat4::IDENTITY));
    }

    // ── mvp ───────────────────────────────────────────────────────────────

    #[test]
    fn mvp_is_proj_view_model() {
        let table: SlotMap<ObjectKey, Transform> = SlotMap::with_key();
        let mut t = Transform::new();
        t.translate(Vec3::new(0.2, 0.0, -1.0));
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(45f32.to_radians(), 1.0, 0.1, 100.0);
        t.set_view(view);
        t.set_proj(proj);

        let expected = proj * view * t.local_model_transform();
        assert!(approx(t.mvp(&table), expected));
        // no caching: a later change shows up immediately
        t.set_view(Mat4::IDENTITY);
        assert!(approx(t.mvp(&table), proj * t.local_model_transform()));
    }
}
