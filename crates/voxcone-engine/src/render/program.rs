use std::borrow::Cow;

use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::error::ShaderProgramError;

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";
pub const COMPUTE_ENTRY: &str = "cs_main";

/// A WGSL program that is compiled, told where its vertex attributes live,
/// then linked into a device shader module.
///
/// Compiling parses and validates the source with naga, so errors carry
/// line-annotated diagnostics without a device. Linking checks that the
/// module exposes either a `vs_main`/`fs_main` pair or a `cs_main`, and that
/// every bound attribute name sits at its bound location in `vs_main`'s
/// inputs.
pub struct ShaderProgram {
    label: String,
    source: Cow<'static, str>,
    attribs: Vec<(u32, String)>,
    module: Option<naga::Module>,
    linked: Option<wgpu::ShaderModule>,
}

impl ShaderProgram {
    pub fn new(label: impl Into<String>, source: impl Into<Cow<'static, str>>) -> Self {
        Self {
            label: label.into(),
            source: source.into(),
            attribs: Vec::new(),
            module: None,
            linked: None,
        }
    }

    /// Compiles, binds `attribs` in order, and links.
    pub fn build(
        device: &wgpu::Device,
        label: impl Into<String>,
        source: impl Into<Cow<'static, str>>,
        attribs: &[&str],
    ) -> Result<Self, ShaderProgramError> {
        let mut program = Self::new(label, source);
        program.compile()?;
        for (index, name) in attribs.iter().enumerate() {
            program.bind_attrib_location(index as u32, name);
        }
        program.link(device)?;
        Ok(program)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_compiled(&self) -> bool {
        self.module.is_some()
    }

    /// The device module, or an error naming the program if it was never
    /// linked.
    pub fn linked_module(&self) -> Result<&wgpu::ShaderModule, ShaderProgramError> {
        self.linked.as_ref().ok_or_else(|| {
            if self.is_compiled() {
                ShaderProgramError::Link {
                    label: self.label.clone(),
                    message: "not linked".to_owned(),
                }
            } else {
                ShaderProgramError::NotCompiled {
                    label: self.label.clone(),
                }
            }
        })
    }

    pub fn compile(&mut self) -> Result<(), ShaderProgramError> {
        let module = naga::front::wgsl::parse_str(&self.source).map_err(|e| {
            ShaderProgramError::Compile {
                label: self.label.clone(),
                message: e.emit_to_string(&self.source),
            }
        })?;

        Validator::new(ValidationFlags::all(), Capabilities::all())
            .validate(&module)
            .map_err(|e| ShaderProgramError::Compile {
                label: self.label.clone(),
                message: e.emit_to_string(&self.source),
            })?;

        self.module = Some(module);
        self.linked = None;
        Ok(())
    }

    /// Declares that vertex attribute `name` is fed from `index`. Takes
    /// effect at the next [`link`](Self::link).
    pub fn bind_attrib_location(&mut self, index: u32, name: &str) {
        self.attribs.retain(|(i, n)| *i != index && n != name);
        self.attribs.push((index, name.to_owned()));
        self.linked = None;
    }

    pub fn link(&mut self, device: &wgpu::Device) -> Result<(), ShaderProgramError> {
        self.check_interface()?;

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&self.label),
            source: wgpu::ShaderSource::Wgsl(self.source.clone()),
        });
        log::debug!("ShaderProgram '{}' linked", self.label);
        self.linked = Some(module);
        Ok(())
    }

    fn check_interface(&self) -> Result<(), ShaderProgramError> {
        let module = self
            .module
            .as_ref()
            .ok_or_else(|| ShaderProgramError::NotCompiled {
                label: self.label.clone(),
            })?;

        let link_error = |message: String| ShaderProgramError::Link {
            label: self.label.clone(),
            message,
        };

        let vertex = find_entry(module, naga::ShaderStage::Vertex, VERTEX_ENTRY);
        let fragment = find_entry(module, naga::ShaderStage::Fragment, FRAGMENT_ENTRY);
        let compute = find_entry(module, naga::ShaderStage::Compute, COMPUTE_ENTRY);

        match (vertex, fragment, compute) {
            (Some(vs), Some(_), _) => {
                let inputs = vertex_inputs(module, vs);
                for (index, name) in &self.attribs {
                    match inputs.iter().find(|(_, n)| n == name) {
                        Some((location, _)) if location == index => {}
                        Some((location, _)) => {
                            return Err(link_error(format!(
                                "attribute '{name}' bound to {index} but declared at location {location}"
                            )));
                        }
                        None => {
                            return Err(link_error(format!(
                                "attribute '{name}' is not an input of {VERTEX_ENTRY}"
                            )));
                        }
                    }
                }
                Ok(())
            }
            (Some(_), None, _) => Err(link_error(format!("missing {FRAGMENT_ENTRY}"))),
            (None, Some(_), _) => Err(link_error(format!("missing {VERTEX_ENTRY}"))),
            (None, None, Some(_)) if self.attribs.is_empty() => Ok(()),
            (None, None, Some(_)) => Err(link_error(
                "vertex attributes bound on a compute program".to_owned(),
            )),
            (None, None, None) => Err(link_error(format!(
                "no {VERTEX_ENTRY}/{FRAGMENT_ENTRY} pair or {COMPUTE_ENTRY}"
            ))),
        }
    }
}

fn find_entry<'m>(
    module: &'m naga::Module,
    stage: naga::ShaderStage,
    name: &str,
) -> Option<&'m naga::EntryPoint> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage && ep.name == name)
}

/// `(location, name)` of every user-defined input of `ep`, looking through
/// struct arguments.
fn vertex_inputs(module: &naga::Module, ep: &naga::EntryPoint) -> Vec<(u32, String)> {
    let mut out = Vec::new();
    for arg in &ep.function.arguments {
        match (&arg.binding, &module.types[arg.ty].inner) {
            (Some(naga::Binding::Location { location, .. }), _) => {
                if let Some(name) = &arg.name {
                    out.push((*location, name.clone()));
                }
            }
            (None, naga::TypeInner::Struct { members, .. }) => {
                for member in members {
                    if let (Some(naga::Binding::Location { location, .. }), Some(name)) =
                        (&member.binding, &member.name)
                    {
                        out.push((*location, name.clone()));
                    }
                }
            }
            _ => {}
        }
    }
    out
}
