//! Named shader program registry
//!
//! Programs are loaded once at startup from `<name>.vert.wgsl` /
//! `<name>.frag.wgsl` pairs and shared with the renderers that use them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::renderer::shader::{ProgramSource, ShaderError, ShaderProgram};

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("cannot read shader {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("shader program '{name}': {source}")]
    Shader {
        name: String,
        #[source]
        source: ShaderError,
    },
    #[error("no shader program named '{0}'")]
    UnknownShader(String),
}

fn read_source(path: &Path) -> Result<String, ResourceError> {
    std::fs::read_to_string(path).map_err(|source| ResourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and check a program pair without touching the GPU
pub fn load_program_source(
    name: &str,
    vertex_path: &Path,
    fragment_path: &Path,
) -> Result<ProgramSource, ResourceError> {
    let vertex = read_source(vertex_path)?;
    let fragment = read_source(fragment_path)?;
    ProgramSource::parse(&vertex, &fragment).map_err(|source| ResourceError::Shader {
        name: name.to_string(),
        source,
    })
}

#[derive(Default)]
pub struct ResourceManager {
    shaders: HashMap<String, Rc<ShaderProgram>>,
}

impl ResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load, compile and register a program under `name`, replacing any
    /// previous program of that name
    pub fn load_shader(
        &mut self,
        device: &wgpu::Device,
        vertex_path: &Path,
        fragment_path: &Path,
        name: &str,
    ) -> Result<Rc<ShaderProgram>, ResourceError> {
        let source = load_program_source(name, vertex_path, fragment_path)?;
        let program = Rc::new(ShaderProgram::from_source(device, name, source));
        self.shaders.insert(name.to_string(), Rc::clone(&program));
        Ok(program)
    }

    pub fn get_shader(&self, name: &str) -> Result<Rc<ShaderProgram>, ResourceError> {
        self.shaders
            .get(name)
            .cloned()
            .ok_or_else(|| ResourceError::UnknownShader(name.to_string()))
    }

    /// Rewind every program's per-frame uniform slots
    pub fn begin_frame(&self) {
        for program in self.shaders.values() {
            program.begin_frame();
        }
    }

    /// Drop the registry's handles; GPU objects go away with the last user
    pub fn clear(&mut self) {
        log::debug!("Releasing {} shader programs", self.shaders.len());
        self.shaders.clear();
    }

    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const VS: &str = r#"
        struct U { projection: mat4x4<f32>, textColor: vec3<f32> }
        @group(0) @binding(0) var<uniform> u: U;
        @vertex
        fn vs_main(@location(0) v: vec4<f32>) -> @builtin(position) vec4<f32> {
            return u.projection * vec4<f32>(v.xy, 0.0, 1.0);
        }
    "#;

    const FS: &str = r#"
        struct U { projection: mat4x4<f32>, textColor: vec3<f32> }
        @group(0) @binding(0) var<uniform> u: U;
        @fragment
        fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(u.textColor, 1.0); }
    "#;

    fn write_pair(dir: &TempDir, vs: &str, fs: &str) -> (PathBuf, PathBuf) {
        let vs_path = dir.path().join("text.vert.wgsl");
        let fs_path = dir.path().join("text.frag.wgsl");
        std::fs::write(&vs_path, vs).unwrap();
        std::fs::write(&fs_path, fs).unwrap();
        (vs_path, fs_path)
    }

    #[test]
    fn test_load_program_source_from_files() {
        let dir = TempDir::new().unwrap();
        let (vs, fs) = write_pair(&dir, VS, FS);
        let source = load_program_source("text", &vs, &fs).unwrap();
        assert!(source.layout.field("textColor").is_some());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.vert.wgsl");
        let err = load_program_source("text", &missing, &missing).unwrap_err();
        match err {
            ResourceError::Io { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_compile_error_names_program() {
        let dir = TempDir::new().unwrap();
        let (vs, fs) = write_pair(&dir, VS, "this is not wgsl");
        let err = load_program_source("text", &vs, &fs).unwrap_err();
        assert!(matches!(
            err,
            ResourceError::Shader {
                ref name,
                source: ShaderError::Parse { stage: "fragment", .. }
            } if name == "text"
        ));
        assert!(err.to_string().contains("'text'"));
    }

    #[test]
    fn test_unknown_shader() {
        let resources = ResourceManager::new();
        assert!(resources.is_empty());
        assert!(matches!(
            resources.get_shader("sprite"),
            Err(ResourceError::UnknownShader(name)) if name == "sprite"
        ));
    }
}
