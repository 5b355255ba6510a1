//! OpenGL 3.3 core backend built on `glow`
//!
//! One shader program draws everything: solid geometry uses `u_color`
//! directly, textured quads multiply it by the sampled texel. Quads are
//! streamed through a single dynamic vertex buffer as triangle fans.

#![allow(unsafe_code)]

use std::collections::HashMap;
use std::ffi::c_void;

use glow::HasContext;

use super::backend::{
    check_pixel_buffer, BackendInstance, BackendResult, Filter, GraphicsBackend, PixelFormat, RenderError,
    TextureId,
};
use crate::foundation::math::{Color, Vec2f};

const VERTEX_SHADER: &str = r#"#version 330 core
layout(location = 0) in vec2 a_pos;
layout(location = 1) in vec2 a_uv;
out vec2 v_uv;
void main() {
    v_uv = a_uv;
    gl_Position = vec4(a_pos, 0.0, 1.0);
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 330 core
in vec2 v_uv;
uniform vec4 u_color;
uniform int u_use_texture;
uniform sampler2D u_texture;
out vec4 frag_color;
void main() {
    frag_color = u_use_texture != 0 ? u_color * texture(u_texture, v_uv) : u_color;
}
"#;

/// Floats per vertex: position xy, texture uv
const VERTEX_FLOATS: i32 = 4;

struct GlTexture {
    handle: glow::Texture,
    width: u32,
    height: u32,
}

/// [`GraphicsBackend`] over a current OpenGL context
///
/// All calls must happen on the thread that owns the context.
pub struct GlBackend {
    instance: BackendInstance,
    gl: glow::Context,
    program: glow::Program,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    u_color: Option<glow::UniformLocation>,
    u_use_texture: Option<glow::UniformLocation>,
    textures: HashMap<TextureId, GlTexture>,
    next_id: u32,
    bound: Option<TextureId>,
    viewport: (u32, u32),
}

impl GlBackend {
    /// Load GL entry points through `loader` and set up the pipeline
    ///
    /// The context the loader resolves against must be current.
    pub fn from_loader<F>(loader: F, width: u32, height: u32) -> BackendResult<Self>
    where
        F: FnMut(&str) -> *const c_void,
    {
        // SAFETY: the caller guarantees a current context matching `loader`
        let gl = unsafe { glow::Context::from_loader_function(loader) };
        Self::new(gl, width, height)
    }

    /// Set up the pipeline on an existing context
    pub fn new(gl: glow::Context, width: u32, height: u32) -> BackendResult<Self> {
        unsafe {
            let program = link_program(&gl)?;
            let vao = gl.create_vertex_array().map_err(RenderError::ResourceCreation)?;
            let vbo = gl.create_buffer().map_err(RenderError::ResourceCreation)?;

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            let stride = VERTEX_FLOATS * std::mem::size_of::<f32>() as i32;
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 2, glow::FLOAT, false, stride, 0);
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(1, 2, glow::FLOAT, false, stride, 2 * std::mem::size_of::<f32>() as i32);

            gl.use_program(Some(program));
            let u_color = gl.get_uniform_location(program, "u_color");
            let u_use_texture = gl.get_uniform_location(program, "u_use_texture");
            let u_texture = gl.get_uniform_location(program, "u_texture");
            gl.uniform_1_i32(u_texture.as_ref(), 0);
            gl.uniform_4_f32(u_color.as_ref(), 1.0, 1.0, 1.0, 1.0);

            gl.enable(glow::BLEND);
            gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
            gl.viewport(0, 0, width as i32, height as i32);

            log::info!("OpenGL backend ready: {}", gl.get_parameter_string(glow::VERSION));

            Ok(Self {
                instance: BackendInstance::unique(),
                gl,
                program,
                vao,
                vbo,
                u_color,
                u_use_texture,
                textures: HashMap::new(),
                next_id: 1,
                bound: None,
                viewport: (width, height),
            })
        }
    }

    fn handle(&self, texture: TextureId) -> BackendResult<glow::Texture> {
        self.textures
            .get(&texture)
            .map(|t| t.handle)
            .ok_or(RenderError::UnknownTexture(texture))
    }

    fn bound_handle(&self) -> Option<glow::Texture> {
        self.bound.and_then(|id| self.textures.get(&id)).map(|t| t.handle)
    }

    fn draw(&mut self, mode: u32, vertices: &[f32], textured: bool) {
        unsafe {
            self.gl.uniform_1_i32(self.u_use_texture.as_ref(), i32::from(textured));
            self.gl.bind_vertex_array(Some(self.vao));
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
            self.gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(vertices),
                glow::STREAM_DRAW,
            );
            self.gl.draw_arrays(mode, 0, vertices.len() as i32 / VERTEX_FLOATS);
        }
    }
}

unsafe fn compile_shader(gl: &glow::Context, kind: u32, source: &str) -> BackendResult<glow::Shader> {
    let shader = gl.create_shader(kind).map_err(RenderError::Shader)?;
    gl.shader_source(shader, source);
    gl.compile_shader(shader);
    if !gl.get_shader_compile_status(shader) {
        let message = gl.get_shader_info_log(shader);
        gl.delete_shader(shader);
        return Err(RenderError::Shader(message));
    }
    Ok(shader)
}

unsafe fn link_program(gl: &glow::Context) -> BackendResult<glow::Program> {
    let vertex = compile_shader(gl, glow::VERTEX_SHADER, VERTEX_SHADER)?;
    let fragment = compile_shader(gl, glow::FRAGMENT_SHADER, FRAGMENT_SHADER)?;

    let program = gl.create_program().map_err(RenderError::Shader)?;
    gl.attach_shader(program, vertex);
    gl.attach_shader(program, fragment);
    gl.link_program(program);

    gl.detach_shader(program, vertex);
    gl.detach_shader(program, fragment);
    gl.delete_shader(vertex);
    gl.delete_shader(fragment);

    if !gl.get_program_link_status(program) {
        let message = gl.get_program_info_log(program);
        gl.delete_program(program);
        return Err(RenderError::Shader(message));
    }
    Ok(program)
}

fn gl_filter(filter: Filter) -> i32 {
    match filter {
        Filter::Nearest => glow::NEAREST as i32,
        Filter::Linear => glow::LINEAR as i32,
    }
}

impl GraphicsBackend for GlBackend {
    fn instance(&self) -> BackendInstance {
        self.instance
    }

    fn create_texture(
        &mut self,
        format: PixelFormat,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> BackendResult<TextureId> {
        check_pixel_buffer(format, width, height, pixels)?;

        let handle = unsafe {
            let gl = &self.gl;
            let handle = gl.create_texture().map_err(RenderError::ResourceCreation)?;
            gl.bind_texture(glow::TEXTURE_2D, Some(handle));

            match format {
                PixelFormat::Rgba8 => {
                    gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 4);
                    gl.tex_image_2d(
                        glow::TEXTURE_2D,
                        0,
                        glow::RGBA8 as i32,
                        width as i32,
                        height as i32,
                        0,
                        glow::RGBA,
                        glow::UNSIGNED_BYTE,
                        Some(pixels),
                    );
                }
                PixelFormat::Alpha8 => {
                    // rows of single bytes are not 4-byte aligned
                    gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
                    gl.tex_image_2d(
                        glow::TEXTURE_2D,
                        0,
                        glow::R8 as i32,
                        width as i32,
                        height as i32,
                        0,
                        glow::RED,
                        glow::UNSIGNED_BYTE,
                        Some(pixels),
                    );
                    gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_SWIZZLE_R, glow::ONE as i32);
                    gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_SWIZZLE_G, glow::ONE as i32);
                    gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_SWIZZLE_B, glow::ONE as i32);
                    gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_SWIZZLE_A, glow::RED as i32);
                }
            }

            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::NEAREST as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::NEAREST as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
            gl.bind_texture(glow::TEXTURE_2D, self.bound_handle());
            handle
        };

        let id = TextureId(self.next_id);
        self.next_id += 1;
        self.textures.insert(id, GlTexture { handle, width, height });
        Ok(id)
    }

    fn set_min_filter(&mut self, texture: TextureId, filter: Filter) -> BackendResult<()> {
        let handle = self.handle(texture)?;
        unsafe {
            self.gl.bind_texture(glow::TEXTURE_2D, Some(handle));
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, gl_filter(filter));
            self.gl.bind_texture(glow::TEXTURE_2D, self.bound_handle());
        }
        Ok(())
    }

    fn bind_texture(&mut self, texture: TextureId) -> BackendResult<()> {
        let handle = self.handle(texture)?;
        unsafe {
            self.gl.active_texture(glow::TEXTURE0);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(handle));
        }
        self.bound = Some(texture);
        Ok(())
    }

    fn unbind_texture(&mut self) {
        unsafe {
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }
        self.bound = None;
    }

    fn delete_texture(&mut self, texture: TextureId) -> BackendResult<()> {
        let tex = self
            .textures
            .remove(&texture)
            .ok_or(RenderError::UnknownTexture(texture))?;
        unsafe {
            self.gl.delete_texture(tex.handle);
        }
        if self.bound == Some(texture) {
            self.bound = None;
        }
        Ok(())
    }

    fn texture_size(&self, texture: TextureId) -> BackendResult<(u32, u32)> {
        self.textures
            .get(&texture)
            .map(|t| (t.width, t.height))
            .ok_or(RenderError::UnknownTexture(texture))
    }

    fn set_color(&mut self, color: Color) {
        unsafe {
            self.gl
                .uniform_4_f32(self.u_color.as_ref(), color.x, color.y, color.z, color.w);
        }
    }

    fn draw_textured_quad(&mut self, pos: Vec2f, size: Vec2f, uv_start: Vec2f, uv_end: Vec2f) {
        let (x0, y0, x1, y1) = (pos.x, pos.y, pos.x + size.x, pos.y + size.y);
        #[rustfmt::skip]
        let vertices = [
            x0, y1, uv_start.x, uv_start.y,
            x0, y0, uv_start.x, uv_end.y,
            x1, y0, uv_end.x, uv_end.y,
            x1, y1, uv_end.x, uv_start.y,
        ];
        self.draw(glow::TRIANGLE_FAN, &vertices, self.bound.is_some());
    }

    fn draw_quad(&mut self, pos: Vec2f, size: Vec2f) {
        let (x0, y0, x1, y1) = (pos.x, pos.y, pos.x + size.x, pos.y + size.y);
        #[rustfmt::skip]
        let vertices = [
            x0, y1, 0.0, 0.0,
            x0, y0, 0.0, 0.0,
            x1, y0, 0.0, 0.0,
            x1, y1, 0.0, 0.0,
        ];
        self.draw(glow::TRIANGLE_FAN, &vertices, false);
    }

    fn draw_line_strip(&mut self, points: &[Vec2f]) {
        let vertices: Vec<f32> = points.iter().flat_map(|p| [p.x, p.y, 0.0, 0.0]).collect();
        self.draw(glow::LINE_STRIP, &vertices, false);
    }

    fn clear(&mut self, color: Color) {
        unsafe {
            self.gl.clear_color(color.x, color.y, color.z, color.w);
            self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    fn viewport_size(&self) -> (u32, u32) {
        self.viewport
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        unsafe {
            self.gl.viewport(0, 0, width as i32, height as i32);
        }
        self.viewport = (width, height);
    }
}

impl Drop for GlBackend {
    fn drop(&mut self) {
        if !self.textures.is_empty() {
            log::warn!("Releasing {} textures still owned by the GL backend", self.textures.len());
        }
        unsafe {
            for (_, tex) in self.textures.drain() {
                self.gl.delete_texture(tex.handle);
            }
            self.gl.delete_buffer(self.vbo);
            self.gl.delete_vertex_array(self.vao);
            self.gl.delete_program(self.program);
        }
    }
}
