//! Command files
//!
//! A command file is line oriented. Each line holds a command name followed
//! by whitespace-separated arguments. Blank lines and lines whose first token
//! starts with `#` are skipped.
//!
//! ```text
//! size 100 100
//! floats_per_vertex 6
//! vertex_shader passthrough
//! fragment_shader attribute 3
//! vertex -0.5 -0.5 0  1 0 0
//! vertex  0.5 -0.5 0  0 1 0
//! vertex  0.0  0.5 0  0 0 1
//! triangle 0 1 2
//! render
//! ```
//!
//! The whole file is parsed before anything runs, so a typo on the last line
//! is reported before any rendering happens.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::{FromStr, SplitWhitespace};
use std::sync::Arc;

use log::{debug, info};
use thiserror::Error;

use crate::codec::{self, CodecError};
use crate::config::RenderConfig;
use crate::rasterizer::{ClipMode, Color, CullMode, Driver, RenderError, Texture};
use crate::shaders;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Size { width: usize, height: usize },
    Background(Color),
    Clear,
    FloatsPerVertex(usize),
    Vertex(Vec<f32>),
    Triangle([usize; 3]),
    Uniform(Vec<f32>),
    VertexShader { name: String, arg: Option<usize> },
    FragmentShader { name: String, arg: Option<usize> },
    Texture(PathBuf),
    Clip(ClipMode),
    Cull(CullMode),
    Render,
    Reset,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("line {line}: Unrecognized command: '{text}'")]
    Unrecognized { line: usize, text: String },
    #[error("line {line}: {command}: {message}")]
    BadArguments {
        line: usize,
        command: String,
        message: String,
    },
    #[error("line {line}: {source}")]
    Render {
        line: usize,
        #[source]
        source: RenderError,
    },
    #[error("line {line}: {source}")]
    Codec {
        line: usize,
        #[source]
        source: CodecError,
    },
}

/// Argument cursor for one line
struct Args<'a> {
    line: usize,
    command: &'a str,
    tokens: SplitWhitespace<'a>,
}

impl<'a> Args<'a> {
    fn error(&self, message: impl Display) -> CommandError {
        CommandError::BadArguments {
            line: self.line,
            command: self.command.to_string(),
            message: message.to_string(),
        }
    }

    fn parse<T: FromStr>(&self, token: &str, what: &str) -> Result<T, CommandError> {
        token
            .parse()
            .map_err(|_| self.error(format_args!("invalid {what} '{token}'")))
    }

    fn next<T: FromStr>(&mut self, what: &str) -> Result<T, CommandError> {
        match self.tokens.next() {
            Some(token) => self.parse(token, what),
            None => Err(self.error(format_args!("missing {what}"))),
        }
    }

    fn word(&mut self, what: &str) -> Result<&'a str, CommandError> {
        self.tokens
            .next()
            .ok_or_else(|| self.error(format_args!("missing {what}")))
    }

    fn optional<T: FromStr>(&mut self, what: &str) -> Result<Option<T>, CommandError> {
        match self.tokens.next() {
            Some(token) => self.parse(token, what).map(Some),
            None => Ok(None),
        }
    }

    fn rest<T: FromStr>(&mut self, what: &str) -> Result<Vec<T>, CommandError> {
        let tokens: Vec<&str> = self.tokens.by_ref().collect();
        tokens.into_iter().map(|t| self.parse(t, what)).collect()
    }

    /// Fails if any arguments are left over.
    fn done<T>(mut self, value: T) -> Result<Option<T>, CommandError> {
        match self.tokens.next() {
            Some(extra) => Err(self.error(format_args!("unexpected argument '{extra}'"))),
            None => Ok(Some(value)),
        }
    }
}

/// Parses one line. Returns `None` for blank and comment lines.
pub fn parse_line(line: usize, text: &str) -> Result<Option<Command>, CommandError> {
    let mut tokens = text.split_whitespace();
    let Some(command) = tokens.next() else {
        return Ok(None);
    };
    if command.starts_with('#') {
        return Ok(None);
    }
    let mut args = Args { line, command, tokens };

    let cmd = match command {
        "size" => Command::Size {
            width: args.next("width")?,
            height: args.next("height")?,
        },
        "background" => Command::Background(Color::new(
            args.next("red")?,
            args.next("green")?,
            args.next("blue")?,
        )),
        "clear" => Command::Clear,
        "floats_per_vertex" => Command::FloatsPerVertex(args.next("count")?),
        "vertex" => Command::Vertex(args.rest("coordinate")?),
        "triangle" => Command::Triangle([args.next("index")?, args.next("index")?, args.next("index")?]),
        "uniform" => Command::Uniform(args.rest("value")?),
        "vertex_shader" => Command::VertexShader {
            name: args.word("shader name")?.to_string(),
            arg: args.optional("argument")?,
        },
        "fragment_shader" => Command::FragmentShader {
            name: args.word("shader name")?.to_string(),
            arg: args.optional("argument")?,
        },
        "texture" => Command::Texture(PathBuf::from(args.word("path")?)),
        "clip" => match args.word("mode")? {
            "near" => Command::Clip(ClipMode::Near),
            "frustum" => Command::Clip(ClipMode::Frustum),
            other => return Err(args.error(format_args!("unknown clip mode '{other}'"))),
        },
        "cull" => match args.word("mode")? {
            "none" => Command::Cull(CullMode::None),
            "back" => Command::Cull(CullMode::Back),
            "front" => Command::Cull(CullMode::Front),
            other => return Err(args.error(format_args!("unknown cull mode '{other}'"))),
        },
        "render" => Command::Render,
        "reset" => Command::Reset,
        _ => {
            return Err(CommandError::Unrecognized {
                line,
                text: text.trim_end().to_string(),
            })
        }
    };
    args.done(cmd)
}

/// Parses a whole command file into (line number, command) pairs.
pub fn parse(text: &str) -> Result<Vec<(usize, Command)>, CommandError> {
    let mut commands = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if let Some(cmd) = parse_line(i + 1, line)? {
            commands.push((i + 1, cmd));
        }
    }
    Ok(commands)
}

/// Executes commands against a [`Driver`].
pub struct Session {
    driver: Driver,
    base_dir: PathBuf,
    texture: Option<Arc<Texture>>,
}

impl Session {
    /// `base_dir` is where relative texture paths are resolved.
    pub fn new(config: RenderConfig, base_dir: impl AsRef<Path>) -> Self {
        Self {
            driver: Driver::new(config),
            base_dir: base_dir.as_ref().to_path_buf(),
            texture: None,
        }
    }

    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    pub fn into_driver(self) -> Driver {
        self.driver
    }

    /// Parses and runs a whole command file.
    pub fn run(&mut self, text: &str) -> Result<(), CommandError> {
        let commands = parse(text)?;
        debug!("parsed {} commands", commands.len());
        for (line, cmd) in commands {
            self.execute(line, cmd)?;
        }
        Ok(())
    }

    pub fn execute(&mut self, line: usize, cmd: Command) -> Result<(), CommandError> {
        let render_err = |source| CommandError::Render { line, source };
        let bad = |command: &str, message: String| CommandError::BadArguments {
            line,
            command: command.to_string(),
            message,
        };

        match cmd {
            Command::Size { width, height } => {
                self.driver.set_size(width, height).map_err(render_err)?;
                info!("Image size {width}x{height}");
            }
            Command::Background(color) => self.driver.config_mut().background = color,
            Command::Clear => self.driver.clear().map_err(render_err)?,
            Command::FloatsPerVertex(n) => self.driver.set_floats_per_vertex(n).map_err(render_err)?,
            Command::Vertex(v) => self.driver.push_vertex(&v).map_err(render_err)?,
            Command::Triangle(t) => self.driver.push_triangle(t),
            Command::Uniform(u) => self.driver.push_uniform(&u),
            Command::VertexShader { name, arg } => {
                let shader = shaders::vertex_shader(&name, arg)
                    .ok_or_else(|| bad("vertex_shader", format!("unknown shader '{name}'")))?;
                self.driver.set_vertex_shader(shader);
            }
            Command::FragmentShader { name, arg } => {
                if name == "textured" && self.texture.is_none() {
                    return Err(bad("fragment_shader", "no texture loaded".to_string()));
                }
                let shader = shaders::fragment_shader(&name, arg, self.texture.as_ref())
                    .ok_or_else(|| bad("fragment_shader", format!("unknown shader '{name}'")))?;
                self.driver.set_fragment_shader(shader);
            }
            Command::Texture(path) => {
                let path = self.base_dir.join(path);
                let (pixels, width, height) =
                    codec::decode_image(&path).map_err(|source| CommandError::Codec { line, source })?;
                self.texture = Some(Arc::new(Texture::from_pixels(&pixels, width, height)));
            }
            Command::Clip(mode) => self.driver.config_mut().clip = mode,
            Command::Cull(mode) => self.driver.config_mut().cull = mode,
            Command::Render => {
                let stats = self.driver.render().map_err(render_err)?;
                info!(
                    "Rendered {} triangles, {} fragments written",
                    stats.triangles.i, stats.fragments.o
                );
            }
            Command::Reset => self.driver.reset_geometry(),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comments_and_blanks() {
        let cmds = parse("# header\n\n   \n  #indented comment\nsize 4 3\n").unwrap();
        assert_eq!(cmds, vec![(5, Command::Size { width: 4, height: 3 })]);
    }

    #[test]
    fn test_parse_forms() {
        let text = "vertex 1 2.5 -3e-1\ntriangle 0 1 2\nuniform\nuniform 1 0 0\n\
                    vertex_shader transform 16\nfragment_shader solid\nclip frustum\ncull back\n\
                    background 50 50 250\nrender\nreset\nclear";
        let cmds: Vec<Command> = parse(text).unwrap().into_iter().map(|(_, c)| c).collect();
        assert_eq!(
            cmds,
            vec![
                Command::Vertex(vec![1.0, 2.5, -0.3]),
                Command::Triangle([0, 1, 2]),
                Command::Uniform(vec![]),
                Command::Uniform(vec![1.0, 0.0, 0.0]),
                Command::VertexShader { name: "transform".into(), arg: Some(16) },
                Command::FragmentShader { name: "solid".into(), arg: None },
                Command::Clip(ClipMode::Frustum),
                Command::Cull(CullMode::Back),
                Command::Background(Color::new(50, 50, 250)),
                Command::Render,
                Command::Reset,
                Command::Clear,
            ]
        );
    }

    #[test]
    fn test_unrecognized_reports_line() {
        let err = parse("size 2 2\nfrobnicate 1\n").unwrap_err();
        assert!(matches!(err, CommandError::Unrecognized { line: 2, .. }));
        assert_eq!(err.to_string(), "line 2: Unrecognized command: 'frobnicate 1'");
    }

    #[test]
    fn test_bad_arguments() {
        for text in ["size 10", "size 10 ten", "size 1 2 3", "triangle 0 1 -2", "background 0 0 256", "clip far"] {
            assert!(
                matches!(parse(text), Err(CommandError::BadArguments { line: 1, .. })),
                "{text}"
            );
        }
    }

    #[test]
    fn test_session_renders() {
        let text = "size 8 8\n\
                    floats_per_vertex 6\n\
                    vertex_shader passthrough\n\
                    fragment_shader attribute\n\
                    vertex -1 -1 0 0 1 0\n\
                    vertex 3 -1 0 0 1 0\n\
                    vertex -1 3 0 0 1 0\n\
                    triangle 0 1 2\n\
                    render\n";
        let mut session = Session::new(RenderConfig::default(), ".");
        session.run(text).unwrap();
        let fb = session.driver().framebuffer().unwrap();
        assert!(fb.color.iter().all(|&p| p == Color::GREEN.to_u32()));
    }

    #[test]
    fn test_session_errors_carry_line() {
        let mut session = Session::new(RenderConfig::default(), ".");
        let err = session.run("vertex_shader passthrough\nfragment_shader solid\nrender\n").unwrap_err();
        assert!(matches!(
            err,
            CommandError::Render { line: 3, source: RenderError::NoFramebuffer }
        ));

        let err = session.run("size 0 4").unwrap_err();
        assert!(matches!(err, CommandError::Render { line: 1, .. }));

        let err = session.run("fragment_shader textured").unwrap_err();
        assert!(matches!(err, CommandError::BadArguments { line: 1, .. }));

        let err = session.run("texture missing.png").unwrap_err();
        assert!(matches!(err, CommandError::Codec { line: 1, .. }));
    }

    #[test]
    fn test_bundled_scenes_run() {
        let mut session = Session::new(RenderConfig::default(), "scenes");
        session.run(include_str!("../scenes/triangle.txt")).unwrap();
        assert!(session.driver().stats().fragments.o > 0);

        let mut session = Session::new(RenderConfig::default(), "scenes");
        session.run(include_str!("../scenes/perspective.txt")).unwrap();
        let stats = session.driver().stats();
        assert_eq!(stats.clipped, 2);
        assert!(stats.fragments.o > 0);
    }

    #[test]
    fn test_background_command_overrides_default() {
        let mut session = Session::new(RenderConfig::default(), ".");
        session.run("size 2 2").unwrap();
        let fb = session.driver().framebuffer().unwrap();
        assert!(fb.color.iter().all(|&p| p == Color::new(50, 50, 250).to_u32()));

        session.run("background 1 2 3\nclear").unwrap();
        let fb = session.driver().framebuffer().unwrap();
        assert!(fb.color.iter().all(|&p| p == Color::new(1, 2, 3).to_u32()));
    }

    #[test]
    fn test_texture_relative_to_base_dir() {
        let dir = std::env::temp_dir().join(format!("softrast-texture-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        // Bottom row red, green; top row blue, white
        let texels = [Color::RED, Color::GREEN, Color::BLUE, Color::WHITE].map(Color::to_u32);
        codec::encode_image(&texels, 2, 2, dir.join("quad.png")).unwrap();

        // uv = (ndc + 1) / 2 over the whole screen
        let text = "size 2 2\n\
                    texture quad.png\n\
                    floats_per_vertex 5\n\
                    vertex_shader passthrough\n\
                    fragment_shader textured 3\n\
                    vertex -1 -1 0 0 0\n\
                    vertex 3 -1 0 2 0\n\
                    vertex -1 3 0 0 2\n\
                    triangle 0 1 2\n\
                    render\n";
        let mut session = Session::new(RenderConfig::default(), &dir);
        let result = session.run(text);
        std::fs::remove_dir_all(&dir).unwrap();
        result.unwrap();

        let fb = session.driver().framebuffer().unwrap();
        assert_eq!(fb.color, texels.to_vec());
    }

    #[test]
    fn test_reset_keeps_image() {
        let text = "size 4 4\n\
                    vertex_shader passthrough\n\
                    fragment_shader solid\n\
                    uniform 1 1 1\n\
                    vertex -1 -1 0\nvertex 3 -1 0\nvertex -1 3 0\n\
                    triangle 0 1 2\n\
                    render\n\
                    reset\n\
                    render\n";
        let mut session = Session::new(RenderConfig::default(), ".");
        session.run(text).unwrap();
        let driver = session.driver();
        assert_eq!(driver.num_triangles(), 0);
        assert_eq!(driver.stats().renders, 2);
        assert!(driver.framebuffer().unwrap().color.iter().all(|&p| p == Color::WHITE.to_u32()));
    }
}
