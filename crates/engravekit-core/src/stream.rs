//! Command stream: the hand-off artifact between toolpath producers and
//! device backends.
//!
//! A stream always starts with a `SETPROPERTY` command carrying the initial
//! laser property. Commands are only ever appended, and the bounding box of
//! every motion target is tracked as they arrive. Backends implement
//! [`CommandSink`] and receive the stream exactly once through
//! [`CommandStream::deliver`].

use crate::command::Command;
use crate::error::CommandError;
use crate::property::LaserProperty;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box of motion targets, in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl Bounds {
    /// A degenerate box containing a single point
    pub fn at(x: i32, y: i32) -> Self {
        Self {
            min_x: x,
            max_x: x,
            min_y: y,
            max_y: y,
        }
    }

    /// Grows the box to contain `(x, y)`
    pub fn include(&mut self, x: i32, y: i32) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    pub fn width(&self) -> i64 {
        self.max_x as i64 - self.min_x as i64
    }

    pub fn height(&self) -> i64 {
        self.max_y as i64 - self.min_y as i64
    }

    /// Whether `(x, y)` lies inside the box, edges included
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Consumer of a command stream
///
/// Implemented by device backends (and by analysis passes such as toolpath
/// statistics). Calls arrive in stream order; `finish` is called once after
/// the last command.
pub trait CommandSink {
    type Error;

    fn set_property(&mut self, property: &LaserProperty) -> Result<(), Self::Error>;

    fn move_to(&mut self, x: i32, y: i32) -> Result<(), Self::Error>;

    fn line_to(&mut self, x: i32, y: i32) -> Result<(), Self::Error>;

    /// Called after the last command. `dpi` is the stream resolution.
    fn finish(&mut self, _dpi: f64) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Builder for [`CommandStream`]
#[derive(Debug, Clone, Default)]
pub struct CommandStreamBuilder {
    initial_property: Option<LaserProperty>,
    dpi: Option<f64>,
}

impl CommandStreamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the property the stream starts with
    pub fn initial_property(mut self, property: LaserProperty) -> Self {
        self.initial_property = Some(property);
        self
    }

    /// Sets the resolution of the device pixel grid
    pub fn dpi(mut self, dpi: f64) -> Self {
        self.dpi = Some(dpi);
        self
    }

    /// Builds the stream
    ///
    /// Fails with [`CommandError::MissingInitialProperty`] when no initial
    /// property was given and with [`CommandError::InvalidResolution`] when the
    /// DPI is missing, non-finite or not positive.
    pub fn build(self) -> Result<CommandStream, CommandError> {
        let initial = self
            .initial_property
            .ok_or(CommandError::MissingInitialProperty)?;
        let dpi = self.dpi.unwrap_or(f64::NAN);
        if !dpi.is_finite() || dpi <= 0.0 {
            return Err(CommandError::InvalidResolution { dpi });
        }
        Ok(CommandStream {
            commands: vec![Command::SetProperty(initial.clone())],
            current_property: initial,
            bounds: None,
            dpi,
        })
    }
}

/// Ordered, append-only sequence of toolpath commands
///
/// Deserialization replays the commands through the builder, so a decoded
/// stream holds the same invariants as a constructed one. The serialized
/// `current_property` and `bounds` are recomputed, not trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCommandStream")]
pub struct CommandStream {
    commands: Vec<Command>,
    current_property: LaserProperty,
    bounds: Option<Bounds>,
    dpi: f64,
}

/// Wire form of a [`CommandStream`]
#[derive(Deserialize)]
struct RawCommandStream {
    commands: Vec<Command>,
    dpi: f64,
}

impl TryFrom<RawCommandStream> for CommandStream {
    type Error = CommandError;

    fn try_from(raw: RawCommandStream) -> Result<Self, Self::Error> {
        let mut commands = raw.commands.into_iter();
        let initial = match commands.next() {
            Some(Command::SetProperty(property)) => property,
            _ => return Err(CommandError::MissingInitialProperty),
        };
        let mut stream = CommandStream::new(initial, raw.dpi)?;
        stream.extend(commands);
        Ok(stream)
    }
}

impl CommandStream {
    /// Creates a stream starting with `initial` at resolution `dpi`
    pub fn new(initial: LaserProperty, dpi: f64) -> Result<Self, CommandError> {
        CommandStreamBuilder::new()
            .initial_property(initial)
            .dpi(dpi)
            .build()
    }

    pub fn builder() -> CommandStreamBuilder {
        CommandStreamBuilder::new()
    }

    /// Appends a `SETPROPERTY` command
    pub fn set_property(&mut self, property: LaserProperty) {
        self.current_property = property.clone();
        self.commands.push(Command::SetProperty(property));
    }

    /// Appends a `MOVETO` command
    pub fn move_to(&mut self, x: i32, y: i32) {
        self.track(x, y);
        self.commands.push(Command::MoveTo { x, y });
    }

    /// Appends a `LINETO` command
    pub fn line_to(&mut self, x: i32, y: i32) {
        self.track(x, y);
        self.commands.push(Command::LineTo { x, y });
    }

    /// Appends any command
    pub fn push(&mut self, command: Command) {
        match command {
            Command::SetProperty(property) => self.set_property(property),
            Command::MoveTo { x, y } => self.move_to(x, y),
            Command::LineTo { x, y } => self.line_to(x, y),
        }
    }

    fn track(&mut self, x: i32, y: i32) {
        match &mut self.bounds {
            Some(bounds) => bounds.include(x, y),
            None => self.bounds = Some(Bounds::at(x, y)),
        }
    }

    /// All commands, starting with the initial `SETPROPERTY`
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    /// Number of commands, the initial `SETPROPERTY` included
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Always false: a stream holds at least its initial property
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Property set by the most recent `SETPROPERTY`
    pub fn current_property(&self) -> &LaserProperty {
        &self.current_property
    }

    /// Bounding box of all motion targets, `None` until the first motion
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn dpi(&self) -> f64 {
        self.dpi
    }

    /// Hands the stream to a backend, command by command, then calls
    /// [`CommandSink::finish`]. The stream is consumed.
    pub fn deliver<S: CommandSink>(self, sink: &mut S) -> Result<(), S::Error> {
        tracing::debug!(
            commands = self.commands.len(),
            dpi = self.dpi,
            "Delivering command stream"
        );
        for command in &self.commands {
            match command {
                Command::SetProperty(property) => sink.set_property(property)?,
                Command::MoveTo { x, y } => sink.move_to(*x, *y)?,
                Command::LineTo { x, y } => sink.line_to(*x, *y)?,
            }
        }
        sink.finish(self.dpi)
    }

    /// Consumes the stream, returning its commands
    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }
}

impl Extend<Command> for CommandStream {
    fn extend<I: IntoIterator<Item = Command>>(&mut self, iter: I) {
        for command in iter {
            self.push(command);
        }
    }
}

impl<'a> IntoIterator for &'a CommandStream {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
