//! Operator console input.
//!
//! | input | effect |
//! |---|---|
//! | `/command args` | run a command as the console |
//! | `join <name> [level] [class]` | connect a simulated player |
//! | `leave <name>` | disconnect a player |
//! | `as <name> /command args` | run a command as a player |
//! | `move <name> <x> <y> <z>` | set a player's position |
//! | `respawn <name>` | bring a player back to full health |
//! | `chunk <x> <y>` | report a loaded chunk |
//! | `players`, `scripts` | list players or loaded scripts |
//! | `quit` | shut down |

use script_api::{ClassType, Vec3};

/// One parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleInput {
    Empty,
    Command(String),
    Join { name: String, level: u32, class: ClassType },
    Leave { name: String },
    As { name: String, command: String },
    Move { name: String, position: Vec3 },
    Respawn { name: String },
    Chunk { x: i64, y: i64 },
    Players,
    Scripts,
    Quit,
}

fn parse_number<T: std::str::FromStr>(what: &str, value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("Could not parse {} '{}'.", what, value))
}

impl ConsoleInput {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Self::Empty);
        }
        if line.starts_with('/') {
            return Ok(Self::Command(line.to_string()));
        }

        let mut parts = line.split_whitespace();
        let keyword = parts.next().unwrap_or_default().to_ascii_lowercase();
        let rest: Vec<&str> = parts.collect();
        match (keyword.as_str(), rest.as_slice()) {
            ("join", [name, tail @ ..]) if tail.len() <= 2 => {
                let level = match tail.first() {
                    Some(level) => parse_number("level", level)?,
                    None => 1,
                };
                let class = match tail.get(1) {
                    Some(class) => ClassType::from_name(class)
                        .ok_or_else(|| format!("Unknown class '{}'.", class))?,
                    None => ClassType::Warrior,
                };
                Ok(Self::Join { name: name.to_string(), level, class })
            }
            ("leave", [name]) => Ok(Self::Leave { name: name.to_string() }),
            ("as", [name, command @ ..]) if !command.is_empty() => Ok(Self::As {
                name: name.to_string(),
                command: command.join(" "),
            }),
            ("move", [name, x, y, z]) => Ok(Self::Move {
                name: name.to_string(),
                position: Vec3::new(
                    parse_number("x", x)?,
                    parse_number("y", y)?,
                    parse_number("z", z)?,
                ),
            }),
            ("respawn", [name]) => Ok(Self::Respawn { name: name.to_string() }),
            ("chunk", [x, y]) => Ok(Self::Chunk {
                x: parse_number("x", x)?,
                y: parse_number("y", y)?,
            }),
            ("players", []) => Ok(Self::Players),
            ("scripts", []) => Ok(Self::Scripts),
            ("quit" | "exit", []) => Ok(Self::Quit),
            _ => Err(format!("Unknown console input: {}", line)),
        }
    }
}
