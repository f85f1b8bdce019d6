use std::fmt;
use std::time::Duration;

/// Launch mode selected by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Backend only, serving HTTP, attached to the terminal.
    Web,
    /// Backend only, in its interactive console mode.
    Console,
    /// Rebuild the artifact, then ask again which mode to run.
    Recompile,
    /// Backend in the background plus the companion dev server.
    Full,
}

/// Result of resolving an operator-supplied mode token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeSelection {
    pub mode: Mode,
    /// False when the token was not recognised and `Web` was chosen as the
    /// fallback.
    pub recognized: bool,
}

impl Mode {
    /// Map a mode token (menu number or name) to a mode.
    ///
    /// Tokens are trimmed and compared case-insensitively. The empty token
    /// selects `Web`; unknown tokens also fall back to `Web` but are flagged
    /// as unrecognised so the caller can warn.
    pub fn resolve(token: &str) -> ModeSelection {
        let mode = match token.trim().to_lowercase().as_str() {
            "" | "1" | "web" => Some(Mode::Web),
            "2" | "consola" | "console" => Some(Mode::Console),
            "3" | "recompilar" | "recompile" | "compile" => Some(Mode::Recompile),
            "4" | "full" | "completo" => Some(Mode::Full),
            _ => None,
        };

        match mode {
            Some(mode) => ModeSelection {
                mode,
                recognized: true,
            },
            None => ModeSelection {
                mode: Mode::Web,
                recognized: false,
            },
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Web => "web",
            Mode::Console => "console",
            Mode::Recompile => "recompile",
            Mode::Full => "full",
        };
        f.write_str(name)
    }
}

/// Role of a spawned child, used in log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessRole {
    Build,
    Service,
    Install,
    Companion,
}

impl fmt::Display for ProcessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessRole::Build => "build",
            ProcessRole::Service => "service",
            ProcessRole::Install => "install",
            ProcessRole::Companion => "companion",
        };
        f.write_str(name)
    }
}

/// Parse a duration string like `"8s"`, `"500ms"`, `"2m"` or `"1h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| format!("duration '{s}' is missing a unit suffix"))?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{num_part}': {e}"))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{unit}'; expected ms, s, m, or h"
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{s}' is too large"))
}
