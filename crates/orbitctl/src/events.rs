use orbit::{AnchorRect, Size, TriggerId, ViewportInfo};
use std::str::FromStr;
use thiserror::Error;

/// Something the daemon's engine loop has to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Anchor { rect: AnchorRect, sync: bool },
    Viewport(ViewportInfo),
    Toggle(TriggerId),
    Collapse,
    Measure(TriggerId, Size),
    Flush,
    ConfigReload,
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("'{command}' expects {expected}")]
    Arity {
        command: String,
        expected: &'static str,
    },
    #[error("invalid number '{0}'")]
    Number(String),
    #[error(transparent)]
    Quoting(#[from] shell_words::ParseError),
}

fn numbers(words: &[String]) -> Result<Vec<f64>, ParseError> {
    words
        .iter()
        .map(|w| w.parse::<f64>().map_err(|_| ParseError::Number(w.clone())))
        .collect()
}

fn arity(command: &str, expected: &'static str) -> ParseError {
    ParseError::Arity {
        command: command.to_string(),
        expected,
    }
}

impl FromStr for HostEvent {
    type Err = ParseError;

    /// Parses one socket line, e.g. `anchor 100 200 56 56` or `toggle "ask"`.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words = shell_words::split(line)?;
        let Some((command, args)) = words.split_first() else {
            return Err(ParseError::Empty);
        };

        match command.as_str() {
            "anchor" | "anchor-sync" => match numbers(args)?.as_slice() {
                [l, t, w, h] => Ok(Self::Anchor {
                    rect: AnchorRect::new(*l, *t, *w, *h),
                    sync: command == "anchor-sync",
                }),
                _ => Err(arity(command, "LEFT TOP WIDTH HEIGHT")),
            },
            "viewport" => match numbers(args)?.as_slice() {
                [w, h] => Ok(Self::Viewport(ViewportInfo::new(*w, *h))),
                [w, h, left, top] => Ok(Self::Viewport(ViewportInfo {
                    width: *w,
                    height: *h,
                    offset_left: *left,
                    offset_top: *top,
                })),
                _ => Err(arity(command, "WIDTH HEIGHT [OFFSET_LEFT OFFSET_TOP]")),
            },
            "toggle" => match args {
                [id] => Ok(Self::Toggle(TriggerId::new(id.as_str()))),
                _ => Err(arity(command, "ID")),
            },
            "measure" => match args {
                [id, rest @ ..] => match numbers(rest)?.as_slice() {
                    [w, h] => Ok(Self::Measure(TriggerId::new(id.as_str()), Size::new(*w, *h))),
                    _ => Err(arity(command, "ID WIDTH HEIGHT")),
                },
                _ => Err(arity(command, "ID WIDTH HEIGHT")),
            },
            "collapse" => Ok(Self::Collapse),
            "flush" => Ok(Self::Flush),
            "reload" => Ok(Self::ConfigReload),
            other => Err(ParseError::Unknown(other.to_string())),
        }
    }
}
